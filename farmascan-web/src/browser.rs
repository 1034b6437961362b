//! Page capture behind a trait so tests can inject fixture markup.

use crate::sites::SiteSpec;
use anyhow::{anyhow, Result};
use farmascan_common::{FarmascanConfig, FarmascanError};
use farmascan_drivers::farmascan_browser::driver::FarmascanDriver;
use tokio::time::timeout;
use tracing::debug;

/// Fully rendered markup for one site's search results page.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub url: String,
    pub html: String,
}

/// Produces the rendered search-results markup for one site.
///
/// The extraction engine only ever sees this trait; the WebDriver-backed
/// implementation below is swapped for fixture capturers in tests.
#[async_trait::async_trait]
pub trait PageCapturer: Send + Sync {
    async fn capture(
        &self,
        spec: &SiteSpec,
        keyword: &str,
    ) -> farmascan_common::Result<PageCapture>;
}

/// Concrete capturer backed by the fantoccini-based driver.
pub struct WebdriverCapturer {
    config: FarmascanConfig,
}

impl WebdriverCapturer {
    pub fn new(config: FarmascanConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl PageCapturer for WebdriverCapturer {
    async fn capture(
        &self,
        spec: &SiteSpec,
        keyword: &str,
    ) -> farmascan_common::Result<PageCapture> {
        let url = spec.search_url(keyword);
        let mut driver = FarmascanDriver::new(
            self.config.headless,
            self.config.stealth_level,
            &self.config.webdriver_url,
        )
        .await?;

        // The deadline bounds everything between navigation and snapshot so a
        // hung session cannot outlive the request; the session is closed on
        // the success, error, and deadline paths alike.
        let outcome = timeout(
            spec.capture_deadline(),
            render_and_snapshot(&mut driver, spec, &url),
        )
        .await;
        let _ = driver.close().await;

        match outcome {
            Ok(Ok(html)) => {
                debug!(
                    target: "browser.capture",
                    site = %spec.pharmacy,
                    bytes = html.len(),
                    "markup captured"
                );
                Ok(PageCapture { url, html })
            }
            Ok(Err(e)) => Err(FarmascanError::Driver(e)),
            Err(_) => Err(FarmascanError::Timeout),
        }
    }
}

/// Navigate, wait out client-side rendering, run the scroll budget, and
/// return the rendered markup.
async fn render_and_snapshot(
    driver: &mut FarmascanDriver,
    spec: &SiteSpec,
    url: &str,
) -> Result<String> {
    let page = timeout(spec.nav_timeout, driver.goto(url))
        .await
        .map_err(|_| anyhow!("navigation to {url} timed out"))??;

    page.settle(spec.settle).await;
    for _ in 0..spec.scroll_cycles {
        page.scroll_to_bottom().await?;
        page.settle(spec.scroll_pause).await;
    }

    page.get_content().await
}
