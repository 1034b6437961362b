use crate::farmascan_browser::{
    behavioral::BehavioralEngine,
    fingerprint::UserAgentManager,
    page::FarmascanPage,
    stealth::build_stealth_arguments,
};
use anyhow::{anyhow, Result};
use fantoccini::{Client, ClientBuilder};
use farmascan_common::StealthLevel;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use url::Url;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client with stealth helpers.
///
/// One driver equals one isolated browser session. The extractor that opens
/// a driver owns it for its whole lifetime and must [`close`](Self::close)
/// it; five concurrent unreleased sessions would exhaust memory quickly.
pub struct FarmascanDriver {
    pub client: Client,
    behavioral_engine: BehavioralEngine,
    user_agent_manager: UserAgentManager,
    stealth_level: StealthLevel,
}

impl FarmascanDriver {
    /// Open a fresh session against the WebDriver service at `webdriver_url`
    /// (Chromedriver at `http://localhost:9515` in the default config).
    ///
    /// The session uses `pageLoadStrategy: eager`, so navigation resolves at
    /// DOM-content-loaded; client-side rendering is waited out separately by
    /// the capture sequence.
    pub async fn new(
        headless: bool,
        stealth_level: StealthLevel,
        webdriver_url: &str,
    ) -> Result<Self> {
        Url::parse(webdriver_url)
            .map_err(|e| anyhow!("invalid WebDriver endpoint {webdriver_url}: {e}"))?;

        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        let mut user_agent_manager = UserAgentManager::new();
        let user_agent_profile = user_agent_manager.get_session_profile(&stealth_level);

        let mut args = build_stealth_arguments(&stealth_level, user_agent_profile);
        if headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));

        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;

        debug!(
            target: "browser.session",
            endpoint = %webdriver_url,
            headless,
            "webdriver session opened"
        );

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            user_agent_manager,
            stealth_level,
        })
    }

    /// Navigate to `url` and return a [`FarmascanPage`] with stealth and
    /// fingerprint scripts applied.
    pub async fn goto(&mut self, url: &str) -> Result<FarmascanPage> {
        let mut page = FarmascanPage::new(
            self.client.clone(),
            self.stealth_level,
            self.user_agent_manager.clone(),
            self.behavioral_engine.clone(),
        );
        // Navigate via FarmascanPage so evasion scripts are applied consistently
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
