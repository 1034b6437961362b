use crate::farmascan_browser::{
    behavioral::BehavioralEngine,
    fingerprint::UserAgentManager,
    stealth::StealthScripts,
};
use anyhow::Result;
use fantoccini::Client;
use farmascan_common::StealthLevel;
use std::time::Duration;

/// High-level page wrapper for the capture sequence: navigate, settle,
/// scroll, snapshot.
pub struct FarmascanPage {
    pub(crate) client: Client,
    pub(crate) stealth_level: StealthLevel,
    pub(crate) fingerprint_manager: UserAgentManager,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl FarmascanPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(
        client: Client,
        stealth_level: StealthLevel,
        fingerprint_manager: UserAgentManager,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth_level,
            fingerprint_manager,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and apply stealth/fingerprint scripts.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        self.behavioral_engine.random_delay(300, 1200).await;
        self.client.goto(url).await.map_err(anyhow::Error::from)?;

        self.apply_stealth_and_fingerprint().await?;

        Ok(())
    }

    /// Apply stealth scripts and basic fingerprinting adjustments.
    async fn apply_stealth_and_fingerprint(&mut self) -> Result<()> {
        self.client
            .execute(StealthScripts::get_core_evasions(), vec![])
            .await?;

        match self.stealth_level {
            StealthLevel::Lightweight => {
                // No additional scripts for the lightest level
            }

            StealthLevel::Balanced => {
                self.client
                    .execute(StealthScripts::get_canvas_evasions(), vec![])
                    .await?;
            }

            StealthLevel::Maximum => {
                self.client
                    .execute(StealthScripts::get_canvas_evasions(), vec![])
                    .await?;
                self.client
                    .execute(StealthScripts::get_webgl_evasions(), vec![])
                    .await?;

                let p = &self
                    .fingerprint_manager
                    .get_session_profile(&self.stealth_level);

                self.client
                    .execute(
                        &format!(
                            "Object.defineProperty(navigator, 'platform', {{ get: () => '{}' }});",
                            p.platform
                        ),
                        vec![],
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Fixed wait for client-side rendering to populate the catalog.
    pub async fn settle(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    /// One scroll pulse to the bottom of the page, triggering lazy-loaded
    /// cards. Callers pair this with a [`settle`](Self::settle) wait.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    /// Return the full rendered page HTML.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }
}
