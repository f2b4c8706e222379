use std::time::Duration;

use anyhow::Context;
use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::configuration::BrowserSettings;

/// One headless browser session. Every capture owns its own session so
/// concurrent analyses never share WebDriver state.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn new(settings: &BrowserSettings) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless=new")
            .context("Failed to configure browser capabilities")?;
        caps.add_arg("--no-sandbox")
            .context("Failed to configure browser capabilities")?;
        caps.add_arg("--disable-setuid-sandbox")
            .context("Failed to configure browser capabilities")?;
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.viewport_width, settings.viewport_height
        ))
        .context("Failed to configure browser capabilities")?;

        let driver = WebDriver::new(&settings.webdriver_url, caps)
            .await
            .context("Failed to start browser session")?;

        Ok(Droid { driver })
    }

    async fn goto_with_timeout(&self, url: &str, timeout_secs: u64) -> anyhow::Result<()> {
        match tokio::time::timeout(Duration::from_secs(timeout_secs), self.driver.goto(url)).await {
            Ok(result) => result.with_context(|| format!("Failed to navigate to {}", url)),
            Err(_) => Err(anyhow::anyhow!(
                "Navigation to {} timed out after {}s",
                url,
                timeout_secs
            )),
        }
    }

    pub async fn capture_screenshot(
        &self,
        url: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Vec<u8>> {
        self.goto_with_timeout(url, timeout_secs).await?;

        self.driver
            .screenshot_as_png()
            .await
            .context("Failed to take screenshot")
    }

    pub async fn fetch_page_source(&self, url: &str, timeout_secs: u64) -> anyhow::Result<String> {
        self.goto_with_timeout(url, timeout_secs).await?;

        self.driver
            .source()
            .await
            .context("Failed to read page source")
    }

    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            log::error!("Failed to shut down browser session: {:?}", e);
        }
    }
}
