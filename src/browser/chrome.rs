use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::app::{Result, TrackerError};
use crate::browser::config::ScraperConfig;
use crate::browser::{BrowserPage, Navigator, PageSnapshot};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Completed resource loads so far. The page is quiet once this stops growing.
const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";

/// Chrome-based navigator using chromiumoxide
pub struct ChromeNavigator {
    browser: Browser,
    handler: JoinHandle<()>,
    config: ScraperConfig,
}

impl ChromeNavigator {
    /// Launch a browser with the given configuration
    pub async fn new(config: ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .request_timeout(config.timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| TrackerError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            TrackerError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the DevTools connection
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            config,
        })
    }
}

impl Drop for ChromeNavigator {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl Navigator for ChromeNavigator {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| TrackerError::Browser(format!("Failed to create page: {}", e)))?;

        Ok(Box::new(ChromePage {
            page,
            user_agent: self.config.user_agent.clone(),
            quiet_period: self.config.wait_after_load(),
        }))
    }
}

/// Navigation error carrying the protocol message as-is
fn navigation_failed(e: impl std::fmt::Display) -> TrackerError {
    TrackerError::Navigation(e.to_string())
}

struct ChromePage {
    page: Page,
    user_agent: Option<String>,
    quiet_period: Duration,
}

impl ChromePage {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| TrackerError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| TrackerError::Browser(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if let Some(ref ua) = self.user_agent {
            self.page
                .set_user_agent(ua)
                .await
                .map_err(|e| TrackerError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        self.page.goto(url).await.map_err(navigation_failed)?;
        Ok(())
    }

    /// Waits for the load event, then for the resource count to hold still for
    /// the configured quiet period. The caller bounds the total wait.
    async fn wait_for_stable_load(&mut self) -> Result<()> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_failed)?;

        loop {
            let state: String = self.evaluate("document.readyState").await?;
            if state == "complete" {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let mut last_count: u64 = self.evaluate(RESOURCE_COUNT_SCRIPT).await?;
        let mut quiet_since = Instant::now();
        while quiet_since.elapsed() < self.quiet_period {
            tokio::time::sleep(POLL_INTERVAL).await;
            let count: u64 = self.evaluate(RESOURCE_COUNT_SCRIPT).await?;
            if count != last_count {
                last_count = count;
                quiet_since = Instant::now();
            }
        }

        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| TrackerError::Browser(format!("Failed to read page content: {}", e)))?;
        let final_url = self
            .page
            .url()
            .await
            .map_err(|e| TrackerError::Browser(format!("Failed to read page URL: {}", e)))?;

        Ok(PageSnapshot { html, final_url })
    }

    async fn close(&mut self) -> Result<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| TrackerError::Browser(format!("Failed to close page: {}", e)))
    }
}
