use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which navigator drives page visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Headless Chrome via the DevTools protocol
    Chrome,
    /// Plain HTTP GET, no script execution
    Http,
}

/// Configuration for page visits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Navigator used for visits (default: chrome)
    pub engine: Engine,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Network quiet period required before a page counts as loaded, in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// Maximum concurrent page visits (default: 5)
    pub max_concurrency: usize,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            engine: Engine::Chrome,
            headless: true,
            timeout_secs: 30,
            wait_after_load_ms: 1000,
            max_concurrency: 5,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    /// Get the page load timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the network quiet period as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}
