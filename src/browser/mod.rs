//! Page navigation backends.
//!
//! A [`Navigator`] opens pages; each opened [`BrowserPage`] is pointed at a
//! URL, waited on until its network activity settles and then snapshotted into
//! HTML for the extractor. Whoever opens a page owns it and must `close()` it,
//! whether or not loading succeeded.
//!
//! ```text
//! open_page() → navigate(url) → wait_for_stable_load() → snapshot() → close()
//! ```

mod chrome;
mod config;
mod http;

pub use chrome::ChromeNavigator;
pub use config::{Engine, ScraperConfig};
pub use http::HttpNavigator;

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;

/// Rendered DOM of a page at the time it was read
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub html: String,
    /// URL after redirects, used as the base for relative links
    pub final_url: Option<String>,
}

/// A page opened by a [`Navigator`]
#[async_trait]
pub trait BrowserPage: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until the page has finished loading and its network has gone quiet
    async fn wait_for_stable_load(&mut self) -> Result<()>;

    /// Serialize the current DOM
    async fn snapshot(&mut self) -> Result<PageSnapshot>;

    async fn close(&mut self) -> Result<()>;
}

/// Opens blank pages for the visitor
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>>;
}

/// Build the navigator selected by `config.engine`.
pub async fn launch(config: &ScraperConfig) -> Result<Arc<dyn Navigator>> {
    let navigator: Arc<dyn Navigator> = match config.engine {
        Engine::Chrome => Arc::new(ChromeNavigator::new(config.clone()).await?),
        Engine::Http => Arc::new(HttpNavigator::new(config)?),
    };
    Ok(navigator)
}
