use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::app::{Result, TrackerError};
use crate::browser::config::ScraperConfig;
use crate::browser::{BrowserPage, Navigator, PageSnapshot};

/// Navigator that fetches the server-rendered HTML without running scripts.
///
/// A fetched document is already complete, so waiting for a stable load is a
/// no-op.
pub struct HttpNavigator {
    client: Client,
}

impl HttpNavigator {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true);

        builder = match &config.user_agent {
            Some(ua) => builder.user_agent(ua),
            None => builder.user_agent(concat!("pricetrack/", env!("CARGO_PKG_VERSION"))),
        };

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>> {
        Ok(Box::new(FetchedPage {
            client: self.client.clone(),
            snapshot: None,
        }))
    }
}

struct FetchedPage {
    client: Client,
    snapshot: Option<PageSnapshot>,
}

#[async_trait]
impl BrowserPage for FetchedPage {
    /// Error statuses still yield their body, the way a browser renders an
    /// error page.
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            debug!("{} answered {}", url, response.status());
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;

        self.snapshot = Some(PageSnapshot {
            html,
            final_url: Some(final_url),
        });
        Ok(())
    }

    async fn wait_for_stable_load(&mut self) -> Result<()> {
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot> {
        self.snapshot
            .clone()
            .ok_or_else(|| TrackerError::Browser("Page has not been navigated".into()))
    }

    async fn close(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn test_builds_with_and_without_user_agent() {
        assert!(HttpNavigator::new(&ScraperConfig::default()).is_ok());

        let config = ScraperConfig {
            user_agent: None,
            ..Default::default()
        };
        assert!(HttpNavigator::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_before_navigate_fails() {
        let navigator = HttpNavigator::new(&ScraperConfig::default()).unwrap();
        let mut page = navigator.open_page().await.unwrap();
        assert!(page.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_error_status_page_is_still_read() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = "<span id=\"productTitle\">Gone</span>";

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let navigator = HttpNavigator::new(&ScraperConfig::default()).unwrap();
        let mut page = navigator.open_page().await.unwrap();
        let url = format!("http://{}/dp/1", addr);
        page.navigate(&url).await.unwrap();
        page.wait_for_stable_load().await.unwrap();

        let snap = page.snapshot().await.unwrap();
        assert_eq!(snap.html, body);
        assert_eq!(snap.final_url.as_deref(), Some(url.as_str()));
    }
}
