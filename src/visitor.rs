use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::app::{Result, TrackerError};
use crate::browser::{BrowserPage, Navigator, PageSnapshot};
use crate::domain::{ErrorRecord, ProductRecord, ScrapeRecord};
use crate::extractor::Extractor;

/// Visits one product page and turns it into a dataset record.
pub struct PageVisitor {
    navigator: Arc<dyn Navigator>,
    extractor: Arc<Extractor>,
    timeout: Duration,
}

impl PageVisitor {
    pub fn new(navigator: Arc<dyn Navigator>, extractor: Arc<Extractor>, timeout: Duration) -> Self {
        Self {
            navigator,
            extractor,
            timeout,
        }
    }

    /// Visit `url`. Never fails: any error becomes an [`ErrorRecord`] carrying
    /// the error's message.
    pub async fn visit(&self, url: &str) -> ScrapeRecord {
        info!("Scraping: {}", url);

        match self.visit_page(url).await {
            Ok(record) => {
                info!("Successfully scraped: {}", record.title);
                info!("Price: {}", record.price);
                record.into()
            }
            Err(e) => {
                error!("Error scraping {}: {}", url, e);
                ErrorRecord::new(url, e.to_string(), Utc::now()).into()
            }
        }
    }

    /// The whole visit shares one deadline. The page is closed on every path
    /// once it has been opened.
    async fn visit_page(&self, url: &str) -> Result<ProductRecord> {
        let deadline = Instant::now() + self.timeout;

        let mut page = self.within(deadline, self.navigator.open_page()).await?;
        let loaded = self.within(deadline, load(page.as_mut(), url)).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        let snapshot = loaded?;
        let base_url = snapshot.final_url.as_deref().unwrap_or(url);
        let fields = self.extractor.extract_html(&snapshot.html, Some(base_url));

        Ok(ProductRecord::new(fields, url, Utc::now()))
    }

    async fn within<T>(
        &self,
        deadline: Instant,
        step: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout_at(deadline, step).await.map_err(|_| {
            TrackerError::Timeout(format!(
                "page did not load within {}s",
                self.timeout.as_secs()
            ))
        })?
    }
}

async fn load(page: &mut dyn BrowserPage, url: &str) -> Result<PageSnapshot> {
    page.navigate(url).await?;
    page.wait_for_stable_load().await?;
    page.snapshot().await
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::app::{Result, TrackerError};
    use crate::browser::{BrowserPage, Navigator, PageSnapshot};

    /// How a scripted URL behaves
    #[derive(Clone)]
    pub enum Script {
        Page(String),
        NavigationError(String),
        NavigationHang,
        Hang,
        SnapshotError(String),
        Panic,
    }

    #[derive(Default)]
    struct Tally {
        opened: AtomicUsize,
        closed: AtomicUsize,
        open_now: AtomicUsize,
        peak: AtomicUsize,
    }

    /// Navigator serving canned pages, keyed by URL. Counts opened and closed
    /// pages and the most pages open at once.
    #[derive(Default)]
    pub struct ScriptedNavigator {
        scripts: Arc<HashMap<String, Script>>,
        delay: Duration,
        tally: Arc<Tally>,
    }

    impl ScriptedNavigator {
        pub fn with(mut self, url: &str, script: Script) -> Self {
            Arc::make_mut(&mut self.scripts).insert(url.to_string(), script);
            self
        }

        /// Make navigation and the stable-load wait each take `delay`
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn visit_count(&self) -> usize {
            self.tally.opened.load(Ordering::SeqCst)
        }

        pub fn closed_count(&self) -> usize {
            self.tally.closed.load(Ordering::SeqCst)
        }

        pub fn peak_open(&self) -> usize {
            self.tally.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Navigator for ScriptedNavigator {
        async fn open_page(&self) -> Result<Box<dyn BrowserPage>> {
            self.tally.opened.fetch_add(1, Ordering::SeqCst);
            let open_now = self.tally.open_now.fetch_add(1, Ordering::SeqCst) + 1;
            self.tally.peak.fetch_max(open_now, Ordering::SeqCst);

            Ok(Box::new(ScriptedPage {
                scripts: self.scripts.clone(),
                delay: self.delay,
                tally: self.tally.clone(),
                url: String::new(),
                script: None,
            }))
        }
    }

    struct ScriptedPage {
        scripts: Arc<HashMap<String, Script>>,
        delay: Duration,
        tally: Arc<Tally>,
        url: String,
        script: Option<Script>,
    }

    #[async_trait]
    impl BrowserPage for ScriptedPage {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.url = url.to_string();
            match self.scripts.get(url).cloned() {
                Some(Script::NavigationError(msg)) => Err(TrackerError::Navigation(msg)),
                Some(Script::NavigationHang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
                Some(Script::Panic) => panic!("page crashed while loading {}", url),
                Some(script) => {
                    self.script = Some(script);
                    Ok(())
                }
                None => Err(TrackerError::Navigation(format!("no route for {}", url))),
            }
        }

        async fn wait_for_stable_load(&mut self) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            if let Some(Script::Hang) = self.script {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(())
        }

        async fn snapshot(&mut self) -> Result<PageSnapshot> {
            match &self.script {
                Some(Script::Page(html)) => Ok(PageSnapshot {
                    html: html.clone(),
                    final_url: Some(self.url.clone()),
                }),
                Some(Script::SnapshotError(msg)) => Err(TrackerError::Browser(msg.clone())),
                _ => Ok(PageSnapshot {
                    html: String::new(),
                    final_url: None,
                }),
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.tally.closed.fetch_add(1, Ordering::SeqCst);
            self.tally.open_now.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Script, ScriptedNavigator};
    use super::*;
    use crate::extractor::SelectorConfig;

    fn visitor(navigator: ScriptedNavigator, timeout: Duration) -> PageVisitor {
        let extractor = Extractor::new(&SelectorConfig::default()).unwrap();
        PageVisitor::new(Arc::new(navigator), Arc::new(extractor), timeout)
    }

    #[tokio::test]
    async fn test_visit_widget_page() {
        let html = r#"
            <span id="productTitle">Widget</span>
            <img id="landingImage" src="https://img/1.jpg">
        "#;
        let nav = ScriptedNavigator::default().with("https://a.example/p1", Script::Page(html.into()));
        let before = Utc::now();

        let record = visitor(nav, Duration::from_secs(5))
            .visit("https://a.example/p1")
            .await;

        let ScrapeRecord::Product(product) = record else {
            panic!("expected a product record");
        };
        assert_eq!(product.title, "Widget");
        assert_eq!(product.price, "Price not found");
        assert_eq!(product.image_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(product.rating, "No rating available");
        assert_eq!(product.url, "https://a.example/p1");
        assert!(product.scraped_at >= before);
    }

    #[tokio::test]
    async fn test_navigation_error_becomes_error_record() {
        let nav = ScriptedNavigator::default().with(
            "https://a.example/p1",
            Script::NavigationError("net::ERR_NAME_NOT_RESOLVED".into()),
        );

        let record = visitor(nav, Duration::from_secs(5))
            .visit("https://a.example/p1")
            .await;

        let ScrapeRecord::Error(err) = record else {
            panic!("expected an error record");
        };
        assert_eq!(err.title, "Error occurred");
        assert_eq!(err.price, "Could not retrieve");
        assert_eq!(err.error, "Navigation failed: net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(err.url, "https://a.example/p1");
    }

    #[tokio::test]
    async fn test_snapshot_error_message_preserved() {
        let nav = ScriptedNavigator::default()
            .with("https://a.example/p1", Script::SnapshotError("target closed".into()));

        let record = visitor(nav, Duration::from_secs(5))
            .visit("https://a.example/p1")
            .await;

        let ScrapeRecord::Error(err) = record else {
            panic!("expected an error record");
        };
        assert_eq!(err.error, TrackerError::Browser("target closed".into()).to_string());
    }

    #[tokio::test]
    async fn test_stable_load_timeout_becomes_error_record() {
        let nav = ScriptedNavigator::default().with("https://a.example/p1", Script::Hang);

        let record = visitor(nav, Duration::from_secs(1))
            .visit("https://a.example/p1")
            .await;

        let ScrapeRecord::Error(err) = record else {
            panic!("expected an error record");
        };
        assert!(err.error.starts_with("Timed out"));
        assert!(err.error.contains("1s"));
        assert_eq!(err.url, "https://a.example/p1");
    }

    #[tokio::test]
    async fn test_page_closed_on_every_failure() {
        let nav = Arc::new(
            ScriptedNavigator::default()
                .with(
                    "https://a.example/dns",
                    Script::NavigationError("net::ERR_NAME_NOT_RESOLVED".into()),
                )
                .with("https://a.example/stuck", Script::NavigationHang)
                .with("https://a.example/slow", Script::Hang)
                .with("https://a.example/gone", Script::SnapshotError("target closed".into())),
        );
        let extractor = Arc::new(Extractor::new(&SelectorConfig::default()).unwrap());
        let visitor = PageVisitor::new(nav.clone(), extractor, Duration::from_secs(1));

        for url in [
            "https://a.example/dns",
            "https://a.example/stuck",
            "https://a.example/slow",
            "https://a.example/gone",
        ] {
            assert!(visitor.visit(url).await.is_error(), "{} should fail", url);
        }

        assert_eq!(nav.visit_count(), 4);
        assert_eq!(nav.closed_count(), 4);
    }

    #[tokio::test]
    async fn test_timeout_covers_whole_visit() {
        // Each step fits in the timeout on its own, both together do not
        let nav = ScriptedNavigator::default()
            .with("https://a.example/p1", Script::Page("<h1>Late</h1>".into()))
            .with_delay(Duration::from_millis(700));

        let record = visitor(nav, Duration::from_secs(1))
            .visit("https://a.example/p1")
            .await;

        let ScrapeRecord::Error(err) = record else {
            panic!("expected an error record");
        };
        assert!(err.error.starts_with("Timed out"));
    }
}
