use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::app::Result;
use crate::domain::{ErrorRecord, RunSummary, ScrapeRecord};
use crate::platform::Platform;
use crate::visitor::PageVisitor;

/// Runs one batch: read input, visit every retained URL, push every record.
pub struct BatchOrchestrator {
    visitor: Arc<PageVisitor>,
    concurrency: usize,
}

impl BatchOrchestrator {
    pub fn with_concurrency(visitor: PageVisitor, concurrency: usize) -> Self {
        Self {
            visitor: Arc::new(visitor),
            concurrency: concurrency.max(1),
        }
    }

    /// Execute a run against `platform`.
    ///
    /// Fails before any visit when the input has no URLs. Otherwise every
    /// retained URL yields exactly one pushed record, whatever happens during
    /// its visit. If a push fails, visits that have not started are cancelled,
    /// those in flight are drained, and the run is closed with what was stored.
    pub async fn run<P: Platform + ?Sized>(&self, platform: &P) -> Result<RunSummary> {
        platform.init().await?;
        let input = platform.get_input().await?;

        info!("Starting product tracker");
        info!("Processing {} product URLs", input.product_urls.len());
        info!("Max items limit: {}", input.max_items);

        input.validate()?;

        let urls = input.urls_to_visit().to_vec();
        let mut summary = RunSummary {
            requested: input.product_urls.len(),
            ..Default::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(urls.len());
        for url in urls {
            let visitor = self.visitor.clone();
            let semaphore = semaphore.clone();
            let task_url = url.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                Some(visitor.visit(&task_url).await)
            });

            handles.push((url, handle));
        }

        let mut pending = handles.into_iter();
        while let Some((url, handle)) = pending.next() {
            let record: ScrapeRecord = match handle.await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    error!("Visit task for {} failed: {}", url, e);
                    ErrorRecord::new(url.as_str(), e.to_string(), Utc::now()).into()
                }
            };

            if let Err(e) = platform.push_data(&record).await {
                error!("Failed to store record for {}: {}", url, e);
                semaphore.close();
                for (_, handle) in pending.by_ref() {
                    let _ = handle.await;
                }
                if let Err(exit_err) = platform.exit(&summary).await {
                    error!("Failed to close run: {}", exit_err);
                }
                return Err(e);
            }
            summary.record(&record);
        }

        platform.exit(&summary).await?;

        info!(
            "Product tracking completed: {} processed, {} succeeded, {} failed",
            summary.processed, summary.succeeded, summary.failed
        );

        Ok(summary)
    }
}
