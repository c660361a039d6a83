use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, TrackerError};
use crate::browser;
use crate::config::Config;
use crate::dataset::SqliteDataset;
use crate::extractor::Extractor;
use crate::orchestrator::BatchOrchestrator;
use crate::visitor::PageVisitor;

pub struct AppContext {
    pub config: Config,
    pub dataset: Arc<SqliteDataset>,
    pub extractor: Arc<Extractor>,
}

impl AppContext {
    /// Wire up storage and the extractor. `db_path` overrides the configured
    /// dataset location.
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path.or_else(|| config.dataset.path.clone()) {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let dataset = Arc::new(SqliteDataset::new(&db_path)?);
        Self::with_dataset(config, dataset)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let dataset = Arc::new(SqliteDataset::in_memory()?);
        Self::with_dataset(config, dataset)
    }

    fn with_dataset(config: Config, dataset: Arc<SqliteDataset>) -> Result<Self> {
        let extractor = Arc::new(Extractor::new(&config.selectors)?);
        Ok(Self {
            config,
            dataset,
            extractor,
        })
    }

    /// Launch the configured navigator and build an orchestrator around it.
    pub async fn orchestrator(&self) -> Result<BatchOrchestrator> {
        let scraper = &self.config.scraper;
        let navigator = browser::launch(scraper).await?;
        let visitor = PageVisitor::new(navigator, self.extractor.clone(), scraper.timeout());
        Ok(BatchOrchestrator::with_concurrency(
            visitor,
            scraper.max_concurrency,
        ))
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TrackerError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("pricetrack");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("dataset.db"))
    }
}
