pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::Result;
use crate::domain::{RunSummary, ScrapeRecord};

pub use sqlite::SqliteDataset;

/// A recorded run and its totals, once finished.
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: Option<RunSummary>,
}

/// Append-only record storage, grouped by run.
pub trait Dataset {
    // Run operations
    fn open_run(&self, started_at: DateTime<Utc>) -> Result<i64>;
    fn finish_run(&self, run_id: i64, summary: &RunSummary) -> Result<()>;
    fn get_run(&self, run_id: i64) -> Result<Option<RunInfo>>;
    fn latest_run(&self) -> Result<Option<RunInfo>>;
    fn get_all_runs(&self) -> Result<Vec<RunInfo>>;

    // Record operations
    fn append(&self, run_id: i64, record: &ScrapeRecord) -> Result<()>;
    fn get_records(&self, run_id: i64) -> Result<Vec<ScrapeRecord>>;
    fn record_count(&self, run_id: i64) -> Result<usize>;
}
