//! Run lifecycle hooks the orchestrator calls into.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::app::{Result, TrackerError};
use crate::dataset::Dataset;
use crate::domain::{RunInput, RunSummary, ScrapeRecord};

/// Host environment of a run: where input comes from and where records go.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn init(&self) -> Result<()>;
    async fn get_input(&self) -> Result<RunInput>;
    async fn push_data(&self, record: &ScrapeRecord) -> Result<()>;
    async fn exit(&self, summary: &RunSummary) -> Result<()>;
}

#[derive(Debug, Default)]
struct RunState {
    started_at: Option<DateTime<Utc>>,
    run_id: Option<i64>,
}

/// Platform backed by an in-process input and a [`Dataset`].
///
/// The dataset run is opened on the first pushed record, so a run that fails
/// before visiting anything leaves no trace in storage.
pub struct LocalPlatform<D: Dataset + Send + Sync + 'static> {
    input: RunInput,
    dataset: Arc<D>,
    state: Mutex<RunState>,
}

impl<D: Dataset + Send + Sync + 'static> LocalPlatform<D> {
    pub fn new(input: RunInput, dataset: Arc<D>) -> Self {
        Self {
            input,
            dataset,
            state: Mutex::new(RunState::default()),
        }
    }

    /// Dataset run id, once at least one record has been pushed
    pub fn run_id(&self) -> Option<i64> {
        self.state.lock().ok().and_then(|s| s.run_id)
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, RunState>> {
        self.state
            .lock()
            .map_err(|e| TrackerError::Other(format!("Run state poisoned: {}", e)))
    }

    fn ensure_run(&self) -> Result<i64> {
        let mut state = self.state()?;
        if let Some(id) = state.run_id {
            return Ok(id);
        }
        let started_at = *state.started_at.get_or_insert_with(Utc::now);
        let id = self.dataset.open_run(started_at)?;
        state.run_id = Some(id);
        Ok(id)
    }
}

#[async_trait]
impl<D: Dataset + Send + Sync + 'static> Platform for LocalPlatform<D> {
    async fn init(&self) -> Result<()> {
        self.state()?.started_at = Some(Utc::now());
        Ok(())
    }

    async fn get_input(&self) -> Result<RunInput> {
        Ok(self.input.clone())
    }

    async fn push_data(&self, record: &ScrapeRecord) -> Result<()> {
        let run_id = self.ensure_run()?;
        self.dataset.append(run_id, record)
    }

    async fn exit(&self, summary: &RunSummary) -> Result<()> {
        if let Some(run_id) = self.run_id() {
            self.dataset.finish_run(run_id, summary)?;
            info!("Run {} finished", run_id);
        }
        Ok(())
    }
}
