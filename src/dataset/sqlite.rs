use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, TrackerError};
use crate::dataset::{Dataset, RunInfo};
use crate::domain::{RunSummary, ScrapeRecord};

pub struct SqliteDataset {
    conn: Mutex<Connection>,
}

impl SqliteDataset {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let dataset = Self {
            conn: Mutex::new(conn),
        };
        dataset.run_migrations()?;
        Ok(dataset)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let dataset = Self {
            conn: Mutex::new(conn),
        };
        dataset.run_migrations()?;
        Ok(dataset)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            TrackerError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| TrackerError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunInfo> {
        let processed: Option<i64> = row.get(4)?;
        let summary = match processed {
            Some(processed) => Some(RunSummary {
                requested: row.get::<_, Option<i64>>(3)?.unwrap_or(0) as usize,
                processed: processed as usize,
                succeeded: row.get::<_, Option<i64>>(5)?.unwrap_or(0) as usize,
                failed: row.get::<_, Option<i64>>(6)?.unwrap_or(0) as usize,
            }),
            None => None,
        };

        Ok(RunInfo {
            id: row.get(0)?,
            started_at: row
                .get::<_, String>(1)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            finished_at: row
                .get::<_, Option<String>>(2)?
                .and_then(|s| Self::parse_datetime(&s)),
            summary,
        })
    }
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, requested, processed, succeeded, failed";

impl Dataset for SqliteDataset {
    fn open_run(&self, started_at: DateTime<Utc>) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO runs (started_at) VALUES (?1)",
            params![started_at.to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn finish_run(&self, run_id: i64, summary: &RunSummary) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE runs SET finished_at = ?1, requested = ?2, processed = ?3, succeeded = ?4, failed = ?5
             WHERE id = ?6",
            params![
                Utc::now().to_rfc3339(),
                summary.requested as i64,
                summary.processed as i64,
                summary.succeeded as i64,
                summary.failed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(TrackerError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> Result<Option<RunInfo>> {
        let conn = self.conn()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                Self::run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn latest_run(&self) -> Result<Option<RunInfo>> {
        let conn = self.conn()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                Self::run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn get_all_runs(&self) -> Result<Vec<RunInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM runs ORDER BY id", RUN_COLUMNS))?;
        let runs = stmt
            .query_map([], Self::run_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    fn append(&self, run_id: i64, record: &ScrapeRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (run_id, url, status, payload, appended_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                record.url(),
                record.status(),
                payload,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn get_records(&self, run_id: i64) -> Result<Vec<ScrapeRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT payload FROM records WHERE run_id = ?1 ORDER BY id")?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(TrackerError::from))
            .collect()
    }

    fn record_count(&self, run_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
