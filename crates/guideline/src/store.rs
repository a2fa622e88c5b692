//! Typed job store on top of the SQLite repository.
//!
//! [`JobStore`] is the only way job state changes. Every update is a
//! conditional statement in [`crate::db::job_repo`]; when it matches no row
//! the store re-reads the job to tell a missing id from a lifecycle
//! violation.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::db::job_repo::{self, JobFilter, JobRow};
use crate::db::{Database, DatabaseError};
use crate::job::{Job, JobStatus, JobUpdate};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Failed to encode checklist: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Listing parameters. Results are newest first.
#[derive(Debug, Default, Clone)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Durable record of jobs. Implementations must be safe to share across
/// the HTTP handlers and all worker threads.
pub trait JobStore: Send + Sync {
    /// Persists a new `pending` job with a fresh id.
    fn create(&self, input_text: &str) -> Result<Job, StoreError>;

    fn get(&self, id: Uuid) -> Result<Job, StoreError>;

    /// Applies a lifecycle update and returns the job as stored afterwards.
    fn update(&self, id: Uuid, update: JobUpdate) -> Result<Job, StoreError>;

    fn list(&self, query: &JobQuery) -> Result<(Vec<Job>, u64), StoreError>;

    fn count_by_status(&self, status: JobStatus) -> Result<u64, StoreError>;
}

/// [`JobStore`] backed by the SQLite [`Database`].
#[derive(Clone)]
pub struct SqliteJobStore {
    db: Database,
}

impl SqliteJobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database file at `path`, migrating it if needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Database::open(path).map(Self::new)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn transition_error(&self, id: Uuid, to: JobStatus) -> StoreError {
        match job_repo::find_by_id(&self.db, &id.to_string()) {
            Ok(Some(row)) => match row_to_job(row) {
                Ok(job) => StoreError::InvalidTransition {
                    id,
                    from: job.status,
                    to,
                },
                Err(e) => e,
            },
            Ok(None) => StoreError::NotFound(id),
            Err(e) => StoreError::Database(e),
        }
    }
}

impl JobStore for SqliteJobStore {
    fn create(&self, input_text: &str) -> Result<Job, StoreError> {
        let now = now_timestamp();
        let id = Uuid::new_v4();
        let row = JobRow {
            id: id.to_string(),
            status: JobStatus::Pending.as_str().to_string(),
            input_text: input_text.to_string(),
            summary: None,
            checklist: None,
            error_message: None,
            created_at: now.clone(),
            updated_at: now,
        };
        job_repo::insert(&self.db, &row)?;
        log::debug!("Created job {}", id);
        row_to_job(row)
    }

    fn get(&self, id: Uuid) -> Result<Job, StoreError> {
        match job_repo::find_by_id(&self.db, &id.to_string())? {
            Some(row) => row_to_job(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn update(&self, id: Uuid, update: JobUpdate) -> Result<Job, StoreError> {
        let key = id.to_string();
        let now = now_timestamp();
        let target = update.target_status();

        let applied = match &update {
            JobUpdate::StartProcessing => job_repo::mark_processing(&self.db, &key, &now)?,
            JobUpdate::RecordSummary(summary) => {
                job_repo::set_summary(&self.db, &key, summary, &now)?
            }
            JobUpdate::Complete(checklist) => {
                let encoded = serde_json::to_string(checklist)?;
                job_repo::mark_completed(&self.db, &key, &encoded, &now)?
            }
            JobUpdate::Fail(message) => job_repo::mark_failed(&self.db, &key, message, &now)?,
        };

        if !applied {
            return Err(self.transition_error(id, target));
        }

        self.get(id)
    }

    fn list(&self, query: &JobQuery) -> Result<(Vec<Job>, u64), StoreError> {
        let filter = JobFilter {
            status: query.status.map(|s| s.as_str().to_string()),
            limit: query.limit,
            offset: query.offset,
        };
        let (rows, total) = job_repo::query(&self.db, &filter)?;
        let jobs = rows
            .into_iter()
            .map(row_to_job)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, total))
    }

    fn count_by_status(&self, status: JobStatus) -> Result<u64, StoreError> {
        Ok(job_repo::count_by_status(&self.db, status.as_str())?)
    }
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_job(row: JobRow) -> Result<Job, StoreError> {
    let corrupt = |reason: String| DatabaseError::CorruptRow {
        id: row.id.clone(),
        reason,
    };

    let id = Uuid::parse_str(&row.id).map_err(|e| corrupt(format!("bad id: {}", e)))?;
    let status = row.status.parse::<JobStatus>().map_err(corrupt)?;
    let checklist = match row.checklist.as_deref() {
        Some(raw) => Some(
            serde_json::from_str::<Vec<String>>(raw)
                .map_err(|e| corrupt(format!("bad checklist: {}", e)))?,
        ),
        None => None,
    };
    let created_at = parse_timestamp(&row.created_at).map_err(&corrupt)?;
    let updated_at = parse_timestamp(&row.updated_at).map_err(&corrupt)?;

    Ok(Job {
        id,
        status,
        input_text: row.input_text,
        summary: row.summary,
        checklist,
        error_message: row.error_message,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}
