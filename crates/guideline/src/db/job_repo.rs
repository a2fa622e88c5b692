//! Job repository: row-level operations on the `jobs` table.
//!
//! Status-changing statements are conditional on the current status, so a
//! write that would break the lifecycle simply affects zero rows. Callers
//! receive `false` and decide how to report it.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub status: String,
    pub input_text: String,
    pub summary: Option<String>,
    /// JSON array of checklist items.
    pub checklist: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            status: row.get("status")?,
            input_text: row.get("input_text")?,
            summary: row.get("summary")?,
            checklist: row.get("checklist")?,
            error_message: row.get("error_message")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Listing filter. An unset status matches every job.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Inserts a new job row.
pub fn insert(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO jobs (id, status, input_text, summary, checklist, error_message,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                job.id,
                job.status,
                job.input_text,
                job.summary,
                job.checklist,
                job.error_message,
                job.created_at,
                job.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists jobs newest first, returning (rows, total_count).
///
/// Jobs created within the same microsecond keep insertion order through
/// `rowid`, so pagination is stable.
pub fn query(db: &Database, filter: &JobFilter) -> Result<(Vec<JobRow>, u64), DatabaseError> {
    let status = filter.status.as_deref();
    let limit = filter.limit.unwrap_or(100) as i64;
    let offset = filter.offset.unwrap_or(0) as i64;

    db.with_conn(|conn| {
        let total: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE ?1 IS NULL OR status = ?1",
            params![status],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT * FROM jobs WHERE ?1 IS NULL OR status = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
            .query_map(params![status, limit, offset], JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rows, total))
    })
}

/// Counts jobs with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Moves a job from `pending` to `processing`.
///
/// Returns `false` when no pending job with that ID exists.
pub fn mark_processing(db: &Database, id: &str, updated_at: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET status = 'processing', updated_at = ?2
             WHERE id = ?1 AND status = 'pending'",
            params![id, updated_at],
        )?;
        Ok(changed == 1)
    })
}

/// Stores the stage-one summary of a processing job. The summary is written once.
pub fn set_summary(
    db: &Database,
    id: &str,
    summary: &str,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET summary = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'processing' AND summary IS NULL",
            params![id, summary, updated_at],
        )?;
        Ok(changed == 1)
    })
}

/// Stores the checklist and moves a summarized job to `completed`.
pub fn mark_completed(
    db: &Database,
    id: &str,
    checklist_json: &str,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET status = 'completed', checklist = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'processing' AND summary IS NOT NULL",
            params![id, checklist_json, updated_at],
        )?;
        Ok(changed == 1)
    })
}

/// Records an error message and moves a processing job to `failed`.
pub fn mark_failed(
    db: &Database,
    id: &str,
    error_message: &str,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET status = 'failed', error_message = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'processing'",
            params![id, error_message, updated_at],
        )?;
        Ok(changed == 1)
    })
}
