use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::job::{Job, JobStatus};
use crate::store::{JobStore, StoreError};

/// Client-facing projection of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatusView {
    pub id: Uuid,
    pub status: JobStatus,
    /// `null` until the job reaches a terminal state.
    pub result: Option<JobResultView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobResultView {
    Completed {
        summary: String,
        checklist: Vec<String>,
    },
    Failed {
        error: String,
    },
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        let result = match job.status {
            JobStatus::Pending | JobStatus::Processing => None,
            JobStatus::Completed => Some(JobResultView::Completed {
                summary: job.summary.clone().unwrap_or_default(),
                checklist: job.checklist.clone().unwrap_or_default(),
            }),
            JobStatus::Failed => Some(JobResultView::Failed {
                error: job.error_message.clone().unwrap_or_default(),
            }),
        };

        Self {
            id: job.id,
            status: job.status,
            result,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Read-only access to job status for pollers.
pub struct StatusService {
    store: Arc<dyn JobStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Returns [`StoreError::NotFound`] for unknown ids.
    pub fn status(&self, id: Uuid) -> Result<JobStatusView, StoreError> {
        let job = self.store.get(id)?;
        Ok(JobStatusView::from(&job))
    }
}
