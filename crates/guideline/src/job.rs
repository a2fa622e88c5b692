use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

/// A guideline processing job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub input_text: String,
    pub summary: Option<String>,
    pub checklist: Option<Vec<String>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single state change applied by the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// `pending -> processing`.
    StartProcessing,
    /// Persist the stage-one summary; status stays `processing`.
    RecordSummary(String),
    /// `processing -> completed` with the final checklist.
    Complete(Vec<String>),
    /// `processing -> failed` with an error description.
    Fail(String),
}

impl JobUpdate {
    /// The status the job is in after this update is applied.
    pub fn target_status(&self) -> JobStatus {
        match self {
            JobUpdate::StartProcessing | JobUpdate::RecordSummary(_) => JobStatus::Processing,
            JobUpdate::Complete(_) => JobStatus::Completed,
            JobUpdate::Fail(_) => JobStatus::Failed,
        }
    }
}
