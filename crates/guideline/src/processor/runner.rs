use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::gateway::{GatewayError, LlmGateway};
use crate::job::{Job, JobUpdate};
use crate::store::{JobStore, StoreError};

use super::checklist::parse_checklist;
use super::error::StageError;

/// How a single delivery of a job id ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed,
    Failed,
    /// The id does not exist in the store.
    NotFound,
    /// The job was already claimed or finished; no gateway call was made.
    Skipped,
    /// The job could not be moved to a terminal state because the store
    /// rejected the write.
    Abandoned,
}

/// Redelivery-safe pipeline runner. Cheap to clone, one per worker.
#[derive(Clone)]
pub struct JobProcessor {
    store: Arc<dyn JobStore>,
    gateway: Arc<dyn LlmGateway>,
}

impl JobProcessor {
    pub fn new(store: Arc<dyn JobStore>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self { store, gateway }
    }

    /// Processes one delivery of `id`. Never returns an error; every
    /// failure is either recorded on the job or logged.
    pub fn process(&self, id: Uuid) -> ProcessOutcome {
        let _job_span = info_span!("job", job_id = %id).entered();

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(id))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.fail(id, StageError::Panicked(detail))
            }
        }
    }

    fn run(&self, id: Uuid) -> ProcessOutcome {
        // Step 1: claim the job
        let job = {
            let _step = info_span!("claim").entered();
            match self.store.update(id, JobUpdate::StartProcessing) {
                Ok(job) => job,
                Err(StoreError::NotFound(_)) => {
                    warn!("Job {} not found, dropping message", id);
                    return ProcessOutcome::NotFound;
                }
                Err(StoreError::InvalidTransition { from, .. }) => {
                    info!("Job {} is already {}, skipping redelivery", id, from);
                    return ProcessOutcome::Skipped;
                }
                Err(e) => {
                    error!("Failed to claim job {}: {}", id, e);
                    return ProcessOutcome::Abandoned;
                }
            }
        };

        // Step 2: summarize
        let summary = {
            let _step = info_span!("summarize").entered();
            match self.step_summarize(&job) {
                Ok(summary) => summary,
                Err(e) => return self.fail(id, e),
            }
        };

        // Step 3: checklist
        {
            let _step = info_span!("checklist").entered();
            if let Err(e) = self.step_checklist(id, &summary) {
                return self.fail(id, e);
            }
        }

        info!("Job {} completed", id);
        ProcessOutcome::Completed
    }

    fn step_summarize(&self, job: &Job) -> Result<String, StageError> {
        let summary = self.gateway.summarize(&job.input_text)?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(GatewayError::EmptyResponse.into());
        }

        self.store
            .update(job.id, JobUpdate::RecordSummary(summary.to_string()))?;
        debug!("Stored summary ({} chars)", summary.len());
        Ok(summary.to_string())
    }

    fn step_checklist(&self, id: Uuid, summary: &str) -> Result<(), StageError> {
        let raw = self.gateway.generate_checklist(summary)?;
        let items = parse_checklist(&raw);
        if items.is_empty() {
            warn!("Checklist for job {} is empty", id);
        }
        debug!("Parsed {} checklist items", items.len());

        self.store.update(id, JobUpdate::Complete(items))?;
        Ok(())
    }

    /// Best-effort transition to `failed`.
    fn fail(&self, id: Uuid, cause: StageError) -> ProcessOutcome {
        let message = cause.to_string();
        error!("Job {} failed: {}", id, message);

        match self.store.update(id, JobUpdate::Fail(message)) {
            Ok(_) => ProcessOutcome::Failed,
            Err(StoreError::NotFound(_)) => {
                warn!("Job {} vanished before its failure could be recorded", id);
                ProcessOutcome::Abandoned
            }
            Err(e) => {
                error!("Could not record failure for job {}: {}", id, e);
                ProcessOutcome::Abandoned
            }
        }
    }
}
