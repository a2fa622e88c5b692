use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{error, info};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::queue::{JobQueue, QueueError};
use crate::store::{JobStore, StoreError};

pub const INPUT_TEXT_FIELD: &str = "input_text";

/// Field-level validation failures, serialized as `{field: [messages]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to store job: {0}")]
    Store(#[from] StoreError),

    /// The job row exists and stays `pending`, but no worker will see it.
    #[error("Job {job_id} was stored but could not be queued: {source}")]
    Enqueue {
        job_id: Uuid,
        #[source]
        source: QueueError,
    },
}

/// Validates guideline text, stores a job and queues it.
pub struct SubmissionService {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    max_input_chars: usize,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>, max_input_chars: usize) -> Self {
        Self {
            store,
            queue,
            max_input_chars,
        }
    }

    /// Returns the trimmed text if it is acceptable.
    pub fn validate<'a>(&self, input_text: Option<&'a str>) -> Result<&'a str, ValidationError> {
        let text = match input_text {
            Some(text) => text.trim(),
            None => {
                return Err(ValidationError::single(
                    INPUT_TEXT_FIELD,
                    "This field is required.",
                ))
            }
        };

        if text.is_empty() {
            return Err(ValidationError::single(
                INPUT_TEXT_FIELD,
                "This field may not be blank.",
            ));
        }

        if text.chars().count() > self.max_input_chars {
            return Err(ValidationError::single(
                INPUT_TEXT_FIELD,
                format!(
                    "Ensure this field has no more than {} characters.",
                    self.max_input_chars
                ),
            ));
        }

        Ok(text)
    }

    /// Creates a `pending` job and queues it, returning its id without
    /// waiting for processing.
    pub fn submit(&self, input_text: Option<&str>) -> Result<Uuid, SubmitError> {
        let text = self.validate(input_text)?;
        let job = self.store.create(text)?;

        if let Err(source) = self.queue.enqueue(job.id) {
            error!("Job {} stored but not queued: {}", job.id, source);
            return Err(SubmitError::Enqueue {
                job_id: job.id,
                source,
            });
        }

        info!("Accepted job {} ({} chars)", job.id, text.chars().count());
        Ok(job.id)
    }
}
