//! Test harness for isolated test execution.
//!
//! The `TestHarness` struct wires the real components together:
//! - A SQLite database in a temporary directory
//! - A bounded channel queue
//! - Submission and status services
//! - A `JobProcessor` driven by a `ScriptedGateway`
//!
//! Jobs are processed synchronously with `drain`, so tests can assert on
//! every intermediate state without sleeping.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use uuid::Uuid;

use guideline::queue::{self, ChannelQueue, QueueReceiver};
use guideline::{
    Database, JobProcessor, ProcessOutcome, SqliteJobStore, StatusService, SubmissionService,
};

use super::gateway::ScriptedGateway;

pub const MAX_INPUT_CHARS: usize = 10_000;

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub store: Arc<SqliteJobStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub queue: ChannelQueue,
    pub receiver: QueueReceiver,
    pub submission: SubmissionService,
    pub status: StatusService,
    pub processor: JobProcessor,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_queue_capacity(64)
    }

    pub fn with_queue_capacity(capacity: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("guideline.db");
        let db = Database::open(&db_path).expect("Failed to open test database");

        let store = Arc::new(SqliteJobStore::new(db));
        let gateway = Arc::new(ScriptedGateway::new());
        let (queue, receiver) = queue::channel(capacity);

        let submission =
            SubmissionService::new(store.clone(), Arc::new(queue.clone()), MAX_INPUT_CHARS);
        let status = StatusService::new(store.clone());
        let processor = JobProcessor::new(store.clone(), gateway.clone());

        Self {
            temp_dir,
            db_path,
            store,
            gateway,
            queue,
            receiver,
            submission,
            status,
            processor,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Submit text that is expected to validate.
    pub fn submit(&self, text: &str) -> Uuid {
        self.submission
            .submit(Some(text))
            .expect("Submission should succeed")
    }

    /// Process every message currently queued, in delivery order.
    pub fn drain(&self) -> Vec<(Uuid, ProcessOutcome)> {
        let mut outcomes = Vec::new();
        while let Ok(Some(id)) = self.receiver.dequeue(Duration::from_millis(10)) {
            outcomes.push((id, self.processor.process(id)));
        }
        outcomes
    }

    /// The status view exactly as a client would receive it.
    pub fn status_json(&self, id: Uuid) -> Value {
        let view = self.status.status(id).expect("Job should exist");
        serde_json::to_value(view).expect("Failed to serialize status view")
    }
}
