pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod job;
pub mod processor;
pub mod queue;
pub mod secrets;
pub mod service;
pub mod store;
pub mod worker;

pub use config::{load_config, load_config_from_str, load_or_default, Config};
pub use db::Database;
pub use error::{ConfigError, GuidelineError, Result, WorkerError};
pub use gateway::{GatewayError, LlmGateway, OpenAiGateway};
pub use job::{Job, JobStatus, JobUpdate};
pub use processor::{JobProcessor, ProcessOutcome};
pub use queue::{ChannelQueue, JobQueue, QueueError, QueueReceiver};
pub use secrets::{resolve_api_key, resolve_secret, resolve_secret_optional, SecretError};
pub use service::{
    JobResultView, JobStatusView, StatusService, SubmissionService, SubmitError, ValidationError,
};
pub use store::{JobQuery, JobStore, SqliteJobStore, StoreError};
pub use worker::{requeue_pending, WorkerPool};
