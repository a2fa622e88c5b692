//! Synchronous entry points used by the HTTP layer.

pub mod status;
pub mod submission;

pub use status::{JobResultView, JobStatusView, StatusService};
pub use submission::{SubmissionService, SubmitError, ValidationError};
