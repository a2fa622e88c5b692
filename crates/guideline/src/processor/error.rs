use thiserror::Error;

use crate::gateway::GatewayError;
use crate::store::StoreError;

/// Why a pipeline stage stopped. Its `Display` text becomes the job's
/// `error_message`.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error("worker panicked: {0}")]
    Panicked(String),
}
