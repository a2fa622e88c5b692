use std::sync::Arc;

use guideline::{JobQueue, JobStore, StatusService, SubmissionService};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub submission: Arc<SubmissionService>,
    pub status: Arc<StatusService>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>, max_input_chars: usize) -> Self {
        Self {
            submission: Arc::new(SubmissionService::new(store.clone(), queue, max_input_chars)),
            status: Arc::new(StatusService::new(store)),
        }
    }
}
