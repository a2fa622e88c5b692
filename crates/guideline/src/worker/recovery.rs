//! Startup recovery for jobs accepted by an earlier run.
//!
//! The queue lives in process memory, so ids that were queued but never
//! claimed before the process stopped survive only as `pending` rows.

use std::thread;
use std::time::Duration;

use log::{info, warn};
use uuid::Uuid;

use crate::job::JobStatus;
use crate::queue::{JobQueue, QueueError};
use crate::store::{JobQuery, JobStore, StoreError};

const PAGE_SIZE: u64 = 100;
const FULL_QUEUE_BACKOFF: Duration = Duration::from_millis(50);

/// Enqueues every `pending` job, oldest first, and returns how many were
/// queued.
///
/// Call after the worker pool has started: a full queue is retried while
/// workers drain it. A closed queue ends recovery early; the rest stay
/// `pending` for the next start.
pub fn requeue_pending(store: &dyn JobStore, queue: &dyn JobQueue) -> Result<usize, StoreError> {
    let ids = pending_ids(store)?;
    if ids.is_empty() {
        return Ok(0);
    }

    info!("Re-enqueueing {} pending jobs from a previous run", ids.len());

    for (queued, id) in ids.iter().enumerate() {
        loop {
            match queue.enqueue(*id) {
                Ok(()) => break,
                Err(QueueError::Full) => thread::sleep(FULL_QUEUE_BACKOFF),
                Err(QueueError::Closed) => {
                    warn!(
                        "Queue closed during recovery; {} jobs stay pending",
                        ids.len() - queued
                    );
                    return Ok(queued);
                }
            }
        }
    }

    Ok(ids.len())
}

fn pending_ids(store: &dyn JobStore) -> Result<Vec<Uuid>, StoreError> {
    let mut ids = Vec::new();
    loop {
        let (jobs, total) = store.list(&JobQuery {
            status: Some(JobStatus::Pending),
            limit: Some(PAGE_SIZE),
            offset: Some(ids.len() as u64),
        })?;
        let fetched = jobs.len();
        ids.extend(jobs.into_iter().map(|job| job.id));

        if fetched == 0 || ids.len() as u64 >= total {
            break;
        }
    }

    // Listing is newest first.
    ids.reverse();
    Ok(ids)
}
