//! Processing queue between submission and the worker pool.
//!
//! Messages carry only the job id; the job itself is read from the store
//! when a worker picks it up. Delivery is at-least-once from the
//! processor's point of view, so consumers must tolerate duplicates.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("processing queue is full")]
    Full,

    #[error("processing queue is closed")]
    Closed,
}

/// Producer side of the queue.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, job_id: Uuid) -> Result<(), QueueError>;
}

/// Bounded in-process queue backed by a crossbeam channel.
#[derive(Clone)]
pub struct ChannelQueue {
    sender: Sender<Uuid>,
}

/// Consumer side of a [`ChannelQueue`]. Cloneable, one per worker.
#[derive(Clone)]
pub struct QueueReceiver {
    receiver: Receiver<Uuid>,
}

/// Creates a queue holding at most `capacity` undelivered messages.
pub fn channel(capacity: usize) -> (ChannelQueue, QueueReceiver) {
    let (sender, receiver) = bounded(capacity);
    (ChannelQueue { sender }, QueueReceiver { receiver })
}

impl JobQueue for ChannelQueue {
    fn enqueue(&self, job_id: Uuid) -> Result<(), QueueError> {
        self.sender.try_send(job_id).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }
}

impl QueueReceiver {
    /// Waits up to `timeout` for the next job id. `Ok(None)` means nothing
    /// arrived in time; `Err(Closed)` means every producer is gone and the
    /// queue is drained.
    pub fn dequeue(&self, timeout: Duration) -> Result<Option<Uuid>, QueueError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(id) => Ok(Some(id)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Closed),
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
