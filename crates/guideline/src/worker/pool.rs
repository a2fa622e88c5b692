use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};

use crate::error::WorkerError;
use crate::processor::{JobProcessor, ProcessOutcome};
use crate::queue::{QueueError, QueueReceiver};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed set of threads pulling job ids off the queue.
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn start(
        processor: JobProcessor,
        receiver: QueueReceiver,
        worker_count: usize,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::NoWorkers);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let rx = receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_processor = processor.clone();

            let handle = thread::Builder::new()
                .name(format!("guideline-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, rx, shutdown_flag, worker_processor))
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self { workers, shutdown })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops each worker after its current job. Ids still in the queue are
    /// not processed; they remain `pending` until [`super::requeue_pending`]
    /// runs on the next start. For a draining stop, drop every producer and
    /// call [`WorkerPool::wait`] instead.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Joins every worker. Without [`WorkerPool::shutdown`], workers keep
    /// taking ids until every producer is dropped and the queue is empty.
    pub fn wait(self) {
        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    receiver: QueueReceiver,
    shutdown: Arc<AtomicBool>,
    processor: JobProcessor,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match receiver.dequeue(POLL_INTERVAL) {
            Ok(Some(job_id)) => {
                debug!("Worker {} processing job {}", worker_id, job_id);
                let outcome = processor.process(job_id);
                if outcome == ProcessOutcome::Abandoned {
                    error!("Worker {} abandoned job {}", worker_id, job_id);
                }
            }
            Ok(None) => continue,
            Err(QueueError::Closed) => {
                debug!("Worker {} queue disconnected", worker_id);
                break;
            }
            Err(e) => {
                error!("Worker {} queue error: {}", worker_id, e);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
