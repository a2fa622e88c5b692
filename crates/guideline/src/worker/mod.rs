pub mod pool;
pub mod recovery;

pub use pool::WorkerPool;
pub use recovery::requeue_pending;
