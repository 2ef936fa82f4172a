//! Error types for the pool.

use std::io;

/// Errors returned when building a pool or handing a task to a worker.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool was configured with room for zero workers.
    #[error("invalid capacity {0}: a pool needs room for at least one worker")]
    InvalidCapacity(usize),

    /// The operating system refused to start a worker thread.
    ///
    /// The admission is rolled back before this is returned, so the slot and
    /// key the task would have held are free again.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}
