use super::core::{Shared, ThreadPool};
use crate::error::PoolError;

use std::hash::Hash;
use std::thread;

use tracing::debug;

/// Prefix used for worker thread names when none is configured.
const DEFAULT_THREAD_NAME: &str = "keyed-pool-worker";

/// Settings applied to every worker thread a pool spawns.
pub(crate) struct WorkerConfig {
    /// Worker threads are named `"{thread_name}-{id}"`.
    pub(crate) thread_name: String,

    /// Stack size for worker threads, or the platform default.
    pub(crate) stack_size: Option<usize>,
}

/// Builder for configuring and creating a [`ThreadPool`].
///
/// `PoolBuilder` lets callers choose the worker limit and how worker threads
/// are spawned before constructing the pool. It is the only way to build a
/// pool with a key type other than `String`.
///
/// # Examples
///
/// ```rust,ignore
/// let pool: ThreadPool<u64> = PoolBuilder::new()
///     .max_workers(8)
///     .thread_name("ingest")
///     .build()?;
/// ```
pub struct PoolBuilder {
    /// Maximum number of concurrently running workers.
    max_workers: usize,

    /// Prefix for worker thread names.
    thread_name: String,

    /// Optional stack size for worker threads.
    stack_size: Option<usize>,
}

impl PoolBuilder {
    /// Creates a new `PoolBuilder` with default configuration.
    ///
    /// By default, the worker limit is set to the number of available
    /// logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let max_workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            max_workers,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }

    /// Sets the maximum number of workers that may run at once.
    ///
    /// A value of `0` is rejected when the pool is built.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    /// Sets the prefix used to name worker threads.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Sets the stack size, in bytes, of worker threads.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Builds a pool without caller state.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if the worker limit is `0`.
    pub fn build<K>(self) -> Result<ThreadPool<K, ()>, PoolError>
    where
        K: Eq + Hash + Clone + Send + 'static,
    {
        self.build_with_state(())
    }

    /// Builds a pool guarding `state` with its internal lock.
    ///
    /// The state is reachable through [`ThreadPool::with_lock`] and
    /// [`PoolHandle::with_lock`](super::PoolHandle::with_lock).
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if the worker limit is `0`.
    pub fn build_with_state<K, S>(self, state: S) -> Result<ThreadPool<K, S>, PoolError>
    where
        K: Eq + Hash + Clone + Send + 'static,
        S: Send + 'static,
    {
        if self.max_workers == 0 {
            return Err(PoolError::InvalidCapacity(self.max_workers));
        }

        debug!(
            max_workers = self.max_workers,
            thread_name = %self.thread_name,
            "building thread pool"
        );

        let config = WorkerConfig {
            thread_name: self.thread_name,
            stack_size: self.stack_size,
        };

        Ok(ThreadPool::from_shared(Shared::new(
            self.max_workers,
            config,
            state,
        )))
    }
}

impl Default for PoolBuilder {
    /// Creates a default `PoolBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
