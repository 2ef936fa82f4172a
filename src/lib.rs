//! # keyed-pool
//!
//! **keyed-pool** is a small blocking thread pool for the **Nebula** ecosystem that
//! bounds how many tasks run at once and guarantees that tasks sharing a key never
//! run at the same time.
//!
//! Every admitted task gets a fresh OS thread that is discarded once the task
//! returns, so no thread-local state leaks from one task into the next. Submitting
//! blocks the caller until a slot (and the task's key, if any) is free; tasks with
//! different keys, or no key at all, run side by side up to the configured limit.
//!
//! - **Bounded concurrency**: never more than `max_workers` tasks in flight
//! - **Key exclusion**: tasks submitted with the same key are serialized
//! - **Drain**: block until every in-flight worker has finished
//! - **Shared lock**: `with_lock` gives callers the pool's own lock for their state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keyed_pool::ThreadPool;
//!
//! let pool: ThreadPool<String, Vec<usize>> = ThreadPool::with_state(4, Vec::new())?;
//!
//! for i in 0..100 {
//!     let handle = pool.handle();
//!     pool.submit_keyed("orders".to_string(), move || {
//!         handle.with_lock(|results| results.push(i));
//!     })?;
//! }
//!
//! let results = pool.into_state();
//! assert_eq!(results, (0..100).collect::<Vec<_>>());
//! ```
//!
//! ## Modules
//!
//! - [`pool`] — the pool, its builder and handles
//! - [`error`] — construction and spawn errors

pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::{PoolBuilder, PoolHandle, ThreadPool};
