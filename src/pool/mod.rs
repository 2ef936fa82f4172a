//! Bounded keyed thread pool.
//!
//! This module contains everything needed to admit, run and retire tasks.
//!
//! It is composed of:
//! - [`ThreadPool`]: the owning pool, which drains on drop,
//! - [`PoolHandle`]: a cloneable handle usable from inside tasks,
//! - [`PoolBuilder`]: configuration of the worker limit and worker threads.
//!
//! Internally, a single lock guards the set of running workers, the keys
//! they hold, and the caller state. Submitters and drainers wait on one
//! condition variable that every finishing worker signals.

mod active;
mod builder;
mod context;
mod core;
mod worker;

pub use builder::PoolBuilder;
pub use self::core::{PoolHandle, ThreadPool};
