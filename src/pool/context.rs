use std::cell::Cell;

thread_local! {
    /// Identity of the pool the current thread works for.
    ///
    /// Set once when a worker thread starts and never cleared, since worker
    /// threads run a single task and exit. `None` on every thread that is not
    /// a pool worker.
    static CURRENT_POOL: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Marks the current thread as a worker of the pool identified by `pool`.
pub(crate) fn enter_worker(pool: usize) {
    CURRENT_POOL.with(|p| p.set(Some(pool)));
}

/// Returns `true` if the current thread is a worker of the pool identified
/// by `pool`.
///
/// Used to avoid a worker waiting on its own completion.
pub(crate) fn is_worker_of(pool: usize) -> bool {
    CURRENT_POOL.with(|p| p.get() == Some(pool))
}
