use super::active::WorkerId;
use super::context;
use super::core::Shared;

use std::hash::Hash;
use std::io;
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

/// A single-use worker.
///
/// A `Worker` owns one admitted slot of the pool. It runs exactly one task on
/// its own thread and releases its slot (and key) when dropped, which happens
/// both when the task returns and when it unwinds.
struct Worker<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    /// Identifier assigned at admission.
    id: WorkerId,

    /// The pool this worker belongs to.
    shared: Arc<Shared<K, S>>,
}

impl<K, S> Worker<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    /// Runs the task on the current thread.
    ///
    /// The worker is consumed so that its slot is released as soon as the
    /// task is done.
    fn run<F>(self, task: F)
    where
        F: FnOnce(),
    {
        context::enter_worker(self.shared.id());
        task();
    }
}

impl<K, S> Drop for Worker<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    /// Releases the worker's slot and key, then wakes every waiter.
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(worker = self.id, "task panicked, releasing worker");
        }

        let remaining = {
            let mut guard = self.shared.lock.lock();
            guard.active.release(self.id);
            guard.active.len()
        };

        self.shared.released.notify_all();

        debug!(worker = self.id, active = remaining, "worker released");
    }
}

/// Starts a thread running `task` for the already admitted worker `id`.
///
/// The caller holds the pool lock and has registered `id`; the new thread
/// cannot release its slot before that lock is dropped. If the thread cannot
/// be created, the worker is never constructed and the caller must roll the
/// admission back.
pub(crate) fn spawn<K, S, F>(shared: Arc<Shared<K, S>>, id: WorkerId, task: F) -> io::Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
    F: FnOnce() + Send + 'static,
{
    let name = format!("{}-{}", shared.config.thread_name, id);
    let mut builder = thread::Builder::new().name(name);

    if let Some(size) = shared.config.stack_size {
        builder = builder.stack_size(size);
    }

    builder.spawn(move || {
        let worker = Worker { id, shared };
        worker.run(task);
    })?;

    Ok(())
}
