use super::active::ActiveSet;
use super::builder::{PoolBuilder, WorkerConfig};
use super::context;
use super::worker;
use crate::error::PoolError;

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

/// Everything the pool lock protects.
pub(crate) struct Guarded<K, S> {
    /// Running workers and the keys they hold.
    pub(crate) active: ActiveSet<K>,

    /// Caller state exposed through `with_lock`.
    pub(crate) state: S,
}

/// State shared between the pool, its handles and its workers.
pub(crate) struct Shared<K, S> {
    /// The single lock guarding bookkeeping and caller state.
    pub(crate) lock: Mutex<Guarded<K, S>>,

    /// Signalled every time a worker releases its slot.
    ///
    /// Submitters waiting for admission and callers of `drain` both wait
    /// on this condition.
    pub(crate) released: Condvar,

    /// How worker threads are spawned.
    pub(crate) config: WorkerConfig,
}

impl<K, S> Shared<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    pub(crate) fn new(capacity: usize, config: WorkerConfig, state: S) -> Arc<Self> {
        Arc::new(Self {
            lock: Mutex::new(Guarded {
                active: ActiveSet::new(capacity),
                state,
            }),
            released: Condvar::new(),
            config,
        })
    }

    /// Stable identity of this pool, used to recognise its own workers.
    pub(crate) fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Blocks until the task can be admitted, then hands it to a new worker.
    ///
    /// The eligibility check and the registration happen under one
    /// acquisition of the lock: waking from the condition variable re-acquires
    /// the lock before the check is repeated, so two submitters can never
    /// both claim the last slot or the same key.
    fn submit<F>(self: &Arc<Self>, key: Option<K>, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut guard = self.lock.lock();

        while !guard.active.can_admit(key.as_ref()) {
            trace!(
                keyed = key.is_some(),
                active = guard.active.len(),
                "waiting for admission"
            );
            self.released.wait(&mut guard);
        }

        let keyed = key.is_some();
        let id = guard.active.admit(key);

        if let Err(err) = worker::spawn(self.clone(), id, task) {
            // Still under the lock since admission, so no waiter saw the slot taken.
            guard.active.release(id);
            return Err(PoolError::Spawn(err));
        }

        debug!(worker = id, keyed, active = guard.active.len(), "worker admitted");
        Ok(())
    }

    /// Blocks until no worker is active.
    ///
    /// The lock is released while waiting, so other threads keep submitting.
    /// Returning only means the active set was observed empty at one instant.
    fn drain(&self) {
        let mut guard = self.lock.lock();

        while !guard.active.is_empty() {
            trace!(active = guard.active.len(), "draining");
            self.released.wait(&mut guard);
        }
    }

    fn with_lock<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut guard = self.lock.lock();
        f(&mut guard.state)
    }
}

/// A bounded thread pool with per-key mutual exclusion.
///
/// `ThreadPool` runs each submitted task on a fresh thread, with at most
/// `capacity` tasks in flight. Tasks submitted with the same key never run
/// concurrently; tasks with different keys or no key share only the
/// capacity limit.
///
/// The pool also guards a caller-supplied state value `S` with the same lock
/// it uses for its own bookkeeping, see [`with_lock`](Self::with_lock).
///
/// Dropping the pool waits for every in-flight worker to finish.
pub struct ThreadPool<K = String, S = ()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    handle: PoolHandle<K, S>,
}

impl ThreadPool {
    /// Creates a pool running at most `capacity` tasks at once, keyed by
    /// `String`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if `capacity` is `0`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pool = ThreadPool::new(10)?;
    /// pool.submit(|| println!("hello from a worker"))?;
    /// pool.drain();
    /// ```
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        PoolBuilder::new().max_workers(capacity).build()
    }
}

impl<S> ThreadPool<String, S>
where
    S: Send + 'static,
{
    /// Creates a pool keyed by `String` that guards `state`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] if `capacity` is `0`.
    pub fn with_state(capacity: usize, state: S) -> Result<Self, PoolError> {
        PoolBuilder::new()
            .max_workers(capacity)
            .build_with_state(state)
    }
}

impl<K, S> ThreadPool<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    pub(crate) fn from_shared(shared: Arc<Shared<K, S>>) -> Self {
        Self {
            handle: PoolHandle { shared },
        }
    }

    /// Returns a cloneable handle to this pool.
    ///
    /// Handles are meant to be moved into tasks that need to reach the
    /// shared state or submit follow-up work.
    pub fn handle(&self) -> PoolHandle<K, S> {
        self.handle.clone()
    }

    /// Submits a task with no key.
    ///
    /// Blocks until a worker slot is free, then returns as soon as the task
    /// has been handed to its worker. The task may still be running when this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if the worker thread could not be started.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.submit(task)
    }

    /// Submits a task that must not run concurrently with any other task
    /// holding `key`.
    ///
    /// Blocks until a worker slot is free and `key` is not held by a running
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if the worker thread could not be started.
    pub fn submit_keyed<F>(&self, key: K, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.submit_keyed(key, task)
    }

    /// Blocks until every active worker has finished.
    ///
    /// This is a point-in-time check: tasks submitted from other threads
    /// while draining may be admitted, and the call returns once the active
    /// set is observed empty. It does not prevent later submissions.
    ///
    /// Calling `drain` from inside a task of the same pool never returns.
    pub fn drain(&self) {
        self.handle.shared.drain();
    }

    /// Runs `f` with the pool lock held and returns its result.
    ///
    /// See [`PoolHandle::with_lock`].
    pub fn with_lock<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        self.handle.with_lock(f)
    }

    /// Drains the pool and returns the caller state.
    ///
    /// The state is taken out under the lock and replaced with its default,
    /// so handles that outlive the pool see `S::default()`.
    ///
    /// Like [`drain`](Self::drain), calling this from inside a task of the
    /// same pool never returns.
    pub fn into_state(self) -> S
    where
        S: Default,
    {
        self.drain();
        self.with_lock(std::mem::take)
    }

    /// Maximum number of workers that may run at once.
    pub fn capacity(&self) -> usize {
        self.handle.capacity()
    }

    /// Number of workers currently running.
    pub fn active_workers(&self) -> usize {
        self.handle.active_workers()
    }

    /// Number of keys currently held by running workers.
    pub fn active_keys(&self) -> usize {
        self.handle.active_keys()
    }

    /// Returns `true` if a running worker holds `key`.
    pub fn is_key_active(&self, key: &K) -> bool {
        self.handle.is_key_active(key)
    }
}

impl<K, S> Drop for ThreadPool<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    /// Waits for in-flight workers to finish.
    ///
    /// When the pool is dropped by one of its own workers the wait is
    /// skipped, since that worker is part of the active set.
    fn drop(&mut self) {
        if context::is_worker_of(self.handle.shared.id()) {
            return;
        }

        self.drain();
    }
}

/// A cloneable handle to a [`ThreadPool`].
///
/// A handle can submit tasks and reach the shared state, but cannot drain
/// the pool and never waits for workers when dropped. Workers keep the pool's
/// internals alive, so a handle stays usable after the pool itself is gone.
pub struct PoolHandle<K = String, S = ()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    shared: Arc<Shared<K, S>>,
}

impl<K, S> Clone for PoolHandle<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<K, S> PoolHandle<K, S>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
{
    /// Submits a task with no key. See [`ThreadPool::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if the worker thread could not be started.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.submit(None, task)
    }

    /// Submits a keyed task. See [`ThreadPool::submit_keyed`].
    ///
    /// A task that submits work under its own key waits forever, since the
    /// key is only released once the submitting task returns.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if the worker thread could not be started.
    pub fn submit_keyed<F>(&self, key: K, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.submit(Some(key), task)
    }

    /// Runs `f` with the pool lock held and returns its result.
    ///
    /// This is the same lock the pool takes to admit and release workers, so
    /// updates made here are ordered with respect to admissions. The lock is
    /// released on every exit path, including a panic in `f`.
    ///
    /// `f` must not call back into the pool (`submit`, `with_lock`, or any of
    /// the counters): the lock is not reentrant and doing so deadlocks.
    pub fn with_lock<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        self.shared.with_lock(f)
    }

    /// Maximum number of workers that may run at once.
    pub fn capacity(&self) -> usize {
        self.shared.lock.lock().active.capacity()
    }

    /// Number of workers currently running.
    pub fn active_workers(&self) -> usize {
        self.shared.lock.lock().active.len()
    }

    /// Number of keys currently held by running workers.
    pub fn active_keys(&self) -> usize {
        self.shared.lock.lock().active.key_count()
    }

    /// Returns `true` if a running worker holds `key`.
    pub fn is_key_active(&self, key: &K) -> bool {
        self.shared.lock.lock().active.holds_key(key)
    }
}
