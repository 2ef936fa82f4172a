use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Identifier handed to each admitted worker.
///
/// Identifiers grow monotonically and are never reused within a pool, which
/// keeps log lines from different workers distinguishable.
pub(crate) type WorkerId = u64;

/// Bookkeeping for the workers and keys currently in flight.
///
/// `ActiveSet` is always accessed under the pool lock; it holds no
/// synchronization of its own. The two collections are updated together so
/// that a key is present in `keys` exactly as long as the worker that owns it
/// is present in `workers`.
pub(crate) struct ActiveSet<K> {
    /// Maximum number of workers allowed at once.
    capacity: usize,

    /// Running workers, with the key each one holds (if any).
    workers: HashMap<WorkerId, Option<K>>,

    /// Keys owned by a running worker.
    keys: HashSet<K>,

    /// Identifier for the next admitted worker.
    next_id: WorkerId,
}

impl<K> ActiveSet<K>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            workers: HashMap::with_capacity(capacity),
            keys: HashSet::new(),
            next_id: 0,
        }
    }

    /// Returns `true` if a task with the given key could be admitted now.
    ///
    /// A task is admissible when a worker slot is free and, for keyed tasks,
    /// no running worker holds the same key.
    pub(crate) fn can_admit(&self, key: Option<&K>) -> bool {
        self.workers.len() < self.capacity && key.is_none_or(|k| !self.keys.contains(k))
    }

    /// Reserves a slot (and the key, if any) for a new worker.
    ///
    /// Callers must check [`can_admit`](Self::can_admit) first.
    pub(crate) fn admit(&mut self, key: Option<K>) -> WorkerId {
        debug_assert!(self.can_admit(key.as_ref()));

        let id = self.next_id;
        self.next_id += 1;

        if let Some(k) = &key {
            self.keys.insert(k.clone());
        }
        self.workers.insert(id, key);

        id
    }

    /// Frees the slot and key held by `id`.
    ///
    /// Releasing an unknown worker is a no-op.
    pub(crate) fn release(&mut self, id: WorkerId) {
        if let Some(Some(key)) = self.workers.remove(&id) {
            self.keys.remove(&key);
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.workers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn holds_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }
}
