use keyed_pool::ThreadPool;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

#[test]
fn test_with_lock_returns_closure_result() {
    let pool = ThreadPool::with_state(1, vec![1, 2, 3]).unwrap();

    let sum: i32 = pool.with_lock(|values| values.iter().sum());
    assert_eq!(sum, 6);

    pool.with_lock(|values| values.push(4));
    assert_eq!(pool.with_lock(|values| values.len()), 4);
}

#[test]
fn test_with_lock_on_unit_state() {
    let pool = ThreadPool::new(1).unwrap();

    let answer = pool.with_lock(|_| 42);
    assert_eq!(answer, 42);
}

#[test]
fn test_with_lock_released_after_panic() {
    let pool = ThreadPool::with_state(2, 0usize).unwrap();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pool.with_lock(|count| {
            *count += 1;
            panic!("closure failure");
        })
    }));
    assert!(result.is_err());

    // The lock is free again and the pool still admits work.
    let handle = pool.handle();
    pool.submit(move || handle.with_lock(|count| *count += 1))
        .unwrap();
    pool.drain();

    assert_eq!(pool.with_lock(|count| *count), 2);
}

#[test]
fn test_with_lock_from_many_threads() {
    let pool = ThreadPool::with_state(8, 0u64).unwrap();

    thread::scope(|scope| {
        for _ in 0..4 {
            let handle = pool.handle();
            scope.spawn(move || {
                for _ in 0..250 {
                    let inner = handle.clone();
                    handle
                        .submit(move || inner.with_lock(|count| *count += 1))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(pool.into_state(), 1000);
}

#[test]
fn test_handle_outlives_pool() {
    let pool = ThreadPool::with_state(2, String::from("kept")).unwrap();
    let handle = pool.handle();

    let state = pool.into_state();
    assert_eq!(state, "kept");

    // The handle now sees the default left behind by `into_state`.
    assert!(handle.with_lock(|s| s.is_empty()));
    assert_eq!(handle.active_workers(), 0);
    assert_eq!(handle.capacity(), 2);

    handle.submit(|| {}).unwrap();
}
