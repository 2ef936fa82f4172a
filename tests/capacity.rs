use keyed_pool::{PoolError, ThreadPool};
use rand::Rng;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Concurrency {
    running: usize,
    peak: usize,
    finished: usize,
}

#[test]
fn test_capacity_never_exceeded() {
    let pool = ThreadPool::with_state(4, Concurrency::default()).unwrap();

    for _ in 0..40 {
        let handle = pool.handle();
        pool.submit(move || {
            handle.with_lock(|c| {
                c.running += 1;
                c.peak = c.peak.max(c.running);
            });

            thread::sleep(Duration::from_millis(5));

            handle.with_lock(|c| {
                c.running -= 1;
                c.finished += 1;
            });
        })
        .unwrap();

        assert!(pool.active_workers() <= 4);
    }

    let stats = pool.into_state();
    assert_eq!(stats.finished, 40);
    assert_eq!(stats.running, 0);
    assert!(stats.peak <= 4, "peak concurrency was {}", stats.peak);
}

#[test]
fn test_unkeyed_tasks_all_run() {
    let pool = ThreadPool::with_state(10, Vec::new()).unwrap();

    for i in 0..1000 {
        let handle = pool.handle();
        pool.submit(move || {
            let delay = rand::thread_rng().gen_range(0..5);
            thread::sleep(Duration::from_millis(delay));
            handle.with_lock(|results| results.push(i));
        })
        .unwrap();
    }

    pool.drain();

    let mut results = pool.with_lock(|results| results.clone());
    assert_eq!(results.len(), 1000);

    results.sort_unstable();
    assert_eq!(results, (0..1000).collect::<Vec<_>>());
}

#[test]
fn test_unkeyed_tasks_run_in_parallel() {
    let pool = ThreadPool::new(3).unwrap();
    let barrier = Arc::new(Barrier::new(3));

    // Each task waits for the other two, so this only completes if all
    // three run at the same time.
    for _ in 0..3 {
        let barrier = barrier.clone();
        pool.submit(move || {
            barrier.wait();
        })
        .unwrap();
    }

    pool.drain();
    assert_eq!(pool.active_workers(), 0);
}

#[test]
fn test_capacity_one_serializes_distinct_keys() {
    let pool = ThreadPool::new(1).unwrap();
    let start = Instant::now();

    for key in ["left", "right"] {
        pool.submit_keyed(key.to_string(), || {
            thread::sleep(Duration::from_millis(100));
        })
        .unwrap();
    }

    pool.drain();

    assert!(
        start.elapsed() >= Duration::from_millis(200),
        "tasks overlapped: {:?}",
        start.elapsed()
    );
}

#[test]
fn test_capacity_two_overlaps_distinct_keys() {
    let pool = ThreadPool::new(2).unwrap();
    let start = Instant::now();

    for key in ["left", "right"] {
        pool.submit_keyed(key.to_string(), || {
            thread::sleep(Duration::from_millis(200));
        })
        .unwrap();
    }

    pool.drain();

    assert!(
        start.elapsed() < Duration::from_millis(350),
        "tasks did not overlap: {:?}",
        start.elapsed()
    );
}

#[test]
fn test_zero_capacity_rejected() {
    let result = ThreadPool::new(0);
    assert!(matches!(result, Err(PoolError::InvalidCapacity(0))));

    let result = ThreadPool::with_state(0, Vec::<usize>::new());
    assert!(matches!(result, Err(PoolError::InvalidCapacity(0))));
}

#[test]
fn test_zero_capacity_error_message() {
    let err = ThreadPool::new(0).err().unwrap();
    assert_eq!(
        err.to_string(),
        "invalid capacity 0: a pool needs room for at least one worker"
    );
}
