use keyed_pool::{PoolError, ThreadPool};
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), PoolError> {
    tracing_subscriber::fmt()
        .with_env_filter("keyed_pool=debug")
        .init();

    let pool = ThreadPool::with_state(4, BTreeMap::<String, Vec<usize>>::new())?;

    // Jobs for the same account never overlap; different accounts run side by side.
    for job in 0..12 {
        let account = format!("account-{}", job % 3);
        let handle = pool.handle();
        let key = account.clone();

        pool.submit_keyed(key, move || {
            thread::sleep(Duration::from_millis(20));
            handle.with_lock(|ledger| ledger.entry(account).or_default().push(job));
        })?;
    }

    pool.submit(|| println!("unkeyed housekeeping job"))?;

    let ledger = pool.into_state();
    for (account, jobs) in &ledger {
        println!("{account}: {jobs:?}");
    }

    Ok(())
}
