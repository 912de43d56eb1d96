//! Property-based tests for paralysis_pool using proptest

use paralysis_pool::prelude::*;
use paralysis_pool::simulation::RunningMax;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Submit one job per value, each recording it into a shared maximum
fn max_through_pool(values: &[u32], threads: usize, order: QueueOrder) -> Option<u32> {
    let config = ThreadPoolConfig::new(threads).with_queue_order(order);
    let pool = ThreadPool::with_config(config).expect("Failed to create pool");
    let max = Arc::new(RunningMax::new());

    for &value in values {
        let max = Arc::clone(&max);
        pool.execute(move || {
            max.record(value);
            Ok(())
        })
        .expect("Failed to submit job");
    }

    pool.drain().expect("Failed to drain pool");
    pool.shutdown().expect("Failed to shutdown pool");
    max.get()
}

// ============================================================================
// Pool Configuration Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A pool reports exactly as many live workers as it was built with
    #[test]
    fn test_live_workers_match_config(threads in 1usize..16) {
        let pool = ThreadPool::with_threads(threads).expect("Failed to create pool");
        prop_assert_eq!(pool.num_threads(), threads);
        prop_assert_eq!(pool.live_workers(), threads);

        pool.shutdown().expect("Failed to shutdown pool");
        prop_assert_eq!(pool.live_workers(), 0);
    }

    /// Custom thread name prefixes are carried through
    #[test]
    fn test_config_thread_name_prefix(
        threads in 1usize..8,
        prefix in "[a-z]{3,10}"
    ) {
        let config = ThreadPoolConfig::new(threads).with_thread_name_prefix(&prefix);
        prop_assert!(config.validate().is_ok());

        let pool = ThreadPool::with_config(config).expect("Failed to create pool");
        prop_assert_eq!(pool.config().thread_name_prefix.as_str(), prefix.as_str());
        pool.shutdown().expect("Failed to shutdown pool");
    }
}

// ============================================================================
// Job Execution Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every submitted job runs exactly once before drain returns
    #[test]
    fn test_every_job_runs_once(job_count in 0usize..500, threads in 1usize..8) {
        let pool = ThreadPool::with_threads(threads).expect("Failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..job_count {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .expect("Failed to submit job");
        }

        pool.drain().expect("Failed to drain pool");
        prop_assert_eq!(counter.load(Ordering::SeqCst), job_count);
        prop_assert_eq!(pool.total_jobs_processed(), job_count as u64);
        prop_assert_eq!(pool.completion().outstanding(), 0);
        pool.shutdown().expect("Failed to shutdown pool");
    }

    /// The pooled maximum equals the sequential maximum
    #[test]
    fn test_running_max_matches_sequential(
        values in prop::collection::vec(any::<u32>(), 1..300),
        threads in 1usize..8
    ) {
        let expected = values.iter().copied().max();
        prop_assert_eq!(max_through_pool(&values, threads, QueueOrder::Fifo), expected);
    }

    /// Queue order never changes the result
    #[test]
    fn test_fifo_and_lifo_agree(values in prop::collection::vec(0u32..10_000, 1..200)) {
        let fifo = max_through_pool(&values, 4, QueueOrder::Fifo);
        let lifo = max_through_pool(&values, 4, QueueOrder::Lifo);
        prop_assert_eq!(fifo, lifo);
    }

    /// Failing and panicking jobs are isolated and counted
    #[test]
    fn test_failure_isolation(
        ok in 0usize..30,
        failing in 0usize..10,
        panicking in 0usize..5
    ) {
        let pool = ThreadPool::with_threads(3).expect("Failed to create pool");

        for _ in 0..ok {
            pool.execute(|| Ok(())).expect("Failed to submit job");
        }
        for _ in 0..failing {
            pool.execute(|| Err(ThreadError::other("no dice")))
                .expect("Failed to submit job");
        }
        for _ in 0..panicking {
            pool.execute(|| panic!("dice fell off the table"))
                .expect("Failed to submit job");
        }

        pool.drain().expect("Failed to drain pool");
        prop_assert_eq!(pool.total_jobs_processed(), ok as u64);
        prop_assert_eq!(pool.total_jobs_failed(), failing as u64);
        prop_assert_eq!(pool.total_jobs_panicked(), panicking as u64);
        prop_assert_eq!(pool.live_workers(), 3);
        pool.shutdown().expect("Failed to shutdown pool");
    }
}

// ============================================================================
// Randomized Workloads
// ============================================================================

#[test]
fn test_seeded_thousand_job_maximum() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let values: Vec<u32> = (0..1000).map(|_| rng.gen_range(0..1_000_000)).collect();
    let expected = values.iter().copied().max();

    assert_eq!(max_through_pool(&values, 8, QueueOrder::Fifo), expected);
    assert_eq!(max_through_pool(&values, 8, QueueOrder::Lifo), expected);
}

#[test]
fn test_concurrent_submitters() {
    let pool = Arc::new(ThreadPool::with_threads(4).expect("Failed to create pool"));
    let counter = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..250 {
                    let counter = Arc::clone(&counter);
                    pool.execute(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .expect("Failed to submit job");
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().expect("Submitter panicked");
    }

    pool.drain().expect("Failed to drain pool");
    assert_eq!(counter.load(Ordering::SeqCst), 1000);
    pool.shutdown().expect("Failed to shutdown pool");
}
