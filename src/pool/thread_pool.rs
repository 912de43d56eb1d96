//! Thread pool implementation

use crate::core::{ClosureJob, Job, Result, ThreadError};
use crate::pool::shared::{CompletionSnapshot, PoolShared};
use crate::pool::worker::{Worker, WorkerSettings, WorkerStats};
use crate::queue::{JobQueue, QueueError, QueueOrder};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for thread pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadPoolConfig {
    /// Number of worker threads, fixed for the pool's lifetime
    pub num_threads: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Longest time an idle worker parks before polling the queue again.
    /// Default: 100ms
    ///
    /// Pushes and shutdown wake parked workers directly, so this only bounds
    /// how long a missed wakeup can delay a worker.
    pub poll_interval: Duration,
    /// End of the queue workers pop from. Default: FIFO
    pub queue_order: QueueOrder,
    /// Base seed for the per-worker RNGs. `None` seeds each worker from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "worker".to_string(),
            poll_interval: Duration::from_millis(100),
            queue_order: QueueOrder::default(),
            rng_seed: None,
        }
    }
}

impl ThreadPoolConfig {
    /// Create a new configuration with specified number of threads
    ///
    /// Zero is kept as given and rejected by [`validate`](Self::validate).
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Default::default()
        }
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the idle worker poll interval.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be non-zero");
        self.poll_interval = interval;
        self
    }

    /// Set the queue pop order.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_order(mut self, order: QueueOrder) -> Self {
        self.queue_order = order;
        self
    }

    /// Seed every worker's RNG deterministically from `seed`.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(ThreadError::invalid_config(
                "num_threads",
                "Number of threads must be greater than 0",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ThreadError::invalid_config(
                "poll_interval",
                "Poll interval must be non-zero",
            ));
        }
        Ok(())
    }
}

/// A fixed-size pool of persistent worker threads sharing one job queue
///
/// # Lifecycle
///
/// Workers are spawned by the constructor and poll the queue until
/// [`shutdown`](Self::shutdown). The owner submits jobs, waits with
/// [`drain`](Self::drain), then shuts the pool down. Dropping a pool that is
/// still running shuts it down.
///
/// # Ordering
///
/// Nothing is guaranteed about the order in which submitted jobs run relative
/// to each other. Jobs that share state must synchronize on their own locks.
pub struct ThreadPool {
    config: ThreadPoolConfig,
    shared: Arc<PoolShared>,
    workers: RwLock<Vec<Worker>>,
    // Outlives the workers so totals stay readable after shutdown
    stats: Vec<Arc<WorkerStats>>,
    running: AtomicBool,
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("completion", &self.shared.completion.snapshot())
            .finish()
    }
}

impl ThreadPool {
    /// Create a pool with one worker per CPU
    pub fn new() -> Result<Self> {
        Self::with_config(ThreadPoolConfig::default())
    }

    /// Create a pool with specified number of threads
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        Self::with_config(ThreadPoolConfig::new(num_threads))
    }

    /// Create a pool with custom configuration and spawn its workers
    ///
    /// # Errors
    ///
    /// - `ThreadError::InvalidConfig` - zero workers or zero poll interval
    /// - `ThreadError::SpawnError` - the OS refused a worker thread; workers
    ///   spawned before the failure are stopped and joined
    pub fn with_config(config: ThreadPoolConfig) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(PoolShared::new(JobQueue::new(config.queue_order)));

        let mut workers = Vec::with_capacity(config.num_threads);
        for id in 0..config.num_threads {
            let settings = WorkerSettings {
                name: format!("{}-{}", config.thread_name_prefix, id),
                poll_interval: config.poll_interval,
                rng_seed: config.rng_seed,
            };
            match Worker::spawn(id, Arc::clone(&shared), settings) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    shared.queue.close();
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(e);
                }
            }
        }

        #[cfg(feature = "tracing")]
        crate::telemetry::record_pool_start(config.num_threads, config.queue_order);
        #[cfg(not(feature = "tracing"))]
        log::info!(
            "thread pool '{}' started with {} workers ({:?} queue)",
            config.thread_name_prefix,
            config.num_threads,
            config.queue_order
        );

        let stats = workers.iter().map(Worker::stats).collect();

        Ok(Self {
            config,
            shared,
            workers: RwLock::new(workers),
            stats,
            running: AtomicBool::new(true),
        })
    }

    /// Submit a job to the pool
    ///
    /// Never blocks on capacity; the queue is unbounded.
    ///
    /// # Errors
    ///
    /// - `ThreadError::ShuttingDown` - [`shutdown`](Self::shutdown) has begun.
    ///   Submitting concurrently with shutdown is a caller bug; the job is
    ///   rejected rather than silently lost.
    pub fn submit<J: Job + 'static>(&self, job: J) -> Result<()> {
        if !self.running.load(Ordering::Acquire) {
            return Err(ThreadError::shutting_down(self.queue_size()));
        }

        self.shared.completion.accept();
        match self.shared.queue.push(Box::new(job)) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                crate::telemetry::record_submission(self.shared.queue.len());
                Ok(())
            }
            Err(QueueError::Closed(_job)) => {
                self.shared.completion.withdraw();
                Err(ThreadError::shutting_down(self.queue_size()))
            }
        }
    }

    /// Submit a closure as a job
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(ClosureJob::new(f))
    }

    /// Block until every accepted job has finished running
    ///
    /// Waits on a completion counter rather than on queue emptiness, so a job
    /// popped just before the call is still waited for. Returns promptly when
    /// nothing was submitted. Jobs submitted while draining are waited for too.
    ///
    /// # Errors
    ///
    /// - `ThreadError::ShuttingDown` - the pool was shut down with jobs still
    ///   queued; those jobs were discarded and will never run
    pub fn drain(&self) -> Result<()> {
        let counts = self.shared.completion.wait();
        if counts.abandoned > 0 {
            return Err(ThreadError::shutting_down(counts.abandoned as usize));
        }
        Ok(())
    }

    /// Get the number of worker threads
    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    /// Get the pool configuration
    pub fn config(&self) -> &ThreadPoolConfig {
        &self.config
    }

    /// Number of worker threads currently alive
    pub fn live_workers(&self) -> usize {
        self.shared.live_workers()
    }

    /// Check if the pool is accepting jobs
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Get total number of jobs accepted
    pub fn total_jobs_submitted(&self) -> u64 {
        self.shared.completion.snapshot().submitted
    }

    /// Get total number of jobs that finished running, whatever the outcome
    pub fn total_jobs_finished(&self) -> u64 {
        self.shared.completion.snapshot().finished
    }

    /// Submitted, finished and abandoned counts at one instant
    pub fn completion(&self) -> CompletionSnapshot {
        self.shared.completion.snapshot()
    }

    /// Get current queue size (approximate)
    ///
    /// Jobs waiting to be picked up; running jobs are not counted.
    pub fn queue_size(&self) -> usize {
        self.shared.queue.len()
    }

    /// Get statistics for all workers
    ///
    /// Still available after shutdown, holding the final counts.
    pub fn get_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.stats.clone()
    }

    /// Get total jobs completed successfully across all workers
    pub fn total_jobs_processed(&self) -> u64 {
        self.stats.iter().map(|s| s.get_jobs_processed()).sum()
    }

    /// Get total jobs that returned an error across all workers
    pub fn total_jobs_failed(&self) -> u64 {
        self.stats.iter().map(|s| s.get_jobs_failed()).sum()
    }

    /// Get total jobs panicked across all workers
    pub fn total_jobs_panicked(&self) -> u64 {
        self.stats.iter().map(|s| s.get_jobs_panicked()).sum()
    }

    /// Stop all workers and join their threads
    ///
    /// 1. Stops accepting new jobs
    /// 2. Closes the queue, waking parked workers
    /// 3. Joins every worker; jobs already running finish first
    /// 4. Discards jobs still queued and releases anyone blocked in
    ///    [`drain`](Self::drain)
    ///
    /// Call [`drain`](Self::drain) first to run everything that was
    /// submitted. Only the first call does any work; later calls return
    /// `Ok(())`.
    pub fn shutdown(&self) -> Result<()> {
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        self.shared.queue.close();

        let workers = std::mem::take(&mut *self.workers.write());
        let mut first_error = None;
        for worker in workers {
            if let Err(e) = worker.join() {
                first_error.get_or_insert(e);
            }
        }
        // Joined workers have published their last job's outcome
        let processed = self.total_jobs_processed();
        let failed = self.total_jobs_failed() + self.total_jobs_panicked();

        let abandoned = self.shared.queue.clear();
        if abandoned > 0 {
            log::warn!(
                "thread pool '{}' discarded {} queued jobs at shutdown",
                self.config.thread_name_prefix,
                abandoned
            );
        }
        self.shared.completion.abandon(abandoned as u64);

        #[cfg(feature = "tracing")]
        crate::telemetry::record_pool_shutdown(processed, failed);
        #[cfg(not(feature = "tracing"))]
        log::info!(
            "thread pool '{}' stopped ({} jobs processed, {} failed)",
            self.config.thread_name_prefix,
            processed,
            failed
        );

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if self.running.load(Ordering::Acquire) {
            if let Err(e) = self.shutdown() {
                log::error!(
                    "failed to shut down thread pool '{}' during drop: {}",
                    self.config.thread_name_prefix,
                    e
                );
            }
        }
    }
}
