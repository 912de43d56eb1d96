//! Worker thread implementation

use crate::core::rng::{seed_worker_rng, worker_seed};
use crate::core::{BoxedJob, Result, ThreadError};
use crate::pool::shared::PoolShared;
use crossbeam_utils::Backoff;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::{debug, span, Level};

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of jobs that completed successfully
    pub jobs_processed: AtomicU64,
    /// Total number of jobs that returned an error
    pub jobs_failed: AtomicU64,
    /// Total number of jobs that panicked
    pub jobs_panicked: AtomicU64,
    /// Total time spent processing jobs (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    fn increment_processed(&self) {
        self.jobs_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_panicked(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    fn add_processing_time(&self, microseconds: u64) {
        self.total_processing_time_us
            .fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Get total jobs processed
    pub fn get_jobs_processed(&self) -> u64 {
        self.jobs_processed.load(Ordering::Relaxed)
    }

    /// Get total jobs failed
    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    /// Get total jobs panicked
    pub fn get_jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }

    /// Get average processing time per successful job in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.jobs_processed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }
}

/// Settings a worker needs at spawn time
#[derive(Clone, Debug)]
pub(crate) struct WorkerSettings {
    pub(crate) name: String,
    pub(crate) poll_interval: Duration,
    pub(crate) rng_seed: Option<u64>,
}

/// A persistent thread that pulls jobs from its pool's queue
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a worker bound to `shared`.
    ///
    /// The worker counts itself live before the thread starts and stops
    /// counting when the thread returns, so a freshly constructed pool
    /// reports every worker immediately.
    pub(crate) fn spawn(
        id: usize,
        shared: Arc<PoolShared>,
        settings: WorkerSettings,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);
        let thread_shared = Arc::clone(&shared);

        shared.worker_started();
        let thread = thread::Builder::new()
            .name(settings.name.clone())
            .spawn(move || {
                let _live = LiveGuard(&thread_shared);
                Self::run(id, &thread_shared, &stats_clone, &settings);
            })
            .map_err(|e| {
                shared.worker_stopped();
                ThreadError::spawn_with_source(id, "cannot spawn worker", e)
            })?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Join the worker thread
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| ThreadError::join(self.id, "worker thread panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    ///
    /// Runs until the queue is closed. Empty polls back off from spinning to
    /// yielding, then park on the queue for at most `poll_interval`.
    fn run(id: usize, shared: &PoolShared, stats: &WorkerStats, settings: &WorkerSettings) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        if let Some(base) = settings.rng_seed {
            seed_worker_rng(worker_seed(base, id));
        }

        #[cfg(feature = "tracing")]
        debug!("worker started");
        #[cfg(not(feature = "tracing"))]
        log::debug!("worker {} started", id);

        let backoff = Backoff::new();
        while !shared.queue.is_closed() {
            let next = match shared.queue.try_pop() {
                Some(job) => Some(job),
                None if backoff.is_completed() => {
                    shared.queue.pop_timeout(settings.poll_interval)
                }
                None => {
                    backoff.snooze();
                    None
                }
            };

            if let Some(job) = next {
                backoff.reset();

                #[cfg(feature = "tracing")]
                crate::telemetry::record_worker_busy(id);

                Self::execute_job(id, job, stats);
                shared.completion.finish();

                #[cfg(feature = "tracing")]
                crate::telemetry::record_worker_idle(id);
            }
        }

        #[cfg(feature = "tracing")]
        debug!(
            jobs_processed = stats.get_jobs_processed(),
            jobs_failed = stats.get_jobs_failed(),
            "worker shutting down"
        );
        #[cfg(not(feature = "tracing"))]
        log::debug!(
            "worker {} shutting down ({} processed, {} failed)",
            id,
            stats.get_jobs_processed(),
            stats.get_jobs_failed()
        );
    }

    /// Execute a single job with panic protection
    ///
    /// The job is also dropped inside the unwind guard. A panic while
    /// releasing whatever the job owns counts as a panicked job.
    #[allow(unused_variables)]
    fn execute_job(id: usize, mut job: BoxedJob, stats: &WorkerStats) {
        #[cfg(feature = "tracing")]
        let job_span = span!(Level::TRACE, "job_execution", job_type = job.job_type());
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        let start = Instant::now();
        let mut outcome = match catch_unwind(AssertUnwindSafe(|| job.execute())) {
            Ok(Ok(())) => Outcome::Done,
            Ok(Err(e)) => Outcome::Failed(e),
            Err(payload) => Outcome::Panicked(ThreadError::worker_panic(
                id,
                panic_message(payload.as_ref()),
            )),
        };
        let elapsed = start.elapsed();

        // Named now; the job is gone after the drop below
        let job_type = match outcome {
            Outcome::Done => None,
            _ => Some(job.job_type().to_string()),
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || drop(job))) {
            outcome = Outcome::Panicked(ThreadError::worker_panic(
                id,
                format!("while dropping job: {}", panic_message(payload.as_ref())),
            ));
        }
        let job_type = job_type.as_deref().unwrap_or("Job");

        match outcome {
            Outcome::Done => {
                stats.increment_processed();
                stats.add_processing_time(elapsed.as_micros() as u64);
                #[cfg(feature = "tracing")]
                crate::telemetry::record_completion(elapsed, true);
            }
            Outcome::Panicked(err) => {
                #[cfg(feature = "tracing")]
                {
                    tracing::error!(
                        error = %err,
                        duration_ms = elapsed.as_millis() as u64,
                        "job panicked"
                    );
                    crate::telemetry::record_panic(elapsed);
                }
                #[cfg(not(feature = "tracing"))]
                log::error!("{} ({})", err, job_type);
                stats.increment_panicked();
            }
            Outcome::Failed(e) => {
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!(
                        error = %e,
                        duration_ms = elapsed.as_millis() as u64,
                        "job failed"
                    );
                    crate::telemetry::record_completion(elapsed, false);
                }
                #[cfg(not(feature = "tracing"))]
                log::warn!("worker {}: {} failed: {}", id, job_type, e);
                stats.increment_failed();
            }
        }
    }
}

enum Outcome {
    Done,
    Failed(ThreadError),
    Panicked(ThreadError),
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

struct LiveGuard<'a>(&'a PoolShared);

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.0.worker_stopped();
    }
}
