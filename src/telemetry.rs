//! Tracing events for pool observability.
//!
//! Compiled with the `tracing` feature. These functions emit tracing events
//! that metrics layers (for example tracing-opentelemetry) can turn into
//! counters, gauges and histograms. Without the feature the pool logs
//! through the `log` facade instead.
//!
//! ```rust,ignore
//! use paralysis_pool::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("paralysis_pool=debug".parse().unwrap()))
//!     .init();
//!
//! let pool = ThreadPool::with_threads(4)?;
//! ```

use crate::queue::QueueOrder;
use std::time::Duration;

/// Records a job submission event.
#[inline]
pub fn record_submission(queue_depth: usize) {
    tracing::trace!(
        counter.jobs_submitted = 1,
        gauge.queue_depth = queue_depth as i64,
        "job submitted"
    );
}

/// Records job completion with timing.
#[inline]
pub fn record_completion(duration: Duration, success: bool) {
    let duration_us = duration.as_micros() as u64;
    if success {
        tracing::trace!(
            counter.jobs_completed = 1,
            histogram.job_duration_us = duration_us,
            "job completed successfully"
        );
    } else {
        tracing::trace!(
            counter.jobs_failed = 1,
            histogram.job_duration_us = duration_us,
            "job failed"
        );
    }
}

/// Records a job panic event.
#[inline]
pub fn record_panic(duration: Duration) {
    tracing::trace!(
        counter.jobs_panicked = 1,
        histogram.job_duration_us = duration.as_micros() as u64,
        "job panicked"
    );
}

/// Records worker becoming busy.
#[inline]
pub fn record_worker_busy(worker_id: usize) {
    tracing::trace!(gauge.workers_busy = 1, worker_id = worker_id, "worker busy");
}

/// Records worker becoming idle.
#[inline]
pub fn record_worker_idle(worker_id: usize) {
    tracing::trace!(
        gauge.workers_busy = -1i64,
        worker_id = worker_id,
        "worker idle"
    );
}

/// Records pool startup.
#[inline]
pub fn record_pool_start(num_workers: usize, queue_order: QueueOrder) {
    tracing::info!(
        workers = num_workers,
        queue_order = ?queue_order,
        "thread pool started"
    );
}

/// Records pool shutdown.
#[inline]
pub fn record_pool_shutdown(jobs_processed: u64, jobs_failed: u64) {
    tracing::info!(
        jobs_processed = jobs_processed,
        jobs_failed = jobs_failed,
        "thread pool shutdown complete"
    );
}
