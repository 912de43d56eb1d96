//! Driver that runs a full simulation on a worker pool

use crate::core::{Result, ThreadError};
use crate::pool::{ThreadPool, ThreadPoolConfig};
use crate::queue::QueueOrder;
use crate::simulation::aggregate::BattleStats;
use crate::simulation::battle::BattleJob;
use crate::simulation::progress::ProgressReporter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Settings for one simulation run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Battles to simulate, one job each
    pub battles: u64,
    /// Worker threads in the pool
    pub workers: usize,
    /// Base RNG seed; `None` seeds every worker from entropy
    pub seed: Option<u64>,
    /// Queue pop order
    pub queue_order: QueueOrder,
    /// Jobs submitted before waiting for the pool to catch up.
    /// Keeps the unbounded queue from holding the whole run at once.
    pub batch_size: u64,
    /// Draw a progress bar
    pub progress: bool,
    /// How often the progress bar samples the counter
    pub progress_interval: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            battles: 1_000_000_000,
            workers: 100,
            seed: None,
            queue_order: QueueOrder::Fifo,
            batch_size: 1_000_000,
            progress: true,
            progress_interval: Duration::from_millis(100),
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for `battles` battles on `workers` threads
    #[must_use]
    pub fn new(battles: u64, workers: usize) -> Self {
        Self {
            battles,
            workers,
            ..Default::default()
        }
    }

    /// Seed the worker RNGs for a reproducible run
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the queue pop order
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_order(mut self, order: QueueOrder) -> Self {
        self.queue_order = order;
        self
    }

    /// Set the submission batch size
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable the progress bar
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Set the progress sampling interval
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Pool configuration derived from these settings
    pub fn pool_config(&self) -> ThreadPoolConfig {
        let config = ThreadPoolConfig::new(self.workers)
            .with_thread_name_prefix("battle")
            .with_queue_order(self.queue_order);
        match self.seed {
            Some(seed) => config.with_rng_seed(seed),
            None => config,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ThreadError::invalid_config(
                "batch_size",
                "Batch size must be greater than 0",
            ));
        }
        if self.progress && self.progress_interval.is_zero() {
            return Err(ThreadError::invalid_config(
                "progress_interval",
                "Progress interval must be non-zero",
            ));
        }
        self.pool_config().validate()
    }
}

/// Outcome of a simulation run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Battles simulated
    pub battles: u64,
    /// Worker threads used
    pub workers: usize,
    /// Highest paralysis turns in any battle
    pub max_paralysis_turns: u32,
    /// Jobs that returned an error or panicked
    pub jobs_failed: u64,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end
    pub finished_at: DateTime<Utc>,
    /// Elapsed time in milliseconds
    pub elapsed_ms: u64,
}

impl SimulationReport {
    /// The final line printed by the command-line driver
    pub fn summary_line(&self) -> String {
        format!("Highest Paralysis Turns: {}", self.max_paralysis_turns)
    }
}

/// Run every battle in `config` and collect the result.
///
/// The progress bar, if enabled, is drawn into `progress_sink`.
pub fn run_simulation<W>(config: &SimulationConfig, progress_sink: W) -> Result<SimulationReport>
where
    W: Write + Send + 'static,
{
    config.validate()?;

    let started_at = Utc::now();
    let clock = Instant::now();

    let pool = ThreadPool::with_config(config.pool_config())?;
    let stats = Arc::new(BattleStats::new(config.battles));
    let reporter = if config.progress {
        Some(ProgressReporter::spawn(
            Arc::clone(stats.progress()),
            progress_sink,
            config.progress_interval,
        )?)
    } else {
        None
    };

    log::info!(
        "simulating {} battles on {} workers",
        config.battles,
        config.workers
    );

    let mut submitted = 0u64;
    while submitted < config.battles {
        let batch = config.batch_size.min(config.battles - submitted);
        for _ in 0..batch {
            pool.submit(BattleJob::new(Arc::clone(&stats)))?;
        }
        submitted += batch;
        pool.drain()?;
        log::debug!("{} of {} battles finished", submitted, config.battles);
    }

    let jobs_failed = pool.total_jobs_failed() + pool.total_jobs_panicked();
    pool.shutdown()?;

    if let Some(reporter) = reporter {
        reporter.stop()?;
    }

    if jobs_failed > 0 {
        log::warn!("{} battles failed and were not recorded", jobs_failed);
    }

    Ok(SimulationReport {
        battles: config.battles,
        workers: config.workers,
        max_paralysis_turns: stats.max_turns().unwrap_or(0),
        jobs_failed,
        started_at,
        finished_at: Utc::now(),
        elapsed_ms: clock.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.battles, 1_000_000_000);
        assert_eq!(config.workers, 100);
        assert!(config.progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = SimulationConfig::new(10, 0);
        assert!(matches!(
            config.validate(),
            Err(ThreadError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = SimulationConfig::new(10, 2).with_batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(ThreadError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_pool_config_carries_seed_and_order() {
        let config = SimulationConfig::new(10, 3)
            .with_seed(5)
            .with_queue_order(QueueOrder::Lifo);
        let pool_config = config.pool_config();
        assert_eq!(pool_config.num_threads, 3);
        assert_eq!(pool_config.rng_seed, Some(5));
        assert_eq!(pool_config.queue_order, QueueOrder::Lifo);
        assert_eq!(pool_config.thread_name_prefix, "battle");
    }

    #[test]
    fn test_small_run() {
        let config = SimulationConfig::new(2_000, 4)
            .with_progress(false)
            .with_batch_size(300);
        let report = run_simulation(&config, std::io::sink()).expect("run failed");

        assert_eq!(report.battles, 2_000);
        assert_eq!(report.jobs_failed, 0);
        assert!(report.max_paralysis_turns > 0);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(
            report.summary_line(),
            format!("Highest Paralysis Turns: {}", report.max_paralysis_turns)
        );
    }

    #[test]
    fn test_zero_battles() {
        let config = SimulationConfig::new(0, 2);
        let report = run_simulation(&config, std::io::sink()).expect("run failed");
        assert_eq!(report.max_paralysis_turns, 0);
    }

    #[test]
    fn test_report_serializes() {
        let config = SimulationConfig::new(50, 2).with_progress(false);
        let report = run_simulation(&config, std::io::sink()).expect("run failed");

        let json = serde_json::to_value(&report).expect("serialize failed");
        assert_eq!(json["battles"], 50);
        assert_eq!(json["workers"], 2);
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = SimulationConfig::new(10, 2).with_seed(3);
        let json = serde_json::to_string(&config).expect("serialize failed");
        let back: SimulationConfig = serde_json::from_str(&json).expect("deserialize failed");
        assert_eq!(back, config);
    }
}
