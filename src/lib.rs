//! # Paralysis Pool
//!
//! A fixed-size worker pool and the simulation it was built for: a billion
//! independent paralysis-dice battles, reduced to the single highest count of
//! paralysed turns.
//!
//! ## Features
//!
//! - **Thread Pool**: Persistent workers pulling from one shared job queue
//! - **Job Queue**: Unbounded FIFO or LIFO queue that wakes parked workers on push
//! - **Drain and Shutdown**: Wait for every accepted job, then stop and join workers
//! - **Worker Statistics**: Per-worker counts of processed, failed and panicked jobs
//! - **Per-worker RNG**: Each worker rolls dice from its own generator
//! - **Progress Bar**: An observer thread redraws a 100-cell bar as battles finish
//!
//! ## Quick Start
//!
//! ```rust
//! use paralysis_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::with_threads(4)?;
//!
//! for i in 0..10 {
//!     pool.execute(move || {
//!         println!("Job {} executing", i);
//!         Ok(())
//!     })?;
//! }
//!
//! pool.drain()?;
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Running Battles
//!
//! ```rust
//! use paralysis_pool::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let pool = ThreadPool::with_config(ThreadPoolConfig::new(4).with_rng_seed(7))?;
//! let stats = Arc::new(BattleStats::new(1_000));
//!
//! for _ in 0..1_000 {
//!     pool.submit(BattleJob::new(Arc::clone(&stats)))?;
//! }
//! pool.drain()?;
//! pool.shutdown()?;
//!
//! println!("Highest Paralysis Turns: {}", stats.max_turns().unwrap_or(0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Whole Simulation
//!
//! ```rust
//! use paralysis_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = SimulationConfig::new(10_000, 8).with_progress(false);
//! let report = run_simulation(&config, std::io::sink())?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod simulation;

#[cfg(feature = "tracing")]
pub mod telemetry;

pub use core::{BoxedJob, ClosureJob, Job, Result, ThreadError};
pub use pool::{ThreadPool, ThreadPoolConfig, WorkerStats};
pub use queue::{JobQueue, QueueOrder};
pub use simulation::{run_simulation, SimulationConfig, SimulationReport};
