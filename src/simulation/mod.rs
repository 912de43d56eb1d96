//! Paralysis battle simulation built on the worker pool
//!
//! - [`battle`]: one battle, and the [`BattleJob`] that runs it on a worker
//! - [`aggregate`]: running maximum and progress counter shared by jobs
//! - [`progress`]: console progress bar
//! - [`runner`]: end-to-end driver used by the `paralysis` binary

pub mod aggregate;
pub mod battle;
pub mod progress;
pub mod runner;

pub use aggregate::{BattleStats, ProgressCounter, RunningMax};
pub use battle::{simulate_battle, BattleJob, SAFE_TURNS};
pub use progress::{render_bar, ProgressReporter, BAR_WIDTH};
pub use runner::{run_simulation, SimulationConfig, SimulationReport};
