//! Convenient re-exports for common types and traits

pub use crate::core::{with_worker_rng, BoxedJob, ClosureJob, Job, Result, ThreadError};
pub use crate::pool::{ThreadPool, ThreadPoolConfig, WorkerStats};
pub use crate::queue::{JobQueue, QueueOrder};
pub use crate::simulation::{
    run_simulation, BattleJob, BattleStats, SimulationConfig, SimulationReport,
};
