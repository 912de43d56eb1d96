//! Thread pool and worker implementations

mod shared;
pub mod thread_pool;
pub mod worker;

pub use shared::CompletionSnapshot;
pub use thread_pool::{ThreadPool, ThreadPoolConfig};
pub use worker::{Worker, WorkerStats};
