//! Core types and traits for the worker pool

pub mod error;
pub mod job;
pub mod rng;

pub use error::{Result, ThreadError};
pub use job::{BoxedJob, ClosureJob, Job};
pub use rng::{seed_worker_rng, with_worker_rng};
