//! Job trait and related types

use crate::core::error::Result;
use std::fmt;

/// A unit of work executed by a pool worker
///
/// Jobs take no arguments from the pool. Anything a job shares with other jobs
/// is captured by the job itself, and per-thread resources such as the dice
/// RNG are reached through [`with_worker_rng`](crate::core::with_worker_rng).
pub trait Job: Send {
    /// Execute the job
    ///
    /// # Errors
    ///
    /// Returns an error if the job execution fails. The worker logs and counts
    /// the failure, then moves on to the next job.
    fn execute(&mut self) -> Result<()>;

    /// Get the job's type name for debugging and statistics
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.job_type())
    }
}

/// A boxed job that can be sent across threads
pub type BoxedJob = Box<dyn Job>;

/// Helper to create a job from a closure
pub struct ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    /// Create a new closure job
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureJob".to_string(),
        }
    }

    /// Create a new closure job with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    fn execute(&mut self) -> Result<()> {
        match self.closure.take() {
            Some(closure) => closure(),
            None => Err(crate::core::ThreadError::execution(
                self.name.clone(),
                "closure already executed",
            )),
        }
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}
