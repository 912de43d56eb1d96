//! Error types for the worker pool

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, ThreadError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ThreadError {
    /// Pool has begun shutting down; any jobs still queued were abandoned
    #[error("Thread pool is shutting down ({pending_jobs} jobs abandoned)")]
    ShuttingDown {
        /// Number of accepted jobs that will never run
        pending_jobs: usize,
    },

    /// Failed to spawn a worker or observer thread
    #[error("Failed to spawn worker thread #{thread_id}: {message}")]
    SpawnError {
        /// ID of the thread that failed to spawn
        thread_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join worker thread #{thread_id}: {message}")]
    JoinError {
        /// ID of the thread that failed to join
        thread_id: usize,
        /// Error message
        message: String,
    },

    /// Job execution failed
    #[error("Job execution failed ({job_type}): {message}")]
    ExecutionError {
        /// Type name of the failed job
        job_type: String,
        /// Error message
        message: String,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// A job panicked on a worker thread
    #[error("Worker thread #{thread_id} panicked: {message}")]
    WorkerPanic {
        /// ID of the worker that ran the job
        thread_id: usize,
        /// Panic message
        message: String,
    },

    /// Writing output or spawning an observer thread failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// General error
    #[error("{0}")]
    Other(String),
}

impl ThreadError {
    /// Create a shutting down error
    pub fn shutting_down(pending_jobs: usize) -> Self {
        ThreadError::ShuttingDown { pending_jobs }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        thread_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        ThreadError::SpawnError {
            thread_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(thread_id: usize, message: impl Into<String>) -> Self {
        ThreadError::JoinError {
            thread_id,
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(job_type: impl Into<String>, message: impl Into<String>) -> Self {
        ThreadError::ExecutionError {
            job_type: job_type.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ThreadError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(thread_id: usize, message: impl Into<String>) -> Self {
        ThreadError::WorkerPanic {
            thread_id,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ThreadError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ThreadError::shutting_down(3);
        assert!(matches!(err, ThreadError::ShuttingDown { pending_jobs: 3 }));

        let err = ThreadError::invalid_config("num_threads", "must be positive");
        assert!(matches!(err, ThreadError::InvalidConfig { .. }));

        let err = ThreadError::execution("BattleJob", "dice went missing");
        assert!(matches!(err, ThreadError::ExecutionError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ThreadError::shutting_down(12);
        assert_eq!(
            err.to_string(),
            "Thread pool is shutting down (12 jobs abandoned)"
        );

        let err = ThreadError::invalid_config("num_threads", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'num_threads': must be at least 1"
        );

        let err = ThreadError::worker_panic(7, "boom");
        assert_eq!(err.to_string(), "Worker thread #7 panicked: boom");
    }

    #[test]
    fn test_spawn_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ThreadError::spawn_with_source(5, "Cannot create thread", io_err);

        assert!(matches!(err, ThreadError::SpawnError { .. }));
        assert!(err.to_string().contains("worker thread #5"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
