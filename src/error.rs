//! Error types for the profiling daemon.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Profiler error: {0}")]
    Profiler(#[from] ProfilerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Job admission and polling errors.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Maximum pending jobs ({max}) reached")]
    AdmissionFull { max: usize },

    /// Only ever seen between the job table and the submission loop.
    #[error("Token {token} is already in use")]
    TokenCollision { token: String },

    #[error("Job {token} not found")]
    TokenNotFound { token: String },
}

/// Language backend resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Language {language} not found")]
    NotFound { language: String },

    #[error("Invalid backend for language {language}: {reason}")]
    Invalid { language: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while running the external profiler.
#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    #[error("Failed to spawn profiler {executable}: {reason}")]
    Spawn { executable: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profiler exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    #[error("Invalid profiler output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("Profiler deadline of {timeout:?} exceeded")]
    DeadlineExceeded { timeout: Duration },

    #[error("Profiler task ended without delivering a result")]
    RunnerLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_convert_into_top_level() {
        let err: Error = JobError::AdmissionFull { max: 3 }.into();
        assert!(matches!(err, Error::Job(JobError::AdmissionFull { max: 3 })));
        assert_eq!(err.to_string(), "Job error: Maximum pending jobs (3) reached");
    }

    #[test]
    fn deadline_message_mentions_timeout() {
        let err = ProfilerError::DeadlineExceeded {
            timeout: Duration::from_secs(60),
        };
        assert!(err.to_string().contains("60s"));
    }
}
