//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Server configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen: String,
    /// Directory holding the `<language>.ini` backend configurations.
    pub backend_dir: PathBuf,
    /// Path to the profiler executable.
    pub executable: PathBuf,
    /// Reclamation window for unpolled jobs and deadline for each profiler run.
    pub job_timeout: Duration,
    /// Maximum number of pending jobs in the job table.
    pub max_jobs: usize,
    /// Period of the background sweep. `None` sweeps only on submission.
    pub sweep_interval: Option<Duration>,
    /// Directory for rolling log files (stderr only if unset).
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9998".to_string(),
            backend_dir: PathBuf::new(),
            executable: PathBuf::from("profiler"),
            job_timeout: Duration::from_secs(45 * 60), // 45 minutes
            max_jobs: 10,
            sweep_interval: None,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `PROFILERD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_dir = lookup("PROFILERD_BACKEND")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("PROFILERD_BACKEND".to_string()))?;

        let listen = lookup("PROFILERD_LISTEN").unwrap_or(defaults.listen);
        let executable = lookup("PROFILERD_EXECUTABLE")
            .map(PathBuf::from)
            .unwrap_or(defaults.executable);

        let timeout_min: u64 = parse_var(&lookup, "PROFILERD_TIMEOUT_MIN", 45)?;
        if timeout_min == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PROFILERD_TIMEOUT_MIN".to_string(),
                message: "must be at least one minute".to_string(),
            });
        }

        let max_jobs: usize = parse_var(&lookup, "PROFILERD_MAX_JOBS", defaults.max_jobs)?;
        if max_jobs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PROFILERD_MAX_JOBS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let sweep_secs: u64 = parse_var(&lookup, "PROFILERD_SWEEP_INTERVAL_SECS", 0)?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let log_dir = lookup("PROFILERD_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen,
            backend_dir,
            executable,
            job_timeout: Duration::from_secs(timeout_min.saturating_mul(60)),
            max_jobs,
            sweep_interval,
            log_dir,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
    }
}
