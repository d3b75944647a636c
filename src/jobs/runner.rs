//! Job runner — runs one profiler computation in the background under a deadline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::slot::{Outcome, ResultSender};
use super::token::Token;
use crate::error::ProfilerError;
use crate::model::InputToken;
use crate::profiler::Profiler;

/// Launches profiler runs on their own tasks.
///
/// A run's deadline is independent of its job table entry: reclaiming the
/// entry does not cancel the computation.
#[derive(Clone)]
pub struct JobRunner {
    profiler: Arc<dyn Profiler>,
    deadline: Duration,
}

impl JobRunner {
    pub fn new(profiler: Arc<dyn Profiler>, deadline: Duration) -> Self {
        Self { profiler, deadline }
    }

    /// Start the computation and deliver exactly one outcome into `sender`.
    /// `token` is only used for log context.
    pub fn spawn(
        &self,
        token: Token,
        config: PathBuf,
        tokens: Vec<InputToken>,
        sender: ResultSender,
    ) -> JoinHandle<()> {
        let profiler = Arc::clone(&self.profiler);
        let deadline = self.deadline;

        tokio::spawn(async move {
            let started = std::time::Instant::now();
            let outcome = run_with_deadline(profiler.as_ref(), &config, &tokens, deadline).await;

            match &outcome {
                Ok(_) => info!(
                    token = %token,
                    tokens = tokens.len(),
                    config = %config.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Profiled tokens"
                ),
                Err(e) => warn!(token = %token, error = %e, "Profiling failed"),
            }

            if !sender.deliver(outcome) {
                debug!(token = %token, "Job was reclaimed before its result arrived");
            }
        })
    }
}

/// Run the profiler, turning an elapsed deadline into `DeadlineExceeded`.
pub async fn run_with_deadline(
    profiler: &dyn Profiler,
    config: &Path,
    tokens: &[InputToken],
    deadline: Duration,
) -> Outcome {
    match tokio::time::timeout(deadline, profiler.profile(config, tokens)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ProfilerError::DeadlineExceeded { timeout: deadline }),
    }
}
