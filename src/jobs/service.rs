//! Profile service — submission and polling on top of the job table.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use super::runner::JobRunner;
use super::slot::{SlotState, handoff};
use super::status::working_status;
use super::table::JobTable;
use super::token::{RandomTokens, Token, TokenGenerator};
use crate::backend::BackendResolver;
use crate::error::{Error, JobError};
use crate::model::{Languages, PollResponse, ProfileRequest};
use crate::profiler::Profiler;

/// Owns the job table and starts runners for admitted jobs.
///
/// Constructed once at startup and shared via `Arc` with every handler.
pub struct ProfileService {
    table: JobTable,
    runner: JobRunner,
    backends: Arc<dyn BackendResolver>,
    tokens: Arc<dyn TokenGenerator>,
    timeout: Duration,
}

impl ProfileService {
    /// Create a service admitting at most `max_jobs` pending jobs.
    /// `timeout` is both the reclamation window and the profiler deadline.
    pub fn new(
        max_jobs: usize,
        timeout: Duration,
        backends: Arc<dyn BackendResolver>,
        profiler: Arc<dyn Profiler>,
    ) -> Self {
        Self {
            table: JobTable::new(max_jobs),
            runner: JobRunner::new(profiler, timeout),
            backends,
            tokens: Arc::new(RandomTokens),
            timeout,
        }
    }

    /// Replace the token source.
    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of jobs currently held in the table.
    pub async fn pending_jobs(&self) -> usize {
        self.table.len().await
    }

    /// Installed backend languages.
    pub async fn languages(&self) -> Result<Languages, Error> {
        Ok(Languages {
            languages: self.backends.languages().await?,
        })
    }

    /// Admit a job and start profiling it in the background.
    pub async fn submit(&self, request: ProfileRequest) -> Result<Token, Error> {
        self.sweep().await;

        let config = self.backends.resolve(&request.language).await?;
        let (sender, slot) = handoff();

        loop {
            let token = self.tokens.generate();
            match self
                .table
                .put(&request.language, token.clone(), slot.clone())
                .await
            {
                Ok(()) => {
                    info!(token = %token, language = %request.language, "Starting job");
                    self.runner.spawn(token.clone(), config, request.tokens, sender);
                    return Ok(token);
                }
                Err(JobError::TokenCollision { token }) => {
                    debug!(token = %token, "Token collision, regenerating");
                }
                Err(e) => {
                    info!(language = %request.language, "Cannot accept more jobs");
                    return Err(e.into());
                }
            }
        }
    }

    /// Check a job without waiting for it.
    ///
    /// A finished job is removed from the table before its result is returned,
    /// so every later poll of the same token yields `TokenNotFound`.
    pub async fn poll(&self, token: &Token) -> Result<PollResponse, Error> {
        let not_found = || JobError::TokenNotFound {
            token: token.to_string(),
        };
        let job = self.table.get(token).await.ok_or_else(not_found)?;

        match job.slot.try_take() {
            SlotState::Pending => {
                debug!(token = %token, "Job is not done yet");
                Ok(PollResponse::pending(token.clone(), working_status()))
            }
            // A concurrent poll drained the slot and is removing the record.
            SlotState::Taken => Err(not_found().into()),
            SlotState::Ready(outcome) => {
                self.table.del(token).await;
                let profile = outcome?;
                info!(token = %token, "Job is done");
                Ok(PollResponse::done(token.clone(), job.language, profile))
            }
        }
    }

    /// Drop every job older than the timeout. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let removed = self.table.clean(Utc::now(), self.timeout).await;
        if removed > 0 {
            info!(count = removed, "Reclaimed timed out jobs");
        }
        removed
    }
}

/// Spawn a background task that periodically sweeps timed out jobs.
pub fn spawn_sweep_task(
    service: Arc<ProfileService>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip immediate first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            service.sweep().await;
        }
    })
}
