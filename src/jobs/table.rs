//! Job table — in-memory registry of pending jobs keyed by token.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::slot::ResultSlot;
use super::token::Token;
use crate::error::JobError;

/// Bookkeeping entry for one submitted job. Immutable once inserted.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub token: Token,
    /// Backend language the job was profiled with.
    pub language: String,
    /// Creation time, the only input to reclamation.
    pub start_time: DateTime<Utc>,
    /// Read half of the runner's handoff slot. The table never touches it.
    pub slot: ResultSlot,
}

/// Capacity-bounded map from token to job record.
///
/// `len() <= capacity` holds at every instant; it is enforced on insert.
#[derive(Debug)]
pub struct JobTable {
    entries: RwLock<HashMap<Token, JobRecord>>,
    capacity: usize,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admit a new job. Capacity and uniqueness are checked under one write lock.
    ///
    /// On `AdmissionFull` or `TokenCollision` nothing is mutated.
    pub async fn put(
        &self,
        language: &str,
        token: Token,
        slot: ResultSlot,
    ) -> Result<(), JobError> {
        let mut entries = self.entries.write().await;

        if entries.len() >= self.capacity {
            return Err(JobError::AdmissionFull { max: self.capacity });
        }
        if entries.contains_key(&token) {
            return Err(JobError::TokenCollision {
                token: token.to_string(),
            });
        }

        entries.insert(
            token.clone(),
            JobRecord {
                token,
                language: language.to_string(),
                start_time: Utc::now(),
                slot,
            },
        );
        Ok(())
    }

    /// Look up a record without mutating the table.
    pub async fn get(&self, token: &Token) -> Option<JobRecord> {
        self.entries.read().await.get(token).cloned()
    }

    /// Remove a record. Returns whether it was present.
    pub async fn del(&self, token: &Token) -> bool {
        self.entries.write().await.remove(token).is_some()
    }

    /// Remove every record whose age at `now` exceeds `timeout`.
    /// Returns the number of reclaimed records.
    pub async fn clean(&self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let window = TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX);
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|token, job| {
            let expired = now.signed_duration_since(job.start_time) > window;
            if expired {
                debug!(token = %token, started_at = %job.start_time, "Reclaiming timed out job");
            }
            !expired
        });

        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::jobs::slot::handoff;

    fn slot() -> ResultSlot {
        handoff().1
    }

    #[tokio::test]
    async fn put_get_del() {
        let table = JobTable::new(2);
        assert!(table.is_empty().await);

        table.put("eng", Token::from("a"), slot()).await.unwrap();
        let record = table.get(&Token::from("a")).await.unwrap();
        assert_eq!(record.language, "eng");
        assert_eq!(record.token, Token::from("a"));
        assert_eq!(table.len().await, 1);

        assert!(table.del(&Token::from("a")).await);
        assert!(!table.del(&Token::from("a")).await);
        assert!(table.get(&Token::from("a")).await.is_none());
    }

    #[tokio::test]
    async fn full_table_rejects_without_mutation() {
        let table = JobTable::new(1);
        table.put("eng", Token::from("a"), slot()).await.unwrap();

        let err = table.put("eng", Token::from("b"), slot()).await.unwrap_err();
        assert!(matches!(err, JobError::AdmissionFull { max: 1 }));
        assert_eq!(table.len().await, 1);
        assert!(table.get(&Token::from("b")).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_token_is_a_collision() {
        let table = JobTable::new(3);
        table.put("eng", Token::from("a"), slot()).await.unwrap();

        let err = table.put("deu", Token::from("a"), slot()).await.unwrap_err();
        assert!(matches!(err, JobError::TokenCollision { .. }));
        assert_eq!(table.len().await, 1);
        assert_eq!(table.get(&Token::from("a")).await.unwrap().language, "eng");
    }

    #[tokio::test]
    async fn full_is_checked_before_uniqueness() {
        let table = JobTable::new(1);
        table.put("eng", Token::from("a"), slot()).await.unwrap();

        let err = table.put("eng", Token::from("a"), slot()).await.unwrap_err();
        assert!(matches!(err, JobError::AdmissionFull { .. }));
    }

    #[tokio::test]
    async fn clean_removes_only_expired_records() {
        let table = JobTable::new(4);
        table.put("eng", Token::from("a"), slot()).await.unwrap();
        table.put("eng", Token::from("b"), slot()).await.unwrap();

        let removed = table.clean(Utc::now(), Duration::from_secs(60)).await;
        assert_eq!(removed, 0);
        assert_eq!(table.len().await, 2);

        let later = Utc::now() + TimeDelta::seconds(61);
        let removed = table.clean(later, Duration::from_secs(60)).await;
        assert_eq!(removed, 2);
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_puts_never_exceed_capacity() {
        let table = Arc::new(JobTable::new(5));
        let mut handles = Vec::new();
        for i in 0..50 {
            let table = Arc::clone(&table);
            handles.push(tokio::spawn(async move {
                table.put("eng", Token::new(format!("t{i}")), slot()).await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(JobError::AdmissionFull { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(admitted, 5);
        assert_eq!(table.len().await, 5);
    }
}
