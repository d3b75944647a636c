//! Single-use handoff slot carrying one profiler outcome from runner to poller.

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};

use crate::error::ProfilerError;
use crate::model::Profile;

/// Outcome of one profiler run.
pub type Outcome = Result<Profile, ProfilerError>;

/// Write half, owned by the job runner. Consumed by the single write.
#[derive(Debug)]
pub struct ResultSender {
    tx: oneshot::Sender<Outcome>,
}

impl ResultSender {
    /// Deliver the outcome. Returns `false` if the reader side is already gone
    /// (the job was reclaimed before it finished).
    pub fn deliver(self, outcome: Outcome) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

/// State of the slot as seen by a non-blocking check.
#[derive(Debug)]
pub enum SlotState {
    /// No outcome yet.
    Pending,
    /// The outcome, handed out exactly once.
    Ready(Outcome),
    /// Another poller already drained the slot.
    Taken,
}

/// Read half, shared between table entries and the poller that drains it.
#[derive(Debug, Clone)]
pub struct ResultSlot {
    rx: Arc<Mutex<Option<oneshot::Receiver<Outcome>>>>,
}

impl ResultSlot {
    /// Check for an outcome without waiting on the runner or other pollers.
    pub fn try_take(&self) -> SlotState {
        // A concurrent poll holds the lock; it either drains the slot or sees
        // it pending, so answer pending and let the client ask again.
        let Ok(mut guard) = self.rx.try_lock() else {
            return SlotState::Pending;
        };
        let Some(rx) = guard.as_mut() else {
            return SlotState::Taken;
        };

        match rx.try_recv() {
            Ok(outcome) => {
                *guard = None;
                SlotState::Ready(outcome)
            }
            Err(oneshot::error::TryRecvError::Empty) => SlotState::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                // Runner dropped its sender without writing (task aborted or panicked).
                *guard = None;
                SlotState::Ready(Err(ProfilerError::RunnerLost))
            }
        }
    }
}

/// Create a connected sender/slot pair.
pub fn handoff() -> (ResultSender, ResultSlot) {
    let (tx, rx) = oneshot::channel();
    (
        ResultSender { tx },
        ResultSlot {
            rx: Arc::new(Mutex::new(Some(rx))),
        },
    )
}
