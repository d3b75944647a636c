//! Job admission, tracking, and polling.
//!
//! Core components:
//! - `token` — opaque job handles and their generator
//! - `slot` — single-use handoff from runner to poller
//! - `table` — capacity-bounded job table with timeout reclamation
//! - `runner` — background profiler runs under a deadline
//! - `status` — cosmetic status lines for unfinished jobs
//! - `service` — submission and polling protocols

pub mod runner;
pub mod service;
pub mod slot;
pub mod status;
pub mod table;
pub mod token;

pub use runner::JobRunner;
pub use service::{ProfileService, spawn_sweep_task};
pub use slot::{ResultSender, ResultSlot, SlotState, handoff};
pub use table::{JobRecord, JobTable};
pub use token::{RandomTokens, Token, TokenGenerator};
