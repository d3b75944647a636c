//! HTTP surface for submitting and polling profiling jobs.

pub mod response;
pub mod routes;

pub use routes::{ApiState, SERVER_HEADER, profile_routes};
