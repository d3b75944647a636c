//! profilerd — asynchronous HTTP front end for an external text profiler.

/// API version literal, usable in `concat!`.
macro_rules! api_version {
    () => {
        "1.0"
    };
}

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod jobs;
pub mod model;
pub mod profiler;
