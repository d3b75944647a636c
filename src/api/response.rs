//! Mapping of daemon errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::{BackendError, Error, JobError};

impl Error {
    /// HTTP status reported to clients for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Job(JobError::AdmissionFull { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Job(JobError::TokenNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::Invalid { .. }) => StatusCode::BAD_REQUEST,
            Self::Job(JobError::TokenCollision { .. })
            | Self::Backend(BackendError::Io(_))
            | Self::Profiler(_)
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

/// 400 response for requests that could not be decoded.
pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message.into()})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfilerError;

    #[test]
    fn client_errors_map_to_4xx_and_5xx() {
        let cases: Vec<(Error, StatusCode)> = vec![
            (
                JobError::AdmissionFull { max: 1 }.into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                JobError::TokenNotFound { token: "x".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                BackendError::NotFound { language: "fra".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                BackendError::Invalid {
                    language: "../x".into(),
                    reason: "bad".into(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProfilerError::DeadlineExceeded {
                    timeout: std::time::Duration::from_secs(1),
                }
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.into_response().status(), status);
        }
    }
}
