//! REST endpoints: languages, job submission, and job polling.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::response::bad_request;
use crate::jobs::{ProfileService, Token};
use crate::model::ProfileRequest;

/// Value of the `Server` header on every response.
pub const SERVER_HEADER: &str = concat!("profilerd/", api_version!());

/// Shared state for the profiling routes.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ProfileService>,
}

/// Build the router with all profiling routes and HTTP layers.
///
/// Every response, however small, is gzipped for clients that accept it;
/// gzipped request bodies are decoded transparently.
pub fn profile_routes(service: Arc<ProfileService>) -> Router {
    let state = ApiState { service };

    Router::new()
        .route("/health", get(health))
        .route("/languages", get(list_languages))
        .route("/profile", get(poll_profile).post(submit_profile))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::SERVER,
                    HeaderValue::from_static(SERVER_HEADER),
                ))
                .layer(CompressionLayer::new().compress_when(SizeAbove::new(0)))
                .layer(RequestDecompressionLayer::new()),
        )
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "profilerd",
        "pending_jobs": state.service.pending_jobs().await,
        "max_jobs": state.service.capacity(),
    }))
}

/// GET /languages
async fn list_languages(State(state): State<ApiState>) -> Response {
    match state.service.languages().await {
        Ok(languages) => Json(languages).into_response(),
        Err(e) => {
            info!(error = %e, "Cannot list languages");
            e.into_response()
        }
    }
}

/// POST /profile
///
/// Admits a job and answers with its token right away.
async fn submit_profile(
    State(state): State<ApiState>,
    body: Result<Json<ProfileRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            info!(error = %rejection.body_text(), "Cannot decode profile request");
            return bad_request(rejection.body_text());
        }
    };

    match state.service.submit(request).await {
        Ok(token) => Json(token).into_response(),
        Err(e) => {
            info!(error = %e, "Profile request rejected");
            e.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// GET /profile?token=ID
///
/// Never waits for the job; unfinished jobs answer with `Done: false`.
async fn poll_profile(State(state): State<ApiState>, Query(query): Query<TokenQuery>) -> Response {
    let Some(id) = query.token.filter(|t| !t.is_empty()) else {
        return bad_request("missing token");
    };
    let token = Token::new(id);

    match state.service.poll(&token).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            info!(token = %token, error = %e, "Poll failed");
            e.into_response()
        }
    }
}
