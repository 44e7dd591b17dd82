use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the forwarding leg. Resolution itself never fails.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("request could not be forwarded: {0}")]
    InvalidUpstreamRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "forwarding to upstream failed");
        (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
    }
}
