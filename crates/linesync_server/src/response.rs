//! HTTP response types for the sync server.

use crate::coordinator::SyncOutcome;
use crate::error::ServerError;
use crate::log::join_datums;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Content type for plain text responses.
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Desired response format based on the `Accept` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON array of strings.
    #[default]
    Json,
    /// Datums joined with `\n`.
    Text,
}

impl ResponseFormat {
    /// Determines the response format from request headers.
    ///
    /// Returns `Text` only when `text/plain` is listed before any JSON media
    /// type; quality values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            return ResponseFormat::Json;
        };

        for range in accept.split(',') {
            let media = range.split(';').next().unwrap_or_default().trim();
            if media.eq_ignore_ascii_case("text/plain") {
                return ResponseFormat::Text;
            }
            if media.eq_ignore_ascii_case("application/json") {
                return ResponseFormat::Json;
            }
        }
        ResponseFormat::Json
    }
}

/// Sync result rendered in the requested format.
#[derive(Debug)]
pub struct SyncResponse {
    outcome: SyncOutcome,
    format: ResponseFormat,
}

impl SyncResponse {
    /// Wraps a sync outcome.
    pub fn new(outcome: SyncOutcome, format: ResponseFormat) -> Self {
        Self { outcome, format }
    }
}

impl IntoResponse for SyncResponse {
    fn into_response(self) -> Response {
        match self.format {
            ResponseFormat::Json => Json(self.outcome.to_strings()).into_response(),
            ResponseFormat::Text => {
                let body = join_datums(&self.outcome.datums);
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)],
                    String::from_utf8_lossy(&body).into_owned(),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "internal fault");
                "internal error".to_string()
            }
            other => {
                tracing::error!(error = %other, "sync failed");
                other.to_string()
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)],
            format!("server error: {message}"),
        )
            .into_response()
    }
}
