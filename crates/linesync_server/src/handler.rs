//! Request handlers for the sync and static page endpoints.

use crate::assets::StaticAssets;
use crate::coordinator::{SyncCoordinator, SyncRequest};
use crate::error::{ServerError, ServerResult};
use crate::response::{ResponseFormat, SyncResponse};
use axum::body::Bytes;
use axum::extract::{RawQuery, Request, State};
use axum::http::{header, HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sync coordinator.
    pub coordinator: Arc<SyncCoordinator>,
    /// Static pages.
    pub assets: Arc<StaticAssets>,
}

impl AppState {
    /// Creates handler state.
    pub fn new(coordinator: Arc<SyncCoordinator>, assets: StaticAssets) -> Self {
        Self {
            coordinator,
            assets: Arc::new(assets),
        }
    }
}

/// Query parameters of a sync request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncParams {
    /// Raw user key.
    pub user: Option<String>,
    /// Raw checkpoint.
    pub checkpoint: Option<String>,
}

impl SyncParams {
    /// Parses a query string. The first occurrence of a parameter wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = SyncParams::default();
        let Some(query) = query else {
            return params;
        };

        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match name.as_ref() {
                "user" => &mut params.user,
                "checkpoint" => &mut params.checkpoint,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// Handles `POST` on any path: merge the body into the user's log and
/// return the datums after the checkpoint.
pub async fn handle_sync(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<SyncResponse> {
    let params = SyncParams::from_query(query.as_deref());
    let request = SyncRequest::from_params(
        params.user.as_deref(),
        params.checkpoint.as_deref(),
        body.to_vec(),
    )?;
    let format = ResponseFormat::from_headers(&headers);

    let coordinator = Arc::clone(&state.coordinator);
    let outcome = tokio::task::spawn_blocking(move || coordinator.sync(&request))
        .await
        .map_err(|e| ServerError::Internal(format!("sync task failed: {e}")))??;

    Ok(SyncResponse::new(outcome, format))
}

/// Handles `GET /`: the index page.
pub async fn handle_index(State(state): State<AppState>) -> Html<String> {
    Html(state.assets.index().to_string())
}

/// Handles `GET /app.webmanifest`.
pub async fn handle_manifest(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.assets.manifest().to_string(),
    )
        .into_response()
}

/// Handles `GET /sw.js`.
pub async fn handle_service_worker(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        state.assets.service_worker().to_string(),
    )
        .into_response()
}

/// Handles every path without its own route: `POST` syncs, anything else
/// gets the index page.
pub async fn handle_fallback(
    state: State<AppState>,
    method: Method,
    query: RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::POST {
        handle_sync(state, query, headers, body).await.into_response()
    } else {
        handle_index(state).await.into_response()
    }
}

/// Logs one line per request.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_from_query() {
        let params = SyncParams::from_query(Some("user=alice&checkpoint=3"));
        assert_eq!(params.user.as_deref(), Some("alice"));
        assert_eq!(params.checkpoint.as_deref(), Some("3"));
    }

    #[test]
    fn params_are_percent_decoded() {
        let params = SyncParams::from_query(Some("user=al%3Dice%3D&checkpoint=%2B2"));
        assert_eq!(params.user.as_deref(), Some("al=ice="));
        assert_eq!(params.checkpoint.as_deref(), Some("+2"));
    }

    #[test]
    fn first_occurrence_wins() {
        let params = SyncParams::from_query(Some("user=a&user=b&checkpoint=1&checkpoint=2"));
        assert_eq!(params.user.as_deref(), Some("a"));
        assert_eq!(params.checkpoint.as_deref(), Some("1"));
    }

    #[test]
    fn missing_query() {
        assert_eq!(SyncParams::from_query(None), SyncParams::default());
        assert_eq!(SyncParams::from_query(Some("other=1")), SyncParams::default());
    }
}
