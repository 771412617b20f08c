use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::Method;
use medsim_api::{ApiError, ApiResponse, SimRequest};
use serde_json::{Value, json};

use crate::server::AppState;

pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Forwards every `/api/...` request to the simulated router.
pub async fn api(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<ApiResponse<Value>, ApiError> {
    let body = parse_body(&body)?;
    let request = SimRequest {
        method,
        path,
        query,
        body,
    };
    let mut router = state.router.lock().await;
    Ok(router.handle(request))
}

fn parse_body(bytes: &Bytes) -> Result<Option<Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))
}
