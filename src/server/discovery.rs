//! Agent card discovery handler

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::DateTime;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::error;

use super::router::AppState;

/// GET `/.well-known/agent.json` - A2A agent card discovery.
///
/// Derives the card from the live registry, serves it with cache headers,
/// and answers conditional requests with an empty 304. Internal failures
/// never escape the handler; they become a structured 500 body.
pub async fn agent_card_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match render_card(&state, &headers) {
        Ok(response) => response,
        Err(message) => {
            error!(error = %message, "agent card generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": message, "code": "internal_error"})),
            )
                .into_response()
        }
    }
}

fn render_card(state: &AppState, headers: &HeaderMap) -> Result<Response, String> {
    let card = state.agent_card();
    let body = serde_json::to_vec(&card).map_err(|e| e.to_string())?;

    let etag = format!("\"{}\"", hex_digest(&body));
    let last_modified = card
        .updated_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    if is_not_modified(headers, &etag, card.updated_at.timestamp()) {
        return Ok(Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &etag)
            .header(header::CACHE_CONTROL, "public, max-age=300")
            .header(header::LAST_MODIFIED, &last_modified)
            .body(axum::body::Body::empty())
            .map_err(|e| e.to_string())?);
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, "public, max-age=300")
        .header(header::ETAG, etag)
        .header(header::LAST_MODIFIED, last_modified)
        .body(axum::body::Body::from(body))
        .map_err(|e| e.to_string())?)
}

fn is_not_modified(headers: &HeaderMap, etag: &str, updated_at_epoch: i64) -> bool {
    if let Some(candidate) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        return candidate
            .split(',')
            .any(|tag| tag.trim() == etag || tag.trim() == "*");
    }

    if let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
    {
        return updated_at_epoch <= since.timestamp();
    }

    false
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
