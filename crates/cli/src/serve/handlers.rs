//! HTTP route handlers: health, state table, transitions.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use problemflow_engine::{SubmittedFields, TransitionRequest};

use super::error::ApiError;
use super::query::TransitionQuery;
use super::state::AppState;
use crate::commands::states::state_table;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> ApiError {
    ApiError::NoRoute
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /states
pub(crate) async fn handle_states() -> impl IntoResponse {
    (StatusCode::OK, Json(state_table()))
}

/// POST|PUT|PATCH /api/problem/{problem_number}/state/{new_state}
pub(crate) async fn handle_transition(
    State(state): State<Arc<AppState>>,
    Path((problem_number, new_state)): Path<(String, String)>,
    Query(query): Query<TransitionQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let data = parse_body(&body).map_err(ApiError::InvalidBody)?;

    let request = TransitionRequest {
        problem_number,
        new_state,
        data,
        options: query.render_options(),
    };

    let result = state.executor.execute(&request).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "result": result }))))
}

/// An empty body submits no fields; anything else must be a JSON object.
fn parse_body(body: &[u8]) -> Result<SubmittedFields, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmittedFields::new());
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields),
        Ok(_) => Err("request body must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_submits_nothing() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert!(parse_body(b" \r\n").unwrap().is_empty());
    }

    #[test]
    fn object_body_becomes_fields() {
        let fields = parse_body(br#"{"fix_notes": "restarted"}"#).unwrap();
        assert_eq!(fields.get("fix_notes"), Some(&json!("restarted")));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(parse_body(b"[1, 2]").is_err());
        assert!(parse_body(b"{not json").is_err());
    }
}
