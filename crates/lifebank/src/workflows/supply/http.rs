//! Shared response shaping for the workflow routers: every failure becomes a
//! structured `{ kind, error }` payload, never a bare trace.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::store::StoreError;

pub(crate) fn error_response(
    status: StatusCode,
    kind: &'static str,
    message: String,
) -> Response {
    (status, Json(json!({ "kind": kind, "error": message }))).into_response()
}

pub(crate) fn store_error_response(err: &StoreError) -> Response {
    let (status, kind) = match err {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        StoreError::Duplicate(_) | StoreError::StaleVersion { .. } | StoreError::Conflict(_) => {
            (StatusCode::CONFLICT, "conflict")
        }
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "transient"),
    };
    error_response(status, kind, err.to_string())
}
