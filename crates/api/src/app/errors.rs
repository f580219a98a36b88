use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use licwarden_core::DomainError;

/// Map a domain failure onto the wire: business rejections become 4xx with a
/// stable error code, storage faults become 503.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::DuplicateAssignment { .. } => (StatusCode::CONFLICT, "duplicate_assignment"),
        DomainError::CapacityExceeded { .. } => (StatusCode::CONFLICT, "capacity_exceeded"),
        DomainError::AlreadyExists { .. } => (StatusCode::CONFLICT, "already_exists"),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        DomainError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
    };
    json_error(status, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
