use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use licwarden_allocation::{AssignLicense, ReleaseAssignment};
use licwarden_core::{AssignmentId, DeviceId, LicenseKey};

use crate::app::routes::common::actor_from_headers;
use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/assignments", post(create_assignment))
        .route("/assignments/:id", delete(release_assignment))
        .route("/assignments/device/:id", get(assignments_by_device))
        .route("/assignments/license/:key", get(assignments_by_license))
}

pub async fn create_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::AssignRequest>,
) -> axum::response::Response {
    let cmd = AssignLicense {
        license_key: LicenseKey::from(body.license_key),
        device_id: DeviceId::from(body.device_id),
        assigned_by: actor_from_headers(&headers),
        occurred_at: Utc::now(),
    };

    match services.engine.assign(cmd) {
        Ok(assignment) => (StatusCode::CREATED, Json(assignment)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn release_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let assignment_id: AssignmentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid assignment id",
            )
        }
    };

    let cmd = ReleaseAssignment {
        assignment_id,
        released_by: actor_from_headers(&headers),
        occurred_at: Utc::now(),
    };

    match services.engine.release(cmd) {
        Ok(released) => (StatusCode::OK, Json(released)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn assignments_by_device(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.engine.assignments_for_device(&DeviceId::from(id)) {
        Ok(assignments) => (StatusCode::OK, Json(assignments)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn assignments_by_license(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match services
        .engine
        .assignments_for_license(&LicenseKey::from(key))
    {
        Ok(assignments) => (StatusCode::OK, Json(assignments)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
