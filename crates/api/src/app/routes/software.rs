use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use licwarden_core::{DeviceId, SoftwareVersionId};
use licwarden_devices::{NewSoftwareVersion, SoftwareVersionUpdate};

use crate::app::routes::common::actor_from_headers;
use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route(
            "/devices/:id/software-versions",
            get(list_device_versions).post(record_version),
        )
        .route("/software-versions", get(list_all_versions))
        .route("/software-versions/outdated-count", get(outdated_count))
        .route(
            "/software-versions/:id",
            axum::routing::put(update_version).delete(delete_version),
        )
}

pub async fn record_version(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(device_id): Path<String>,
    Json(body): Json<dto::CreateSoftwareVersionRequest>,
) -> axum::response::Response {
    let cmd = NewSoftwareVersion {
        id: SoftwareVersionId::new(),
        device_id: DeviceId::from(device_id),
        software_name: body.software_name,
        current_version: body.current_version,
        latest_version: body.latest_version,
        status: body.status,
        last_checked: body.last_checked.unwrap_or_else(|| Utc::now().date_naive()),
    };

    match services
        .software
        .record(cmd, actor_from_headers(&headers), Utc::now())
    {
        Ok(version) => (StatusCode::CREATED, Json(version)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_device_versions(
    Extension(services): Extension<Arc<AppServices>>,
    Path(device_id): Path<String>,
) -> axum::response::Response {
    match services
        .software
        .list_for_device(&DeviceId::from(device_id))
    {
        Ok(versions) => (StatusCode::OK, Json(versions)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_all_versions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.software.list_all() {
        Ok(versions) => (StatusCode::OK, Json(versions)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn outdated_count(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.software.status_summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_version(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSoftwareVersionRequest>,
) -> axum::response::Response {
    let id: SoftwareVersionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid software version id",
            )
        }
    };

    let update = SoftwareVersionUpdate {
        current_version: body.current_version,
        latest_version: body.latest_version,
        status: body.status,
        last_checked: body.last_checked,
    };

    match services
        .software
        .update(&id, update, actor_from_headers(&headers), Utc::now())
    {
        Ok(version) => (StatusCode::OK, Json(version)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_version(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SoftwareVersionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid software version id",
            )
        }
    };

    match services
        .software
        .delete(&id, actor_from_headers(&headers), Utc::now())
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("Software version {id} deleted successfully") })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
