use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use licwarden_core::DeviceId;
use licwarden_devices::{DeviceStatus, DeviceUpdate, NewDevice};
use licwarden_store::DeviceFilter;

use crate::app::routes::common::actor_from_headers;
use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/:id",
            get(get_device).put(update_device).delete(delete_device),
        )
}

fn parse_status(raw: Option<&str>) -> Result<Option<DeviceStatus>, axum::response::Response> {
    raw.map(str::parse::<DeviceStatus>)
        .transpose()
        .map_err(errors::domain_error_to_response)
}

pub async fn create_device(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::CreateDeviceRequest>,
) -> axum::response::Response {
    let status = match parse_status(body.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let cmd = NewDevice {
        id: DeviceId::from(body.device_id),
        device_type: body.device_type,
        ip_address: body.ip_address,
        location: body.location,
        model: body.model,
        status,
        occurred_at: Utc::now(),
    };

    match services.devices.create(cmd, actor_from_headers(&headers)) {
        Ok(device) => (StatusCode::CREATED, Json(device)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_devices(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DeviceListQuery>,
) -> axum::response::Response {
    let status = match parse_status(query.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let filter = DeviceFilter {
        status,
        location: query.location,
        device_type: query.device_type,
    };

    match services.devices.list(&filter) {
        Ok(devices) => (StatusCode::OK, Json(devices)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_device(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.devices.get(&DeviceId::from(id)) {
        Ok(device) => (StatusCode::OK, Json(device)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_device(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateDeviceRequest>,
) -> axum::response::Response {
    let status = match parse_status(body.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let update = DeviceUpdate {
        device_type: body.device_type,
        ip_address: body.ip_address,
        location: body.location,
        model: body.model,
        status,
    };

    match services.devices.update(
        &DeviceId::from(id),
        update,
        actor_from_headers(&headers),
        Utc::now(),
    ) {
        Ok(device) => (StatusCode::OK, Json(device)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_device(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = DeviceId::from(id);
    match services
        .devices
        .delete(&id, actor_from_headers(&headers), Utc::now())
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("Device {id} deleted successfully") })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
