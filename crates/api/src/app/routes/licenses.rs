use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use licwarden_core::{LicenseKey, VendorId};
use licwarden_licenses::{LicenseUpdate, NewLicense};
use licwarden_store::LicenseFilter;

use crate::app::routes::common::actor_from_headers;
use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/licenses", get(list_licenses).post(create_license))
        .route(
            "/licenses/:key",
            get(get_license).put(update_license).delete(delete_license),
        )
        .route("/licenses/:key/utilization", get(license_utilization))
}

pub async fn create_license(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::CreateLicenseRequest>,
) -> axum::response::Response {
    let cmd = NewLicense {
        key: LicenseKey::from(body.license_key),
        software_name: body.software_name,
        vendor_id: VendorId::from_uuid(body.vendor_id),
        valid_from: body.valid_from,
        valid_to: body.valid_to,
        kind: body.license_type,
        max_usage: body.max_usage,
        notes: body.notes,
        occurred_at: Utc::now(),
    };

    match services.licenses.create(cmd, actor_from_headers(&headers)) {
        Ok(license) => (StatusCode::CREATED, Json(license)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_licenses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::LicenseListQuery>,
) -> axum::response::Response {
    let filter = LicenseFilter {
        vendor_id: query.vendor_id.map(VendorId::from_uuid),
        software_name: query.software_name,
        expired_as_of: query.expired_only.then(|| Utc::now().date_naive()),
    };

    match services.licenses.list(&filter) {
        Ok(licenses) => (StatusCode::OK, Json(licenses)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_license(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match services.licenses.get(&LicenseKey::from(key)) {
        Ok(license) => (StatusCode::OK, Json(license)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_license(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(body): Json<dto::UpdateLicenseRequest>,
) -> axum::response::Response {
    let update = LicenseUpdate {
        software_name: body.software_name,
        vendor_id: body.vendor_id.map(VendorId::from_uuid),
        valid_from: body.valid_from,
        valid_to: body.valid_to,
        kind: body.license_type,
        max_usage: body.max_usage,
        notes: body.notes,
    };

    match services.licenses.update(
        &LicenseKey::from(key),
        update,
        actor_from_headers(&headers),
        Utc::now(),
    ) {
        Ok(license) => (StatusCode::OK, Json(license)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_license(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> axum::response::Response {
    let key = LicenseKey::from(key);
    match services
        .licenses
        .delete(&key, actor_from_headers(&headers), Utc::now())
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("License {key} deleted successfully") })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn license_utilization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match services.engine.utilization(&LicenseKey::from(key)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
