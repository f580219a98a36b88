use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use licwarden_core::VendorId;
use licwarden_licenses::NewVendor;

use crate::app::routes::common::actor_from_headers;
use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/vendors", get(list_vendors).post(create_vendor))
        .route("/vendors/:id", get(get_vendor).delete(delete_vendor))
}

pub async fn create_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::CreateVendorRequest>,
) -> axum::response::Response {
    let cmd = NewVendor {
        id: VendorId::new(),
        name: body.name,
        support_email: body.support_email,
        occurred_at: Utc::now(),
    };

    match services.vendors.create(cmd, actor_from_headers(&headers)) {
        Ok(vendor) => (StatusCode::CREATED, Json(vendor)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.vendors.list() {
        Ok(vendors) => (StatusCode::OK, Json(vendors)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid vendor id")
        }
    };

    match services.vendors.get(&id) {
        Ok(vendor) => (StatusCode::OK, Json(vendor)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid vendor id")
        }
    };

    match services
        .vendors
        .delete(&id, actor_from_headers(&headers), Utc::now())
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("Vendor {id} deleted successfully") })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
