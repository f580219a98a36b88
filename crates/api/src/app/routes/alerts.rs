use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/alerts/expiring-licenses", get(expiring_licenses))
        .route("/alerts/overused-licenses", get(overused_licenses))
        .route("/alerts/devices-at-risk", get(devices_at_risk))
}

pub async fn expiring_licenses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::WindowQuery>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match services
        .reports
        .expiring_licenses(today, query.days.unwrap_or(30))
    {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn overused_licenses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ThresholdQuery>,
) -> axum::response::Response {
    match services
        .reports
        .overused_licenses(query.threshold.unwrap_or(75.0))
    {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn devices_at_risk(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::WindowQuery>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match services
        .reports
        .devices_at_risk(today, query.days.unwrap_or(15))
    {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
