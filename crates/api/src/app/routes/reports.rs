use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::app::{errors, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/dashboard/summary", get(dashboard_summary))
        .route("/utilization", get(utilization_overview))
        .route("/reports/compliance", get(compliance_report))
        .route("/reports/device-inventory", get(device_inventory_report))
        .route("/reports/vendor-analysis", get(vendor_analysis_report))
}

pub async fn dashboard_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.reports.dashboard_summary(Utc::now().date_naive()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn utilization_overview(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.engine.utilization_overview() {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn compliance_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.reports.compliance_report(Utc::now().date_naive()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn device_inventory_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.reports.device_inventory_report() {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn vendor_analysis_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services
        .reports
        .vendor_analysis_report(Utc::now().date_naive())
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
