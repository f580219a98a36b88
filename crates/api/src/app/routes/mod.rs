use axum::Router;

pub mod alerts;
pub mod assignments;
pub mod common;
pub mod devices;
pub mod licenses;
pub mod reports;
pub mod software;
pub mod vendors;

pub fn router() -> Router {
    Router::new()
        .merge(vendors::router())
        .merge(devices::router())
        .merge(licenses::router())
        .merge(assignments::router())
        .merge(alerts::router())
        .merge(reports::router())
        .merge(software::router())
}
