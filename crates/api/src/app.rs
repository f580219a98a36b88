use std::sync::Arc;

use axum::{extract::Extension, Router};
use tower::ServiceBuilder;

use licwarden_allocation::AllocationEngine;
use licwarden_audit::AuditSink;
use licwarden_registry::{
    DeviceRegistry, LicenseRegistry, SoftwareVersionRegistry, VendorRegistry,
};
use licwarden_reports::ReportService;
use licwarden_store::{EntityStore, InMemoryEntityStore, StoreAuditSink};

pub mod dto;
pub mod errors;
pub mod routes;

pub type DynStore = Arc<dyn EntityStore>;
pub type DynSink = Arc<dyn AuditSink>;

/// Service wiring shared by every request handler.
pub struct AppServices {
    pub engine: AllocationEngine<DynStore, DynSink>,
    pub reports: ReportService<DynStore>,
    pub licenses: LicenseRegistry<DynStore, DynSink>,
    pub devices: DeviceRegistry<DynStore, DynSink>,
    pub vendors: VendorRegistry<DynStore, DynSink>,
    pub software: SoftwareVersionRegistry<DynStore, DynSink>,
}

impl AppServices {
    /// Wire every service over one shared store; the audit recorder writes
    /// through the same store, best-effort.
    pub fn from_store(store: DynStore) -> Self {
        let sink: DynSink = Arc::new(StoreAuditSink::new(Arc::clone(&store)));
        Self {
            engine: AllocationEngine::new(Arc::clone(&store), Arc::clone(&sink)),
            reports: ReportService::new(Arc::clone(&store)),
            licenses: LicenseRegistry::new(Arc::clone(&store), Arc::clone(&sink)),
            devices: DeviceRegistry::new(Arc::clone(&store), Arc::clone(&sink)),
            vendors: VendorRegistry::new(Arc::clone(&store), Arc::clone(&sink)),
            software: SoftwareVersionRegistry::new(store, sink),
        }
    }
}

/// Build the full application router.
pub fn build_app() -> Router {
    let services = Arc::new(AppServices::from_store(build_store()));

    Router::new()
        .nest("/api", routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

#[cfg(feature = "postgres")]
fn build_store() -> DynStore {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        match sqlx::postgres::PgPoolOptions::new().connect_lazy(&url) {
            Ok(pool) => {
                tracing::info!("using postgres entity store");
                return Arc::new(licwarden_store::PostgresEntityStore::new(pool));
            }
            Err(err) => {
                tracing::warn!(error = %err, "invalid DATABASE_URL, falling back to in-memory store");
            }
        }
    }
    Arc::new(InMemoryEntityStore::new())
}

#[cfg(not(feature = "postgres"))]
fn build_store() -> DynStore {
    tracing::info!("using in-memory entity store");
    Arc::new(InMemoryEntityStore::new())
}
