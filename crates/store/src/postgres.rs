//! Postgres-backed entity store.
//!
//! ## Expected Schema
//!
//! ```sql
//! CREATE TABLE vendors (
//!     vendor_id     UUID PRIMARY KEY,
//!     name          TEXT NOT NULL,
//!     support_email TEXT,
//!     created_at    TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE licenses (
//!     license_key   TEXT PRIMARY KEY,
//!     software_name TEXT NOT NULL,
//!     vendor_id     UUID NOT NULL REFERENCES vendors (vendor_id),
//!     valid_from    DATE NOT NULL,
//!     valid_to      DATE NOT NULL,
//!     kind          TEXT NOT NULL,
//!     max_usage     INT  NOT NULL,
//!     notes         TEXT,
//!     created_at    TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE devices (
//!     device_id   TEXT PRIMARY KEY,
//!     device_type TEXT NOT NULL,
//!     ip_address  TEXT NOT NULL,
//!     location    TEXT NOT NULL,
//!     model       TEXT,
//!     status      TEXT NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE assignments (
//!     assignment_id UUID PRIMARY KEY,
//!     license_key   TEXT NOT NULL REFERENCES licenses (license_key) ON DELETE CASCADE,
//!     device_id     TEXT NOT NULL REFERENCES devices  (device_id)   ON DELETE CASCADE,
//!     assigned_by   UUID NOT NULL,
//!     assigned_at   TIMESTAMPTZ NOT NULL,
//!     UNIQUE (license_key, device_id)
//! );
//! CREATE TABLE software_versions (
//!     sv_id           UUID PRIMARY KEY,
//!     device_id       TEXT NOT NULL REFERENCES devices (device_id) ON DELETE CASCADE,
//!     software_name   TEXT NOT NULL,
//!     current_version TEXT NOT NULL,
//!     latest_version  TEXT,
//!     status          TEXT NOT NULL,
//!     last_checked    DATE NOT NULL
//! );
//! CREATE TABLE audit_log (
//!     log_id      UUID PRIMARY KEY,
//!     actor       UUID NOT NULL,
//!     entity_type TEXT NOT NULL,
//!     entity_id   TEXT NOT NULL,
//!     action      TEXT NOT NULL,
//!     detail      TEXT,
//!     recorded_at TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx error | PG code | StoreError | Scenario |
//! |------------|---------|------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateKey` / `DuplicateAssignment` | duplicate primary key, or a racing assignment insert caught by the pair constraint |
//! | Database (other) | any | `Unavailable` | constraint/consistency faults we do not interpret |
//! | connection/pool/decode | n/a | `Unavailable` | infrastructure faults |
//!
//! ## Assignment Atomicity
//!
//! `insert_assignment` takes a transaction-scoped advisory lock keyed by the
//! license key (`pg_advisory_xact_lock(hashtext(key))`) before counting and
//! inserting, serializing racers on the same license. The unique constraint
//! on `(license_key, device_id)` is the backstop for the pair invariant.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use licwarden_audit::{AuditAction, AuditEntry};
use licwarden_core::{
    AssignmentId, DeviceId, EntityKind, IpAddress, LicenseKey, SoftwareVersionId, UserId,
    ValidityWindow, VendorId,
};
use licwarden_devices::{Device, DeviceStatus, SoftwareVersion, VersionStatus};
use licwarden_licenses::{Assignment, License, LicenseKind, Vendor};

use crate::contract::{AssignmentFilter, DeviceFilter, EntityStore, LicenseFilter, StoreError};

/// Postgres-backed entity store.
///
/// The `EntityStore` trait is synchronous; database work is async. Each
/// trait method enters the ambient tokio runtime via `block_in_place`, the
/// same sync-facade-over-async-internals arrangement the rest of the system
/// expects. Requires a multi-threaded runtime.
#[derive(Debug, Clone)]
pub struct PostgresEntityStore {
    pool: Arc<PgPool>,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn enter<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            StoreError::Unavailable(
                "PostgresEntityStore requires a running tokio runtime".to_string(),
            )
        })?;
        tokio::task::block_in_place(|| handle.block_on(fut))
    }

    async fn insert_license_inner(&self, license: License) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO licenses \
             (license_key, software_name, vendor_id, valid_from, valid_to, kind, max_usage, notes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(license.key.as_str())
        .bind(&license.software_name)
        .bind(*license.vendor_id.as_uuid())
        .bind(license.validity.valid_from)
        .bind(license.validity.valid_to)
        .bind(license.kind.to_string())
        .bind(license.max_usage as i32)
        .bind(&license.notes)
        .bind(license.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_unique(e, EntityKind::License, license.key.as_str()))?;
        Ok(())
    }

    async fn get_license_inner(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        let row = sqlx::query("SELECT * FROM licenses WHERE license_key = $1")
            .bind(key.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| license_from_row(&r)).transpose()
    }

    async fn list_licenses_inner(
        &self,
        filter: &LicenseFilter,
    ) -> Result<Vec<License>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM licenses \
             WHERE ($1::uuid IS NULL OR vendor_id = $1) \
               AND ($2::text IS NULL OR software_name ILIKE '%' || $2 || '%') \
               AND ($3::date IS NULL OR valid_to < $3) \
             ORDER BY license_key",
        )
        .bind(filter.vendor_id.map(|v| *v.as_uuid()))
        .bind(filter.software_name.as_deref())
        .bind(filter.expired_as_of)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(license_from_row).collect()
    }

    async fn update_license_inner(&self, license: License) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE licenses SET software_name = $2, vendor_id = $3, valid_from = $4, \
             valid_to = $5, kind = $6, max_usage = $7, notes = $8 WHERE license_key = $1",
        )
        .bind(license.key.as_str())
        .bind(&license.software_name)
        .bind(*license.vendor_id.as_uuid())
        .bind(license.validity.valid_from)
        .bind(license.validity.valid_to)
        .bind(license.kind.to_string())
        .bind(license.max_usage as i32)
        .bind(&license.notes)
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_license_inner(&self, key: &LicenseKey) -> Result<bool, StoreError> {
        // Assignments go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM licenses WHERE license_key = $1")
            .bind(key.as_str())
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_device_inner(&self, device: Device) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO devices (device_id, device_type, ip_address, location, model, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(device.id.as_str())
        .bind(&device.device_type)
        .bind(device.ip_address.as_str())
        .bind(&device.location)
        .bind(&device.model)
        .bind(device.status.to_string())
        .bind(device.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_unique(e, EntityKind::Device, device.id.as_str()))?;
        Ok(())
    }

    async fn get_device_inner(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        let row = sqlx::query("SELECT * FROM devices WHERE device_id = $1")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| device_from_row(&r)).transpose()
    }

    async fn list_devices_inner(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM devices \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%') \
               AND ($3::text IS NULL OR device_type ILIKE '%' || $3 || '%') \
             ORDER BY device_id",
        )
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.location.as_deref())
        .bind(filter.device_type.as_deref())
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(device_from_row).collect()
    }

    async fn update_device_inner(&self, device: Device) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE devices SET device_type = $2, ip_address = $3, location = $4, \
             model = $5, status = $6 WHERE device_id = $1",
        )
        .bind(device.id.as_str())
        .bind(&device.device_type)
        .bind(device.ip_address.as_str())
        .bind(&device.location)
        .bind(&device.model)
        .bind(device.status.to_string())
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_device_inner(&self, id: &DeviceId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM devices WHERE device_id = $1")
            .bind(id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_vendor_inner(&self, vendor: Vendor) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO vendors (vendor_id, name, support_email, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(*vendor.id.as_uuid())
        .bind(&vendor.name)
        .bind(&vendor.support_email)
        .bind(vendor.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_unique(e, EntityKind::Vendor, &vendor.id.to_string()))?;
        Ok(())
    }

    async fn get_vendor_inner(&self, id: &VendorId) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query("SELECT * FROM vendors WHERE vendor_id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| vendor_from_row(&r)).transpose()
    }

    async fn list_vendors_inner(&self) -> Result<Vec<Vendor>, StoreError> {
        let rows = sqlx::query("SELECT * FROM vendors ORDER BY name, vendor_id")
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(vendor_from_row).collect()
    }

    async fn delete_vendor_inner(&self, id: &VendorId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM vendors WHERE vendor_id = $1")
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_assignment_inner(
        &self,
        assignment: Assignment,
        capacity: u32,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // Serialize racers on the same license for the rest of this transaction.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(assignment.license_key.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        let duplicate =
            sqlx::query("SELECT 1 FROM assignments WHERE license_key = $1 AND device_id = $2")
                .bind(assignment.license_key.as_str())
                .bind(assignment.device_id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if duplicate.is_some() {
            return Err(StoreError::DuplicateAssignment {
                license_key: assignment.license_key.to_string(),
                device_id: assignment.device_id.to_string(),
            });
        }

        let current: i64 =
            sqlx::query_scalar("SELECT count(*) FROM assignments WHERE license_key = $1")
                .bind(assignment.license_key.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if current as u32 >= capacity {
            return Err(StoreError::CapacityExceeded {
                license_key: assignment.license_key.to_string(),
                current: current as u32,
                limit: capacity,
            });
        }

        sqlx::query(
            "INSERT INTO assignments (assignment_id, license_key, device_id, assigned_by, assigned_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*assignment.id.as_uuid())
        .bind(assignment.license_key.as_str())
        .bind(assignment.device_id.as_str())
        .bind(*assignment.assigned_by.as_uuid())
        .bind(assignment.assigned_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateAssignment {
                    license_key: assignment.license_key.to_string(),
                    device_id: assignment.device_id.to_string(),
                }
            } else {
                map_sqlx(e)
            }
        })?;

        tx.commit().await.map_err(map_sqlx)
    }

    async fn delete_assignment_inner(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, StoreError> {
        let row = sqlx::query("DELETE FROM assignments WHERE assignment_id = $1 RETURNING *")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| assignment_from_row(&r)).transpose()
    }

    async fn list_assignments_inner(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM assignments \
             WHERE ($1::text IS NULL OR license_key = $1) \
               AND ($2::text IS NULL OR device_id = $2) \
             ORDER BY assigned_at, assignment_id",
        )
        .bind(filter.license_key.as_ref().map(|k| k.as_str().to_string()))
        .bind(filter.device_id.as_ref().map(|d| d.as_str().to_string()))
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(assignment_from_row).collect()
    }

    async fn count_assignments_inner(&self, filter: &AssignmentFilter) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM assignments \
             WHERE ($1::text IS NULL OR license_key = $1) \
               AND ($2::text IS NULL OR device_id = $2)",
        )
        .bind(filter.license_key.as_ref().map(|k| k.as_str().to_string()))
        .bind(filter.device_id.as_ref().map(|d| d.as_str().to_string()))
        .fetch_one(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(count as u32)
    }

    async fn insert_software_version_inner(
        &self,
        version: SoftwareVersion,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO software_versions \
             (sv_id, device_id, software_name, current_version, latest_version, status, last_checked) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*version.id.as_uuid())
        .bind(version.device_id.as_str())
        .bind(&version.software_name)
        .bind(&version.current_version)
        .bind(&version.latest_version)
        .bind(version.status.to_string())
        .bind(version.last_checked)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_unique(e, EntityKind::SoftwareVersion, &version.id.to_string()))?;
        Ok(())
    }

    async fn get_software_version_inner(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<Option<SoftwareVersion>, StoreError> {
        let row = sqlx::query("SELECT * FROM software_versions WHERE sv_id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(|r| software_version_from_row(&r)).transpose()
    }

    async fn list_software_versions_inner(
        &self,
        device_id: Option<&DeviceId>,
    ) -> Result<Vec<SoftwareVersion>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM software_versions \
             WHERE ($1::text IS NULL OR device_id = $1) \
             ORDER BY device_id, software_name",
        )
        .bind(device_id.map(|d| d.as_str().to_string()))
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(software_version_from_row).collect()
    }

    async fn update_software_version_inner(
        &self,
        version: SoftwareVersion,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE software_versions SET current_version = $2, latest_version = $3, \
             status = $4, last_checked = $5 WHERE sv_id = $1",
        )
        .bind(*version.id.as_uuid())
        .bind(&version.current_version)
        .bind(&version.latest_version)
        .bind(version.status.to_string())
        .bind(version.last_checked)
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_software_version_inner(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM software_versions WHERE sv_id = $1")
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_audit_inner(&self, entry: AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_log (log_id, actor, entity_type, entity_id, action, detail, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(*entry.actor.as_uuid())
        .bind(entity_kind_label(entry.entity))
        .bind(&entry.entity_id)
        .bind(entry.action.to_string())
        .bind(&entry.detail)
        .bind(entry.recorded_at)
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list_audit_inner(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        let rows = sqlx::query("SELECT * FROM audit_log ORDER BY recorded_at DESC LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(audit_entry_from_row).collect()
    }
}

impl EntityStore for PostgresEntityStore {
    fn insert_license(&self, license: License) -> Result<(), StoreError> {
        self.enter(self.insert_license_inner(license))
    }

    fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        self.enter(self.get_license_inner(key))
    }

    fn list_licenses(&self, filter: &LicenseFilter) -> Result<Vec<License>, StoreError> {
        self.enter(self.list_licenses_inner(filter))
    }

    fn update_license(&self, license: License) -> Result<bool, StoreError> {
        self.enter(self.update_license_inner(license))
    }

    fn delete_license(&self, key: &LicenseKey) -> Result<bool, StoreError> {
        self.enter(self.delete_license_inner(key))
    }

    fn insert_device(&self, device: Device) -> Result<(), StoreError> {
        self.enter(self.insert_device_inner(device))
    }

    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        self.enter(self.get_device_inner(id))
    }

    fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError> {
        self.enter(self.list_devices_inner(filter))
    }

    fn update_device(&self, device: Device) -> Result<bool, StoreError> {
        self.enter(self.update_device_inner(device))
    }

    fn delete_device(&self, id: &DeviceId) -> Result<bool, StoreError> {
        self.enter(self.delete_device_inner(id))
    }

    fn insert_vendor(&self, vendor: Vendor) -> Result<(), StoreError> {
        self.enter(self.insert_vendor_inner(vendor))
    }

    fn get_vendor(&self, id: &VendorId) -> Result<Option<Vendor>, StoreError> {
        self.enter(self.get_vendor_inner(id))
    }

    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        self.enter(self.list_vendors_inner())
    }

    fn delete_vendor(&self, id: &VendorId) -> Result<bool, StoreError> {
        self.enter(self.delete_vendor_inner(id))
    }

    fn insert_assignment(&self, assignment: Assignment, capacity: u32) -> Result<(), StoreError> {
        self.enter(self.insert_assignment_inner(assignment, capacity))
    }

    fn delete_assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError> {
        self.enter(self.delete_assignment_inner(id))
    }

    fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError> {
        self.enter(self.list_assignments_inner(filter))
    }

    fn count_assignments(&self, filter: &AssignmentFilter) -> Result<u32, StoreError> {
        self.enter(self.count_assignments_inner(filter))
    }

    fn insert_software_version(&self, version: SoftwareVersion) -> Result<(), StoreError> {
        self.enter(self.insert_software_version_inner(version))
    }

    fn get_software_version(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<Option<SoftwareVersion>, StoreError> {
        self.enter(self.get_software_version_inner(id))
    }

    fn list_software_versions(
        &self,
        device_id: Option<&DeviceId>,
    ) -> Result<Vec<SoftwareVersion>, StoreError> {
        self.enter(self.list_software_versions_inner(device_id))
    }

    fn update_software_version(&self, version: SoftwareVersion) -> Result<bool, StoreError> {
        self.enter(self.update_software_version_inner(version))
    }

    fn delete_software_version(&self, id: &SoftwareVersionId) -> Result<bool, StoreError> {
        self.enter(self.delete_software_version_inner(id))
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.enter(self.append_audit_inner(entry))
    }

    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        self.enter(self.list_audit_inner(limit))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code == "23505")
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn map_unique(err: sqlx::Error, entity: EntityKind, key: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicateKey {
            entity,
            key: key.to_string(),
        }
    } else {
        map_sqlx(err)
    }
}

fn corrupt(what: &str) -> StoreError {
    StoreError::Unavailable(format!("corrupt row: {what}"))
}

fn entity_kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::License => "LICENSE",
        EntityKind::Device => "DEVICE",
        EntityKind::Vendor => "VENDOR",
        EntityKind::Assignment => "ASSIGNMENT",
        EntityKind::SoftwareVersion => "SOFTWARE_VERSION",
    }
}

fn entity_kind_from_label(label: &str) -> Result<EntityKind, StoreError> {
    match label {
        "LICENSE" => Ok(EntityKind::License),
        "DEVICE" => Ok(EntityKind::Device),
        "VENDOR" => Ok(EntityKind::Vendor),
        "ASSIGNMENT" => Ok(EntityKind::Assignment),
        "SOFTWARE_VERSION" => Ok(EntityKind::SoftwareVersion),
        _ => Err(corrupt("entity_type")),
    }
}

fn audit_action_from_label(label: &str) -> Result<AuditAction, StoreError> {
    match label {
        "CREATE" => Ok(AuditAction::Create),
        "UPDATE" => Ok(AuditAction::Update),
        "DELETE" => Ok(AuditAction::Delete),
        "ASSIGN" => Ok(AuditAction::Assign),
        "RELEASE" => Ok(AuditAction::Release),
        _ => Err(corrupt("action")),
    }
}

fn license_from_row(row: &PgRow) -> Result<License, StoreError> {
    let kind: String = row.try_get("kind").map_err(map_sqlx)?;
    let max_usage: i32 = row.try_get("max_usage").map_err(map_sqlx)?;
    let valid_from: NaiveDate = row.try_get("valid_from").map_err(map_sqlx)?;
    let valid_to: NaiveDate = row.try_get("valid_to").map_err(map_sqlx)?;
    Ok(License {
        key: LicenseKey::from(row.try_get::<String, _>("license_key").map_err(map_sqlx)?),
        software_name: row.try_get("software_name").map_err(map_sqlx)?,
        vendor_id: VendorId::from_uuid(row.try_get::<Uuid, _>("vendor_id").map_err(map_sqlx)?),
        validity: ValidityWindow {
            valid_from,
            valid_to,
        },
        kind: kind.parse::<LicenseKind>().map_err(|_| corrupt("kind"))?,
        max_usage: u32::try_from(max_usage).map_err(|_| corrupt("max_usage"))?,
        notes: row.try_get("notes").map_err(map_sqlx)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(map_sqlx)?,
    })
}

fn device_from_row(row: &PgRow) -> Result<Device, StoreError> {
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    let ip: String = row.try_get("ip_address").map_err(map_sqlx)?;
    Ok(Device {
        id: DeviceId::from(row.try_get::<String, _>("device_id").map_err(map_sqlx)?),
        device_type: row.try_get("device_type").map_err(map_sqlx)?,
        ip_address: IpAddress::parse(&ip).map_err(|_| corrupt("ip_address"))?,
        location: row.try_get("location").map_err(map_sqlx)?,
        model: row.try_get("model").map_err(map_sqlx)?,
        status: status
            .parse::<DeviceStatus>()
            .map_err(|_| corrupt("status"))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(map_sqlx)?,
    })
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, StoreError> {
    Ok(Vendor {
        id: VendorId::from_uuid(row.try_get::<Uuid, _>("vendor_id").map_err(map_sqlx)?),
        name: row.try_get("name").map_err(map_sqlx)?,
        support_email: row.try_get("support_email").map_err(map_sqlx)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(map_sqlx)?,
    })
}

fn assignment_from_row(row: &PgRow) -> Result<Assignment, StoreError> {
    Ok(Assignment {
        id: AssignmentId::from_uuid(row.try_get::<Uuid, _>("assignment_id").map_err(map_sqlx)?),
        license_key: LicenseKey::from(row.try_get::<String, _>("license_key").map_err(map_sqlx)?),
        device_id: DeviceId::from(row.try_get::<String, _>("device_id").map_err(map_sqlx)?),
        assigned_by: UserId::from_uuid(row.try_get::<Uuid, _>("assigned_by").map_err(map_sqlx)?),
        assigned_at: row
            .try_get::<DateTime<Utc>, _>("assigned_at")
            .map_err(map_sqlx)?,
    })
}

fn software_version_from_row(row: &PgRow) -> Result<SoftwareVersion, StoreError> {
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    Ok(SoftwareVersion {
        id: SoftwareVersionId::from_uuid(row.try_get::<Uuid, _>("sv_id").map_err(map_sqlx)?),
        device_id: DeviceId::from(row.try_get::<String, _>("device_id").map_err(map_sqlx)?),
        software_name: row.try_get("software_name").map_err(map_sqlx)?,
        current_version: row.try_get("current_version").map_err(map_sqlx)?,
        latest_version: row.try_get("latest_version").map_err(map_sqlx)?,
        status: status
            .parse::<VersionStatus>()
            .map_err(|_| corrupt("status"))?,
        last_checked: row.try_get("last_checked").map_err(map_sqlx)?,
    })
}

fn audit_entry_from_row(row: &PgRow) -> Result<AuditEntry, StoreError> {
    let entity: String = row.try_get("entity_type").map_err(map_sqlx)?;
    let action: String = row.try_get("action").map_err(map_sqlx)?;
    Ok(AuditEntry {
        id: row.try_get::<Uuid, _>("log_id").map_err(map_sqlx)?,
        actor: UserId::from_uuid(row.try_get::<Uuid, _>("actor").map_err(map_sqlx)?),
        entity: entity_kind_from_label(&entity)?,
        entity_id: row.try_get("entity_id").map_err(map_sqlx)?,
        action: audit_action_from_label(&action)?,
        detail: row.try_get("detail").map_err(map_sqlx)?,
        recorded_at: row
            .try_get::<DateTime<Utc>, _>("recorded_at")
            .map_err(map_sqlx)?,
    })
}
