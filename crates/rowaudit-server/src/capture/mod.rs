//! Trigger-based change capture
//!
//! Every registered table gets one row-level trigger that calls the shared
//! `audit_trigger_func()` (created by the migrations) with the table's
//! registration id as its argument. The trigger runs inside the writer's
//! transaction, so a write and its audit row commit or roll back together.
//!
//! Installation is idempotent: the registration is upserted and the trigger
//! is dropped and re-created in one transaction.

pub mod registry;

use rowaudit_common::KEY_COLUMN;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::AuditConfig,
    db::{
        self, catalog,
        identifier::{IdentifierError, QualifiedName},
    },
    error::AppError,
};

pub use registry::TargetTable;

/// Name of the capture trigger on every audited table.
pub const TRIGGER_NAME: &str = "rowaudit_capture";

/// Shared trigger function created by the migrations.
pub const TRIGGER_FUNCTION: &str = "audit_trigger_func";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    InvalidName(#[from] IdentifierError),

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("Table '{0}' belongs to the audit store and cannot be audited")]
    AuditStoreTable(String),

    #[error("Table '{0}' needs an 'id' column that is its primary key or a single-column unique key")]
    MissingKey(String),

    #[error("Table '{0}' is not registered for auditing")]
    NotRegistered(String),

    #[error("Failed to apply audit store migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::InvalidName(e) => AppError::Validation(e.to_string()),
            CaptureError::MissingKey(_) | CaptureError::AuditStoreTable(_) => {
                AppError::Validation(err.to_string())
            },
            CaptureError::TableNotFound(_) | CaptureError::NotRegistered(_) => {
                AppError::NotFound(err.to_string())
            },
            CaptureError::Migration(e) => AppError::Internal(e.to_string()),
            CaptureError::Database(e) => AppError::from(e),
        }
    }
}

/// Register `name` and (re)install its capture trigger.
#[tracing::instrument(skip(pool), fields(table = %name))]
pub async fn install(pool: &PgPool, name: &QualifiedName) -> Result<TargetTable, CaptureError> {
    let mut tx = pool.begin().await?;

    if !catalog::table_exists(&mut *tx, name).await? {
        return Err(CaptureError::TableNotFound(name.to_string()));
    }
    // A trigger on the store would recurse on its own insert.
    if catalog::is_audit_store(&mut *tx, name).await? {
        return Err(CaptureError::AuditStoreTable(name.to_string()));
    }
    if !catalog::key_is_unique(&mut *tx, name, KEY_COLUMN).await? {
        return Err(CaptureError::MissingKey(name.to_string()));
    }

    let registration = registry::upsert(&mut *tx, name).await?;

    sqlx::query(&drop_trigger_sql(name)).execute(&mut *tx).await?;
    sqlx::query(&create_trigger_sql(name, registration.id))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(registration_id = registration.id, "Capture trigger installed");
    Ok(registration)
}

/// Install capture on every table, stopping at the first failure.
pub async fn install_all(
    pool: &PgPool,
    tables: &[QualifiedName],
) -> Result<Vec<TargetTable>, CaptureError> {
    let mut registrations = Vec::with_capacity(tables.len());
    for name in tables {
        registrations.push(install(pool, name).await?);
    }
    Ok(registrations)
}

/// Drop the trigger and deactivate the registration.
///
/// Existing audit rows stay readable but can no longer be reverted.
#[tracing::instrument(skip(pool), fields(table = %name))]
pub async fn uninstall(pool: &PgPool, name: &QualifiedName) -> Result<TargetTable, CaptureError> {
    let mut tx = pool.begin().await?;

    let registration = registry::find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| CaptureError::NotRegistered(name.to_string()))?;

    if catalog::table_exists(&mut *tx, name).await? {
        sqlx::query(&drop_trigger_sql(name)).execute(&mut *tx).await?;
    } else {
        warn!("Table no longer exists, only deactivating its registration");
    }
    registry::deactivate(&mut *tx, registration.id).await?;

    tx.commit().await?;

    info!(registration_id = registration.id, "Capture trigger removed");
    Ok(TargetTable {
        active: false,
        ..registration
    })
}

pub async fn list_registrations(pool: &PgPool) -> Result<Vec<TargetTable>, CaptureError> {
    Ok(registry::list(pool).await?)
}

/// Startup routine: apply migrations, then install every configured table.
pub async fn setup(pool: &PgPool, config: &AuditConfig) -> Result<Vec<TargetTable>, CaptureError> {
    db::MIGRATOR.run(pool).await?;
    info!("Audit store migrations completed");

    let tables = config
        .target_tables
        .iter()
        .map(|raw| QualifiedName::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let registrations = install_all(pool, &tables).await?;
    info!(count = registrations.len(), "Audit capture ready");
    Ok(registrations)
}

fn drop_trigger_sql(name: &QualifiedName) -> String {
    format!("DROP TRIGGER IF EXISTS \"{TRIGGER_NAME}\" ON {}", name.quoted())
}

fn create_trigger_sql(name: &QualifiedName, registration_id: i32) -> String {
    format!(
        "CREATE TRIGGER \"{TRIGGER_NAME}\" \
         AFTER INSERT OR UPDATE OR DELETE ON {} \
         FOR EACH ROW EXECUTE FUNCTION {TRIGGER_FUNCTION}('{registration_id}')",
        name.quoted()
    )
}
