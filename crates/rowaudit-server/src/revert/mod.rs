//! Revert engine
//!
//! Applies the inverse of one captured change inside a single transaction:
//!
//! | recorded   | compensating write                               |
//! |------------|--------------------------------------------------|
//! | `UPDATE`   | upsert `before_state` (row restored)             |
//! | `DELETE`   | upsert `before_state` (row re-created)           |
//! | `INSERT`   | delete by key; a missing row is a no-op success  |
//!
//! The compensating write goes through the capture trigger like any other
//! write, so every revert leaves its own audit record. The reverted record is
//! never touched.

pub mod statement;

use std::fmt;

use rowaudit_common::{OperationKind, RowAuditError};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    audit::{self, AuditRecord},
    capture::registry,
    db::{catalog, identifier::IdentifierError},
    error::AppError,
};

/// Progress of one revert request, reported through tracing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertStage {
    Pending,
    Resolving,
    Applying,
    Committed,
    Failed,
}

impl fmt::Display for RevertStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Resolving => "resolving",
            Self::Applying => "applying",
            Self::Committed => "committed",
            Self::Failed => "failed",
        })
    }
}

#[derive(Debug, Error)]
pub enum RevertError {
    #[error("Audit record {0} not found")]
    RecordNotFound(i64),

    #[error("Table reference {0} does not resolve to an active audited table")]
    TableUnresolved(i32),

    #[error("Operation '{0}' cannot be reverted")]
    UnsupportedOperation(String),

    #[error("Audit record {0} has no before-state to restore")]
    MissingSnapshot(i64),

    #[error("Snapshot has no usable 'id' value")]
    MissingKey,

    #[error("Stored snapshot is unusable: {0}")]
    InvalidSnapshot(String),

    #[error("Stored table name is invalid: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Table '{0}' no longer exists")]
    TableMissing(String),

    #[error("Columns {columns:?} of the snapshot no longer exist on '{table}'")]
    UnknownColumns { table: String, columns: Vec<String> },

    #[error("Current state of '{table}' rejects the restore: {message}")]
    Rejected { table: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RowAuditError> for RevertError {
    fn from(err: RowAuditError) -> Self {
        match err {
            RowAuditError::UnknownOperation(op) => RevertError::UnsupportedOperation(op),
            RowAuditError::MissingKey(_) => RevertError::MissingKey,
            other => RevertError::InvalidSnapshot(other.to_string()),
        }
    }
}

impl From<RevertError> for AppError {
    fn from(err: RevertError) -> Self {
        match err {
            RevertError::RecordNotFound(_) | RevertError::TableUnresolved(_) => {
                AppError::NotFound(err.to_string())
            },
            RevertError::UnsupportedOperation(_)
            | RevertError::MissingSnapshot(_)
            | RevertError::MissingKey
            | RevertError::InvalidSnapshot(_)
            | RevertError::InvalidIdentifier(_) => AppError::Validation(err.to_string()),
            RevertError::TableMissing(_)
            | RevertError::UnknownColumns { .. }
            | RevertError::Rejected { .. } => AppError::Conflict(err.to_string()),
            RevertError::Database(e) => AppError::from(e),
        }
    }
}

/// What the compensating write did to the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RevertAction {
    /// Existing row overwritten with the before-state
    Restored,
    /// Deleted row written back
    Recreated,
    /// Inserted row removed
    Deleted,
    /// Inserted row was already gone
    AlreadyAbsent,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertOutcome {
    pub audit_id: i64,
    pub operation: OperationKind,
    pub table: String,
    pub entity_id: Option<String>,
    pub action: RevertAction,
}

impl RevertOutcome {
    /// Plain-text confirmation returned by the HTTP facade.
    pub fn message(&self) -> String {
        let entity = self.entity_id.as_deref().unwrap_or("?");
        let detail = match self.action {
            RevertAction::Restored => format!("row {entity} in {} restored", self.table),
            RevertAction::Recreated => format!("row {entity} in {} re-created", self.table),
            RevertAction::Deleted => format!("row {entity} in {} deleted", self.table),
            RevertAction::AlreadyAbsent => {
                format!("row {entity} in {} was already absent, nothing to do", self.table)
            },
        };
        format!(
            "Change reverted successfully ({} #{}): {}",
            self.operation, self.audit_id, detail
        )
    }
}

/// Revert the change recorded as `audit_id`.
///
/// All-or-nothing: on any error the transaction is dropped and neither the
/// target table nor the audit store changes.
#[tracing::instrument(skip(pool))]
pub async fn revert_change(pool: &PgPool, audit_id: i64) -> Result<RevertOutcome, RevertError> {
    debug!(stage = %RevertStage::Pending, "Revert requested");

    match apply(pool, audit_id).await {
        Ok(outcome) => {
            info!(
                stage = %RevertStage::Committed,
                table = %outcome.table,
                action = ?outcome.action,
                "Change reverted"
            );
            Ok(outcome)
        },
        Err(e) => {
            warn!(stage = %RevertStage::Failed, error = %e, "Revert failed");
            Err(e)
        },
    }
}

async fn apply(pool: &PgPool, audit_id: i64) -> Result<RevertOutcome, RevertError> {
    let mut tx = pool.begin().await?;

    let row = audit::fetch_audit_row(&mut *tx, audit_id)
        .await?
        .ok_or(RevertError::RecordNotFound(audit_id))?;
    let record = AuditRecord::try_from(row)?;

    debug!(
        stage = %RevertStage::Resolving,
        table_ref = record.source_table_ref,
        "Resolving target table"
    );
    let registration = registry::resolve_active(&mut *tx, record.source_table_ref)
        .await?
        .ok_or(RevertError::TableUnresolved(record.source_table_ref))?;
    let table = registration.qualified_name()?;

    let columns = catalog::load_columns(&mut *tx, &table).await?;
    if columns.is_empty() {
        return Err(RevertError::TableMissing(table.to_string()));
    }

    let action = match record.operation_kind {
        OperationKind::Update | OperationKind::Delete => {
            let snapshot = record
                .before_state
                .as_ref()
                .ok_or(RevertError::MissingSnapshot(audit_id))?;
            let sql = statement::restore_sql(&table, &columns, snapshot)?;

            debug!(stage = %RevertStage::Applying, %sql, "Restoring before-state");
            let inserted: Option<bool> = sqlx::query_scalar(&sql)
                .bind(audit_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| rejected(&table, e))?;

            match inserted {
                Some(true) => RevertAction::Recreated,
                _ => RevertAction::Restored,
            }
        },
        OperationKind::Insert => {
            let has_key = record
                .after_state
                .as_ref()
                .is_some_and(|snapshot| snapshot.key().is_some())
                || record.target_entity_id.is_some();
            if !has_key {
                return Err(RevertError::MissingKey);
            }
            let sql = statement::delete_sql(&table, &columns)?;

            debug!(stage = %RevertStage::Applying, %sql, "Removing inserted row");
            let result = sqlx::query(&sql)
                .bind(audit_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| rejected(&table, e))?;

            if result.rows_affected() == 0 {
                RevertAction::AlreadyAbsent
            } else {
                RevertAction::Deleted
            }
        },
    };

    tx.commit().await?;

    Ok(RevertOutcome {
        audit_id,
        operation: record.operation_kind,
        table: table.to_string(),
        entity_id: record.target_entity_id,
        action,
    })
}

/// Integrity violations (class 23) and data exceptions (class 22) mean the
/// live table no longer accepts the snapshot; anything else is a store failure.
fn rejected(table: &impl fmt::Display, err: sqlx::Error) -> RevertError {
    let rejected = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code.starts_with("23") || code.starts_with("22"));

    if rejected {
        RevertError::Rejected {
            table: table.to_string(),
            message: err
                .as_database_error()
                .map(|db| db.message().to_string())
                .unwrap_or_default(),
        }
    } else {
        RevertError::Database(err)
    }
}
