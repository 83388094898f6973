//! Audit record models

use chrono::{DateTime, Utc};
use rowaudit_common::{OperationKind, RowAuditError, RowSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Default page size for audit listings.
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Upper bound on page size; larger requests are clamped.
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Columns selected for every audit read.
pub(crate) const AUDIT_COLUMNS: &str = "id, target_entity_id, target_table_id, actor, \
     before_state, after_state, operation, occurred_at";

/// `audit_logs` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct AuditRecordRow {
    pub id: i64,
    pub target_entity_id: Option<String>,
    pub target_table_id: i32,
    pub actor: String,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub operation: String,
    pub occurred_at: DateTime<Utc>,
}

/// One captured change, as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub target_entity_id: Option<String>,
    pub source_table_ref: i32,
    pub actor: String,
    pub before_state: Option<RowSnapshot>,
    pub after_state: Option<RowSnapshot>,
    pub operation_kind: OperationKind,
    pub occurred_at: DateTime<Utc>,
}

impl TryFrom<AuditRecordRow> for AuditRecord {
    type Error = RowAuditError;

    fn try_from(row: AuditRecordRow) -> Result<Self, Self::Error> {
        let operation_kind: OperationKind = row.operation.parse()?;
        if row.before_state.is_some() != operation_kind.has_before_state()
            || row.after_state.is_some() != operation_kind.has_after_state()
        {
            return Err(RowAuditError::ImageMismatch(operation_kind));
        }

        Ok(Self {
            id: row.id,
            target_entity_id: row.target_entity_id,
            source_table_ref: row.target_table_id,
            actor: row.actor,
            before_state: row.before_state.map(RowSnapshot::try_from).transpose()?,
            after_state: row.after_state.map(RowSnapshot::try_from).transpose()?,
            operation_kind,
            occurred_at: row.occurred_at,
        })
    }
}

/// Filters and paging for audit listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub limit: i64,
    pub offset: i64,
    pub operation: Option<OperationKind>,
    pub actor: Option<String>,
    pub target_table_id: Option<i32>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_QUERY_LIMIT,
            offset: 0,
            operation: None,
            actor: None,
            target_table_id: None,
        }
    }
}
