//! Common types used across rowaudit

mod snapshot;

pub use snapshot::{ColumnValue, RowSnapshot, KEY_COLUMN};

use serde::{Deserialize, Serialize};

use crate::error::RowAuditError;

/// Kind of row-level write recorded by the capture trigger.
///
/// The textual form matches PostgreSQL's `TG_OP` (`INSERT`, `UPDATE`, `DELETE`),
/// which is what the trigger stores in `audit_logs.operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a record of this kind carries a before-image.
    pub fn has_before_state(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    /// Whether a record of this kind carries an after-image.
    pub fn has_after_state(&self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

impl std::str::FromStr for OperationKind {
    type Err = RowAuditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RowAuditError::UnknownOperation(s.to_string())),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
