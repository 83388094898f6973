//! Error types shared across rowaudit crates

use thiserror::Error;

use crate::types::OperationKind;

/// Result type alias for rowaudit operations
pub type Result<T> = std::result::Result<T, RowAuditError>;

/// Errors raised while interpreting captured audit data
#[derive(Error, Debug)]
pub enum RowAuditError {
    #[error("Row snapshot must be a JSON object, got {0}")]
    InvalidSnapshot(&'static str),

    #[error("Row snapshot has no '{0}' column")]
    MissingKey(&'static str),

    #[error("Unsupported operation kind: {0}")]
    UnknownOperation(String),

    #[error("{0} record has row images that do not match its operation")]
    ImageMismatch(OperationKind),
}
