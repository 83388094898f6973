//! Shared validation utilities

use rowaudit_common::OperationKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    #[error("Invalid audit record id '{0}': expected a positive integer")]
    InvalidRecordId(String),

    #[error("Invalid table reference '{0}': expected a positive integer")]
    InvalidTableRef(String),

    #[error("Invalid operation '{0}': expected INSERT, UPDATE or DELETE")]
    InvalidOperation(String),
}

/// Parse an audit record id taken from the URL path.
pub fn parse_record_id(raw: &str) -> Result<i64, IdValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(IdValidationError::InvalidRecordId(raw.to_string())),
    }
}

/// Parse an optional `table` filter (a registration id).
pub fn parse_table_ref(raw: Option<&str>) -> Result<Option<i32>, IdValidationError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(IdValidationError::InvalidTableRef(raw.to_string())),
        },
    }
}

/// Parse an optional `operation` filter, case-insensitively.
pub fn parse_operation(raw: Option<&str>) -> Result<Option<OperationKind>, IdValidationError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| IdValidationError::InvalidOperation(raw.to_string())),
    }
}
