//! rowaudit Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging bootstrap and error handling for the rowaudit workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`RowAuditError`] and the crate [`Result`] alias
//! - **Logging**: `tracing` subscriber initialization shared by every binary
//! - **Types**: [`OperationKind`] and the schema-less [`RowSnapshot`]
//!
//! # Example
//!
//! ```
//! use rowaudit_common::{OperationKind, RowSnapshot};
//! use serde_json::json;
//!
//! let snapshot = RowSnapshot::try_from(json!({"id": 1, "name": "A"})).unwrap();
//! assert_eq!(snapshot.key().and_then(|k| k.as_i64()), Some(1));
//! assert_eq!("update".parse::<OperationKind>().unwrap(), OperationKind::Update);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, RowAuditError};
pub use types::{ColumnValue, OperationKind, RowSnapshot, KEY_COLUMN};
