//! Shared utilities and types for feature modules
//!
//! - **pagination**: raw `limit`/`offset` parsing
//! - **validation**: path and filter parsing

pub mod pagination;
pub mod validation;

pub use pagination::{Page, PageParams, PaginationError};
pub use validation::{parse_operation, parse_record_id, parse_table_ref, IdValidationError};
