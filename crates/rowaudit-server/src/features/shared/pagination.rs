//! Shared pagination utilities
//!
//! `limit` and `offset` arrive as raw query-string values. They are parsed
//! here rather than by serde so a bad value produces the same error body as
//! every other validation failure.
//!
//! # Examples
//!
//! ```rust,ignore
//! use rowaudit_server::features::shared::pagination::PageParams;
//!
//! let params = PageParams::new(Some("20"), Some("40"));
//! let page = params.resolve()?;
//! assert_eq!((page.limit, page.offset), (20, 40));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("{field} must be a non-negative integer, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

/// Raw paging parameters as received
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn new(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    /// Parse both values. Missing or blank values take the defaults
    /// (limit 100, offset 0); limits above 1000 are clamped.
    pub fn resolve(&self) -> Result<Page, PaginationError> {
        let limit = parse_non_negative("limit", self.limit.as_deref())?
            .unwrap_or(DEFAULT_AUDIT_QUERY_LIMIT)
            .min(MAX_AUDIT_QUERY_LIMIT);
        let offset = parse_non_negative("offset", self.offset.as_deref())?.unwrap_or(0);

        Ok(Page { limit, offset })
    }
}

fn parse_non_negative(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, PaginationError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<i64>() {
        Ok(value) if value >= 0 => Ok(Some(value)),
        _ => Err(PaginationError::NotANumber {
            field,
            value: raw.to_string(),
        }),
    }
}
