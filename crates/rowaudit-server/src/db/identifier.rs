//! SQL identifier validation and quoting
//!
//! Table and column names reach dynamically built statements (trigger DDL and
//! revert statements), so they are validated up front and always emitted
//! double-quoted. Values never pass through here; they are bound or read
//! server-side.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

/// Schema used when a configured table name carries no schema prefix.
pub const DEFAULT_SCHEMA: &str = "public";

/// PostgreSQL truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_BYTES: usize = 63;

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier cannot be empty")]
    Empty,

    #[error("identifier '{0}' exceeds 63 bytes")]
    TooLong(String),

    #[error("identifier '{0}' contains unsupported characters")]
    InvalidCharacters(String),

    #[error("table name '{0}' must be 'table' or 'schema.table'")]
    InvalidQualifiedName(String),
}

/// A validated, case-preserving SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if raw.len() > MAX_IDENTIFIER_BYTES {
            return Err(IdentifierError::TooLong(raw.to_string()));
        }
        if !IDENTIFIER_RE.is_match(raw) {
            return Err(IdentifierError::InvalidCharacters(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form, safe to splice into SQL text.
    pub fn quoted(&self) -> String {
        quote_ident(&self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote an identifier the way `quote_ident()` does, always adding quotes.
///
/// Used for column names read back from the catalog, which are trusted but
/// may need quoting (mixed case, keywords).
pub fn quote_ident(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// `schema.table` pair naming one audited table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: Identifier,
    pub table: Identifier,
}

impl QualifiedName {
    pub fn new(schema: Identifier, table: Identifier) -> Self {
        Self { schema, table }
    }

    /// Parse `table` or `schema.table`. Names are taken exactly as written.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let raw = raw.trim();
        let mut parts = raw.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(table), None, None) => Ok(Self {
                schema: Identifier(DEFAULT_SCHEMA.to_string()),
                table: Identifier::parse(table)?,
            }),
            (Some(schema), Some(table), None) => Ok(Self {
                schema: Identifier::parse(schema)?,
                table: Identifier::parse(table)?,
            }),
            _ => Err(IdentifierError::InvalidQualifiedName(raw.to_string())),
        }
    }

    pub fn quoted(&self) -> String {
        format!("{}.{}", self.schema.quoted(), self.table.quoted())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

impl std::str::FromStr for QualifiedName {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
