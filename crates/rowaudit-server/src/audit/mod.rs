//! Audit query service
//!
//! Read-only access to `audit_logs`. Rows are written exclusively by the
//! capture trigger (see [`crate::capture`]); nothing here inserts or updates.
//!
//! # Example
//!
//! ```no_run
//! use rowaudit_server::audit::{query_audit_records, AuditQuery};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let latest = query_audit_records(pool, AuditQuery { limit: 2, ..Default::default() }).await?;
//! for record in latest {
//!     println!("{} {} by {}", record.id, record.operation_kind, record.actor);
//! }
//! # Ok(())
//! # }
//! ```

mod models;
mod queries;

pub use models::{
    AuditQuery, AuditRecord, AuditRecordRow, DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT,
};
pub(crate) use queries::fetch_audit_row;
pub use queries::{get_audit_record, query_audit_records};
