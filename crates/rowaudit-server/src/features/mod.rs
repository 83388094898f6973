//! Feature modules implementing the rowaudit API
//!
//! Each feature is a vertical slice following the CQRS pattern:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! # Features
//!
//! - **audit_logs**: list and fetch captured changes
//! - **reverts**: undo one captured change
//! - **target_tables**: the registered (audited) tables
//!
//! Commands and queries implement `mediator::Request`, so the same handlers
//! are reachable through [`crate::cqrs::build_mediator`].

pub mod audit_logs;
pub mod reverts;
pub mod shared;
pub mod target_tables;

use axum::Router;
use sqlx::PgPool;

/// Creates the API router with all feature routes mounted
///
/// - `/logs` - Audit records
/// - `/revert` - Revert a recorded change
/// - `/tables` - Audited tables
pub fn router(db: PgPool) -> Router<()> {
    Router::new()
        .nest("/logs", audit_logs::audit_logs_routes())
        .nest("/revert", reverts::reverts_routes())
        .nest("/tables", target_tables::target_tables_routes())
        .with_state(db)
}
