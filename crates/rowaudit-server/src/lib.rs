//! rowaudit server library
//!
//! Change auditing and reversal for PostgreSQL tables.
//!
//! # Overview
//!
//! - **Capture**: a row-level trigger on every configured table appends one
//!   record per insert, update or delete to `audit_logs`, in the same
//!   transaction as the write ([`capture`])
//! - **Query**: list and fetch audit records ([`audit`])
//! - **Revert**: re-apply the pre-change state of one record inside a
//!   transaction ([`revert`])
//! - **HTTP**: `GET /api/logs`, `GET /api/logs/:id`, `POST /api/revert/:id`,
//!   `GET /api/tables`, `GET /health` ([`api`], [`features`])
//!
//! # Architecture
//!
//! Routes follow a CQRS layout: reads are queries, the revert is a command,
//! and both are registered with a mediator ([`cqrs`]). Reverts are ordinary
//! writes from the database's point of view, so each one is audited too.
//!
//! # Example
//!
//! ```no_run
//! use rowaudit_server::{api, capture, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     capture::setup(&pool, &config.audit).await?;
//!     api::serve(config, pool).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod capture;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod revert;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
