//! Audit log API routes
//!
//! # Route Structure
//!
//! - `GET /api/logs?limit=&offset=&operation=&actor=&table=` - List records, newest first
//! - `GET /api/logs/:id` - Get a single record

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::{GetLogQuery, ListLogsQuery};
use crate::{audit::AuditRecord, error::ServerResult};

pub fn audit_logs_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_logs))
        .route("/:id", get(get_log))
}

/// List audit records
///
/// # Response
///
/// - `200 OK` - JSON array of records (possibly empty)
/// - `400 Bad Request` - Non-numeric or negative `limit`/`offset`, unknown filter value,
///   malformed query string
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool, query))]
async fn list_logs(
    State(pool): State<PgPool>,
    query: Result<Query<ListLogsQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<AuditRecord>>> {
    let Query(query) = query?;
    let records = super::queries::list::handle(pool, query).await?;

    tracing::debug!(count = records.len(), "Audit records listed via API");

    Ok(Json(records))
}

/// Get one audit record
///
/// # Response
///
/// - `200 OK` - The record
/// - `400 Bad Request` - Malformed id
/// - `404 Not Found` - No such record
#[tracing::instrument(skip(pool))]
async fn get_log(State(pool): State<PgPool>, Path(id): Path<String>) -> ServerResult<Json<AuditRecord>> {
    let record = super::queries::get::handle(pool, GetLogQuery { id }).await?;
    Ok(Json(record))
}
