//! Revert API routes
//!
//! - `POST /api/revert/:id` - Undo the change recorded as `id`

use axum::{
    extract::{Path, State},
    routing::post,
    Router,
};
use sqlx::PgPool;

use super::commands::RevertChangeCommand;
use crate::error::ServerResult;

pub fn reverts_routes() -> Router<PgPool> {
    Router::new().route("/:id", post(revert_change))
}

/// Revert one recorded change
///
/// # Response
///
/// - `200 OK` - `text/plain` confirmation
/// - `400 Bad Request` - Malformed id, unsupported operation or unusable snapshot
/// - `404 Not Found` - Record absent or its table is no longer audited
/// - `409 Conflict` - The table no longer matches the snapshot
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool))]
async fn revert_change(State(pool): State<PgPool>, Path(id): Path<String>) -> ServerResult<String> {
    let outcome = super::commands::revert::handle(pool, RevertChangeCommand { id }).await?;

    tracing::info!(
        audit_id = outcome.audit_id,
        action = ?outcome.action,
        "Change reverted via API"
    );

    Ok(outcome.message())
}
