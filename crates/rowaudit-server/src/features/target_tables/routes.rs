//! Registered table routes
//!
//! - `GET /api/tables?active_only=true` - List audited tables and their registration ids

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::ListTablesQuery;
use crate::{capture::TargetTable, error::ServerResult};

pub fn target_tables_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_tables))
}

#[tracing::instrument(skip(pool, query))]
async fn list_tables(
    State(pool): State<PgPool>,
    query: Result<Query<ListTablesQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<TargetTable>>> {
    let Query(query) = query?;
    let tables = super::queries::list::handle(pool, query).await?;
    Ok(Json(tables))
}
