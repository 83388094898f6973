use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    capture::{self, CaptureError, TargetTable},
    error::AppError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTablesQuery {
    /// Only registrations that still have a capture trigger
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListTablesError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl From<ListTablesError> for AppError {
    fn from(err: ListTablesError) -> Self {
        match err {
            ListTablesError::Capture(e) => AppError::from(e),
        }
    }
}

impl Request<Result<Vec<TargetTable>, ListTablesError>> for ListTablesQuery {}

impl crate::cqrs::middleware::Query for ListTablesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListTablesQuery) -> Result<Vec<TargetTable>, ListTablesError> {
    let mut tables = capture::list_registrations(&pool).await?;
    if query.active_only {
        tables.retain(|table| table.active);
    }
    Ok(tables)
}
