use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    audit::{self, AuditQuery, AuditRecord},
    error::AppError,
    features::shared::{
        parse_operation, parse_table_ref, IdValidationError, PageParams, PaginationError,
    },
};

/// `GET /api/logs` parameters, kept as raw strings until validated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLogsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    /// `INSERT`, `UPDATE` or `DELETE`, any case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Registration id of the source table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListLogsError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Filter(#[from] IdValidationError),
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ListLogsError> for AppError {
    fn from(err: ListLogsError) -> Self {
        match err {
            ListLogsError::Pagination(_) | ListLogsError::Filter(_) => {
                AppError::Validation(err.to_string())
            },
            ListLogsError::Store(e) => e,
        }
    }
}

impl Request<Result<Vec<AuditRecord>, ListLogsError>> for ListLogsQuery {}

impl crate::cqrs::middleware::Query for ListLogsQuery {}

impl ListLogsQuery {
    pub fn validate(&self) -> Result<AuditQuery, ListLogsError> {
        let page = PageParams::new(self.limit.as_deref(), self.offset.as_deref()).resolve()?;

        Ok(AuditQuery {
            limit: page.limit,
            offset: page.offset,
            operation: parse_operation(self.operation.as_deref())?,
            actor: self
                .actor
                .as_deref()
                .map(str::trim)
                .filter(|actor| !actor.is_empty())
                .map(str::to_string),
            target_table_id: parse_table_ref(self.table.as_deref())?,
        })
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListLogsQuery) -> Result<Vec<AuditRecord>, ListLogsError> {
    let filter = query.validate()?;
    Ok(audit::query_audit_records(&pool, filter).await?)
}
