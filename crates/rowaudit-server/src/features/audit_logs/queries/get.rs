use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    audit::{self, AuditRecord},
    error::AppError,
    features::shared::{parse_record_id, IdValidationError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetLogQuery {
    /// Raw path segment
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetLogError {
    #[error(transparent)]
    InvalidId(#[from] IdValidationError),
    #[error("Audit record {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<GetLogError> for AppError {
    fn from(err: GetLogError) -> Self {
        match err {
            GetLogError::InvalidId(_) => AppError::Validation(err.to_string()),
            GetLogError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetLogError::Store(e) => e,
        }
    }
}

impl Request<Result<AuditRecord, GetLogError>> for GetLogQuery {}

impl crate::cqrs::middleware::Query for GetLogQuery {}

impl GetLogQuery {
    pub fn validate(&self) -> Result<i64, GetLogError> {
        Ok(parse_record_id(&self.id)?)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetLogQuery) -> Result<AuditRecord, GetLogError> {
    let id = query.validate()?;

    audit::get_audit_record(&pool, id)
        .await?
        .ok_or(GetLogError::NotFound(id))
}
