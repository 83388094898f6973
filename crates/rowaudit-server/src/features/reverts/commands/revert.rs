use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    error::AppError,
    features::shared::{parse_record_id, IdValidationError},
    revert::{self, RevertError, RevertOutcome},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertChangeCommand {
    /// Raw path segment naming the audit record
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RevertChangeError {
    #[error(transparent)]
    InvalidId(#[from] IdValidationError),
    #[error(transparent)]
    Revert(#[from] RevertError),
}

impl From<RevertChangeError> for AppError {
    fn from(err: RevertChangeError) -> Self {
        match err {
            RevertChangeError::InvalidId(e) => AppError::Validation(e.to_string()),
            RevertChangeError::Revert(e) => AppError::from(e),
        }
    }
}

impl Request<Result<RevertOutcome, RevertChangeError>> for RevertChangeCommand {}

impl crate::cqrs::middleware::Command for RevertChangeCommand {}

impl RevertChangeCommand {
    pub fn validate(&self) -> Result<i64, RevertChangeError> {
        Ok(parse_record_id(&self.id)?)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, command: RevertChangeCommand) -> Result<RevertOutcome, RevertChangeError> {
    let audit_id = command.validate()?;
    Ok(revert::revert_change(&pool, audit_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate() {
        let command = RevertChangeCommand { id: "9".to_string() };
        assert_eq!(command.validate().unwrap(), 9);

        let command = RevertChangeCommand { id: "9x".to_string() };
        let err = command.validate().unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_revert_errors_keep_their_status() {
        let err = RevertChangeError::from(RevertError::RecordNotFound(4));
        assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
    }
}
