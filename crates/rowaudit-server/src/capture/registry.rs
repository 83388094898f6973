//! `target_tables`: the allow-list of audited tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use crate::db::identifier::{Identifier, IdentifierError, QualifiedName};

/// One registered table. The `id` is what the capture trigger stores as
/// `audit_logs.target_table_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TargetTable {
    pub id: i32,
    pub schema_name: String,
    pub table_name: String,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl TargetTable {
    /// Re-validate the stored names before they are spliced into SQL.
    pub fn qualified_name(&self) -> Result<QualifiedName, IdentifierError> {
        Ok(QualifiedName::new(
            Identifier::parse(&self.schema_name)?,
            Identifier::parse(&self.table_name)?,
        ))
    }
}

const SELECT_COLUMNS: &str = "id, schema_name, table_name, active, registered_at";

/// Insert or re-activate the registration for `name`.
pub async fn upsert<'e, E>(executor: E, name: &QualifiedName) -> Result<TargetTable, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, TargetTable>(&format!(
        r#"
        INSERT INTO target_tables (schema_name, table_name, active)
        VALUES ($1, $2, TRUE)
        ON CONFLICT (schema_name, table_name) DO UPDATE SET active = TRUE
        RETURNING {SELECT_COLUMNS}
        "#
    ))
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .fetch_one(executor)
    .await
}

/// Registration `id` if it is still active.
pub async fn resolve_active<'e, E>(executor: E, id: i32) -> Result<Option<TargetTable>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, TargetTable>(&format!(
        "SELECT {SELECT_COLUMNS} FROM target_tables WHERE id = $1 AND active"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_name<'e, E>(
    executor: E,
    name: &QualifiedName,
) -> Result<Option<TargetTable>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, TargetTable>(&format!(
        "SELECT {SELECT_COLUMNS} FROM target_tables WHERE schema_name = $1 AND table_name = $2"
    ))
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .fetch_optional(executor)
    .await
}

/// Mark the registration inactive. Historical audit rows keep pointing at it.
pub async fn deactivate<'e, E>(executor: E, id: i32) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE target_tables SET active = FALSE WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// All registrations, active or not, ordered by id.
pub async fn list<'e, E>(executor: E) -> Result<Vec<TargetTable>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, TargetTable>(&format!(
        "SELECT {SELECT_COLUMNS} FROM target_tables ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}
