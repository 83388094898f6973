//! Live catalog lookups for audited tables

use sqlx::{FromRow, PgExecutor};

use super::identifier::QualifiedName;

/// A user column of an audited table as the catalog currently describes it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TableColumn {
    pub name: String,
    /// `GENERATED ALWAYS AS (...) STORED`; never written on restore.
    pub generated: bool,
    /// `GENERATED ALWAYS AS IDENTITY`; writing it needs `OVERRIDING SYSTEM VALUE`.
    pub identity_always: bool,
}

/// Whether `name` is an existing ordinary or partitioned table.
pub async fn table_exists<'e, E>(executor: E, name: &QualifiedName) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
              AND c.relname = $2
              AND c.relkind IN ('r', 'p')
        )
        "#,
    )
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Tables of the audit store itself.
pub const AUDIT_STORE_TABLES: [&str; 2] = ["audit_logs", "target_tables"];

/// Whether `name` is one of the audit store's own tables, as resolved through
/// the current `search_path` (the same lookup the capture trigger uses).
pub async fn is_audit_store<'e, E>(executor: E, name: &QualifiedName) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let reserved: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
              AND c.relname = $2
              AND c.oid IN (
                  SELECT to_regclass(store)::OID
                  FROM unnest($3::TEXT[]) AS store
              )
        )
        "#,
    )
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .bind(&AUDIT_STORE_TABLES[..])
    .fetch_one(executor)
    .await?;

    Ok(reserved)
}

/// Non-dropped user columns in ordinal order. Empty when the table is gone.
pub async fn load_columns<'e, E>(
    executor: E,
    name: &QualifiedName,
) -> Result<Vec<TableColumn>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, TableColumn>(
        r#"
        SELECT a.attname::TEXT AS name,
               (a.attgenerated <> '') AS generated,
               (a.attidentity = 'a') AS identity_always
        FROM pg_catalog.pg_attribute a
        JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $1
          AND c.relname = $2
          AND a.attnum > 0
          AND NOT a.attisdropped
        ORDER BY a.attnum
        "#,
    )
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .fetch_all(executor)
    .await
}

/// Whether `column` alone is the primary key or a full (non-partial) unique key.
///
/// Restores use `ON CONFLICT (column)`, which needs exactly such an index.
pub async fn key_is_unique<'e, E>(
    executor: E,
    name: &QualifiedName,
    column: &str,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let unique: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM pg_catalog.pg_index i
            JOIN pg_catalog.pg_class c ON c.oid = i.indrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = c.oid AND a.attnum = i.indkey[0]
            WHERE n.nspname = $1
              AND c.relname = $2
              AND a.attname = $3
              AND i.indisunique
              AND i.indnkeyatts = 1
              AND i.indpred IS NULL
              AND i.indexprs IS NULL
        )
        "#,
    )
    .bind(name.schema.as_str())
    .bind(name.table.as_str())
    .bind(column)
    .fetch_one(executor)
    .await?;

    Ok(unique)
}
