//! Database queries for audit logs

use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use super::models::{AuditQuery, AuditRecord, AuditRecordRow, AUDIT_COLUMNS, MAX_AUDIT_QUERY_LIMIT};
use crate::error::ServerResult;

/// Query audit logs with filters
///
/// Newest first; ties on `occurred_at` are broken by `id` so paging is stable.
pub async fn query_audit_records(pool: &PgPool, query: AuditQuery) -> ServerResult<Vec<AuditRecord>> {
    let limit = query.limit.clamp(0, MAX_AUDIT_QUERY_LIMIT);
    let offset = query.offset.max(0);

    let mut sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE 1=1");

    let mut bind_count = 1;
    let mut conditions = Vec::new();

    if query.operation.is_some() {
        conditions.push(format!("operation = ${}", bind_count));
        bind_count += 1;
    }
    if query.actor.is_some() {
        conditions.push(format!("actor = ${}", bind_count));
        bind_count += 1;
    }
    if query.target_table_id.is_some() {
        conditions.push(format!("target_table_id = ${}", bind_count));
        bind_count += 1;
    }

    for condition in conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition);
    }

    sql.push_str(" ORDER BY occurred_at DESC, id DESC");
    sql.push_str(&format!(" LIMIT ${}", bind_count));
    bind_count += 1;
    sql.push_str(&format!(" OFFSET ${}", bind_count));

    let mut query_builder = sqlx::query_as::<_, AuditRecordRow>(&sql);

    if let Some(operation) = query.operation {
        query_builder = query_builder.bind(operation.as_str());
    }
    if let Some(actor) = query.actor {
        query_builder = query_builder.bind(actor);
    }
    if let Some(target_table_id) = query.target_table_id {
        query_builder = query_builder.bind(target_table_id);
    }

    query_builder = query_builder.bind(limit).bind(offset);

    let rows = query_builder.fetch_all(pool).await?;

    debug!(count = rows.len(), "Queried audit logs");

    rows.into_iter()
        .map(|row| AuditRecord::try_from(row).map_err(Into::into))
        .collect()
}

/// Fetch one audit record by id
pub async fn get_audit_record(pool: &PgPool, id: i64) -> ServerResult<Option<AuditRecord>> {
    fetch_audit_row(pool, id)
        .await?
        .map(|row| AuditRecord::try_from(row).map_err(Into::into))
        .transpose()
}

/// Raw row lookup usable inside a transaction.
pub(crate) async fn fetch_audit_row<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<AuditRecordRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AuditRecordRow>(&format!(
        "SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowaudit_common::OperationKind;

    async fn seed(pool: &PgPool) -> i32 {
        let table_id: i32 = sqlx::query_scalar(
            "INSERT INTO target_tables (schema_name, table_name) VALUES ('public', 'items') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        for (actor, operation, before, after) in [
            ("alice", "INSERT", None, Some(r#"{"id": 1, "name": "a"}"#)),
            ("bob", "UPDATE", Some(r#"{"id": 1, "name": "a"}"#), Some(r#"{"id": 1, "name": "b"}"#)),
            ("alice", "DELETE", Some(r#"{"id": 1, "name": "b"}"#), None),
        ] {
            sqlx::query(
                r#"
                INSERT INTO audit_logs (target_table_id, target_entity_id, actor, before_state, after_state, operation)
                VALUES ($1, '1', $2, $3::jsonb, $4::jsonb, $5)
                "#,
            )
            .bind(table_id)
            .bind(actor)
            .bind(before)
            .bind(after)
            .bind(operation)
            .execute(pool)
            .await
            .unwrap();
        }

        table_id
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_query_audit_records_newest_first(pool: PgPool) {
        seed(&pool).await;

        let records = query_audit_records(&pool, AuditQuery::default()).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].operation_kind, OperationKind::Delete);
        assert_eq!(records[2].operation_kind, OperationKind::Insert);
        assert!(records[0].id > records[1].id);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_query_audit_records_paging(pool: PgPool) {
        seed(&pool).await;

        let page = query_audit_records(
            &pool,
            AuditQuery {
                limit: 2,
                offset: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].operation_kind, OperationKind::Update);
        assert_eq!(page[1].operation_kind, OperationKind::Insert);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_query_audit_records_filters(pool: PgPool) {
        let table_id = seed(&pool).await;

        let by_actor = query_audit_records(
            &pool,
            AuditQuery {
                actor: Some("alice".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_actor.len(), 2);

        let by_operation = query_audit_records(
            &pool,
            AuditQuery {
                operation: Some(OperationKind::Update),
                target_table_id: Some(table_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_operation.len(), 1);
        assert_eq!(by_operation[0].actor, "bob");
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_get_audit_record(pool: PgPool) {
        seed(&pool).await;

        let first = query_audit_records(&pool, AuditQuery::default()).await.unwrap();
        let record = get_audit_record(&pool, first[0].id).await.unwrap().unwrap();
        assert_eq!(record, first[0]);

        assert!(get_audit_record(&pool, i64::MAX).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_audit_rows_are_immutable(pool: PgPool) {
        seed(&pool).await;

        let result = sqlx::query("UPDATE audit_logs SET actor = 'mallory'")
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
