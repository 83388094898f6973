//! HTTP API tests
//!
//! Malformed input is rejected before any query runs, so those cases use a
//! router over a pool that never connects. Everything else needs a database.

use axum::http::{header, Method, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;

mod helpers;

use helpers::{audited_products, get_json, offline_app, product_name, send, test_app};

async fn seed_history(pool: &PgPool) {
    for sql in [
        "INSERT INTO products (id, name) VALUES (1, 'A')",
        "INSERT INTO products (id, name) VALUES (2, 'X')",
        "UPDATE products SET name = 'B' WHERE id = 1",
        "DELETE FROM products WHERE id = 2",
    ] {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap()
}

#[tokio::test]
async fn test_get_log_rejects_malformed_id() {
    let app = offline_app();

    for uri in ["/api/logs/abc", "/api/logs/0", "/api/logs/-4", "/api/logs/1.5"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["status"], json!(400));
    }
}

#[tokio::test]
async fn test_list_logs_rejects_bad_pagination() {
    let app = offline_app();

    for uri in [
        "/api/logs?limit=ten",
        "/api/logs?limit=-1",
        "/api/logs?offset=x",
        "/api/logs?offset=-20",
    ] {
        let (status, _) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_list_logs_malformed_query_uses_error_body() {
    let (status, body) = get_json(&offline_app(), "/api/logs?limit=1&limit=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], json!(400));
    assert!(!error_message(&body).is_empty());

    let (status, body) = get_json(&offline_app(), "/api/tables?active_only=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], json!(400));
}

#[tokio::test]
async fn test_list_logs_rejects_unknown_operation_filter() {
    let (status, body) = get_json(&offline_app(), "/api/logs?operation=TRUNCATE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("TRUNCATE"));
}

#[tokio::test]
async fn test_revert_rejects_malformed_id() {
    let (status, body) = send(&offline_app(), Method::POST, "/api/revert/latest").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"]["status"], json!(400));
}

#[tokio::test]
async fn test_revert_requires_post() {
    let (status, _) = send(&offline_app(), Method::GET, "/api/revert/1").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_health_reports_connected(pool: PgPool) {
    let (status, body) = get_json(&test_app(pool), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "database": "connected"}));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_logs_newest_first(pool: PgPool) {
    audited_products(&pool).await;
    seed_history(&pool).await;
    let app = test_app(pool);

    let (status, body) = get_json(&app, "/api/logs").await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["operationKind"], json!("DELETE"));
    assert_eq!(records[3]["operationKind"], json!("INSERT"));
    assert_eq!(records[0]["targetEntityId"], json!("2"));
    assert!(records[0]["afterState"].is_null());
    assert_eq!(records[0]["beforeState"]["name"], json!("X"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_logs_keeps_full_decimal_precision(pool: PgPool) {
    sqlx::query("CREATE TABLE ledger (id INTEGER PRIMARY KEY, amount NUMERIC(30, 9))")
        .execute(&pool)
        .await
        .unwrap();
    rowaudit_server::capture::install(
        &pool,
        &rowaudit_server::db::identifier::QualifiedName::parse("ledger").unwrap(),
    )
    .await
    .unwrap();
    sqlx::query("INSERT INTO ledger (id, amount) VALUES (1, 12345678901234567890.123456789)")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(&test_app(pool), Method::GET, "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.contains(r#""amount":12345678901234567890.123456789"#),
        "{body}"
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_logs_pages(pool: PgPool) {
    audited_products(&pool).await;
    seed_history(&pool).await;
    let app = test_app(pool);

    let (_, first) = get_json(&app, "/api/logs?limit=2").await;
    let (_, second) = get_json(&app, "/api/logs?limit=2&offset=2").await;
    let (_, past_end) = get_json(&app, "/api/logs?offset=10").await;

    let first = first.as_array().unwrap();
    let second = second.as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert!(first[1]["id"].as_i64().unwrap() > second[0]["id"].as_i64().unwrap());
    assert!(past_end.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_logs_filters_by_operation(pool: PgPool) {
    audited_products(&pool).await;
    seed_history(&pool).await;

    let (status, body) = get_json(&test_app(pool), "/api/logs?operation=insert").await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["operationKind"] == json!("INSERT")));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_get_log_found_and_missing(pool: PgPool) {
    audited_products(&pool).await;
    seed_history(&pool).await;
    let app = test_app(pool);

    let (_, listing) = get_json(&app, "/api/logs?limit=1").await;
    let id = listing[0]["id"].as_i64().unwrap();

    let (status, record) = get_json(&app, &format!("/api/logs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record, listing[0]);

    let (status, body) = get_json(&app, "/api/logs/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], json!(404));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_revert_endpoint_restores_row(pool: PgPool) {
    audited_products(&pool).await;
    sqlx::query("INSERT INTO products (id, name) VALUES (1, 'A')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE products SET name = 'B' WHERE id = 1")
        .execute(&pool)
        .await
        .unwrap();
    let app = test_app(pool.clone());

    let (_, listing) = get_json(&app, "/api/logs?operation=UPDATE").await;
    let id = listing[0]["id"].as_i64().unwrap();

    let response = tower::ServiceExt::oneshot(
        app.clone(),
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(format!("/api/revert/{id}"))
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.starts_with("Change reverted successfully"));
    assert_eq!(product_name(&pool, 1).await.as_deref(), Some("A"));

    let (_, listing) = get_json(&app, "/api/logs").await;
    assert_eq!(listing.as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_revert_endpoint_unknown_record(pool: PgPool) {
    audited_products(&pool).await;

    let (status, body) = send(&test_app(pool), Method::POST, "/api/revert/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(error_message(&body).contains("42"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore] // Requires database
async fn test_list_tables(pool: PgPool) {
    audited_products(&pool).await;

    let (status, body) = get_json(&test_app(pool), "/api/tables").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["tableName"], json!("products"));
    assert_eq!(body[0]["schemaName"], json!("public"));
    assert_eq!(body[0]["active"], json!(true));
}
