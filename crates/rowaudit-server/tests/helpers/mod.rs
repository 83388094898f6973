//! Test helpers for rowaudit server integration tests
//!
//! - a small audited `products` table
//! - router construction and request helpers for `oneshot` calls

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use rowaudit_server::{
    api,
    audit::{query_audit_records, AuditQuery, AuditRecord},
    capture::{self, TargetTable},
    config::Config,
    db::identifier::QualifiedName,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

/// Create `public.products` and install capture on it.
pub async fn audited_products(pool: &PgPool) -> TargetTable {
    sqlx::query(
        r#"
        CREATE TABLE products (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price NUMERIC(12, 4),
            tags TEXT[],
            attributes JSONB
        )
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    capture::install(pool, &QualifiedName::parse("products").unwrap())
        .await
        .unwrap()
}

/// All audit records, oldest first.
pub async fn all_records(pool: &PgPool) -> Vec<AuditRecord> {
    let mut records = query_audit_records(
        pool,
        AuditQuery {
            limit: 1000,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    records.reverse();
    records
}

pub async fn count_records(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Name of the product with `id`, `None` when the row is absent.
pub async fn product_name(pool: &PgPool, id: i32) -> Option<String> {
    sqlx::query_scalar("SELECT name FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .unwrap()
}

pub fn test_app(pool: PgPool) -> Router {
    api::create_router(pool, &Config::default())
}

/// Router over a pool that never connects, for paths rejected before any query.
pub fn offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://nobody@127.0.0.1:1/none")
        .unwrap();
    test_app(pool)
}

/// Send a request and return status plus body text.
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, Method::GET, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}
