//! Common test utilities for integration tests.
//!
//! Integration tests run against a real PostgreSQL database named by the
//! `TEST_DATABASE_URL` environment variable. When the variable is unset or
//! the database is unreachable, each test skips itself instead of failing,
//! so the unit suite stays green on machines without Postgres.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use helpdesk_api::{app::create_app, config::Config};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Connect to the test database, or `None` to skip the test.
pub async fn try_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&database_url)
        .await;
    match pool {
        Ok(pool) => Some(pool),
        Err(err) => {
            eprintln!("skipping integration test, database unreachable: {err}");
            None
        }
    }
}

/// Apply every migration file, ignoring already-applied errors.
pub async fn run_migrations(pool: &PgPool) {
    let migration_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("persistence/src/migrations");

    let mut entries: Vec<_> = std::fs::read_dir(&migration_dir)
        .expect("Failed to read migrations directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "sql").unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let sql = std::fs::read_to_string(entry.path()).expect("Failed to read migration file");
        sqlx::raw_sql(&sql).execute(pool).await.ok();
    }
}

/// Wipe every table so each test starts from a clean slate.
pub async fn cleanup_all_test_data(pool: &PgPool) {
    sqlx::raw_sql(
        "TRUNCATE chamado_anexos, chamado_status_historico, tickets, notificacoes, \
         chamados, usuarios, problemas, unidades CASCADE",
    )
    .execute(pool)
    .await
    .expect("Failed to truncate test tables");
}

pub fn test_config() -> Config {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_default();
    Config::load_for_test(&[("database.url", url.as_str())]).expect("Failed to build test config")
}

pub fn create_test_app(config: Config, pool: PgPool) -> Router {
    create_app(config, pool)
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

/// Insert an account directly, returning its id.
pub async fn seed_user(
    pool: &PgPool,
    usuario: &str,
    senha: &str,
    nivel_acesso: &str,
) -> uuid::Uuid {
    let senha_hash = shared::password::hash_password(senha).expect("Failed to hash password");
    sqlx::query_scalar(
        "INSERT INTO usuarios (nome, sobrenome, usuario, email, senha_hash, nivel_acesso) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind("Teste")
    .bind("Silva")
    .bind(usuario)
    .bind(format!("{usuario}@example.com"))
    .bind(senha_hash)
    .bind(nivel_acesso)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

/// A valid ticket creation payload.
pub fn sample_chamado() -> serde_json::Value {
    serde_json::json!({
        "solicitante": "Maria Souza",
        "cargo": "Recepção",
        "email": "maria@example.com",
        "telefone": "(11) 98765-4321",
        "unidade": "Unidade Centro",
        "problema": "Internet",
        "internet_item": "Wi-Fi",
        "descricao": "Sem acesso na recepção"
    })
}

pub const MULTIPART_BOUNDARY: &str = "helpdesk-test-boundary";

/// Build a multipart/form-data body from text fields and named files.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, file_name, mime, content) in files {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
