//! Integration tests for the ticket lifecycle: creation with generated
//! identifiers, status transitions with stamps and history, and the
//! credential-gated delete.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    cleanup_all_test_data, create_test_app, get_request, json_request, parse_response_body,
    run_migrations, sample_chamado, seed_user, test_config, try_test_pool,
};
use chrono::Utc;
use domain::models::{Ticket, TicketStatus};
use helpdesk_api::config::EmailConfig;
use helpdesk_api::services::{EmailService, NotificationFanout, RealtimeHub};
use persistence::repositories::{NotificationRepository, UserRepository};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_assigns_identifiers_and_defaults() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", sample_chamado()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    // Floor is 80, so an empty database starts at EVQ-0081.
    assert_eq!(body["codigo"].as_str().unwrap(), "EVQ-0081");
    let protocolo = body["protocolo"].as_str().unwrap();
    assert!(protocolo.ends_with("-1"), "protocolo was {protocolo}");
    assert_eq!(body["status"], "Aberto");
    assert_eq!(body["prioridade"], "Normal");
    assert!(body["data_primeira_resposta"].is_null());

    // A second ticket advances both sequences.
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", sample_chamado()))
        .await
        .unwrap();
    let second = parse_response_body(response).await;
    assert_eq!(second["codigo"].as_str().unwrap(), "EVQ-0082");
    assert!(second["protocolo"].as_str().unwrap().ends_with("-2"));

    // Creation fans out a durable notification.
    let created_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notificacoes WHERE acao = 'created'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(created_rows, 2);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let mut payload = sample_chamado();
    payload["email"] = json!("nao-e-email");
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut payload = sample_chamado();
    payload["visita"] = json!("15/03/2026");
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_list_and_get() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", sample_chamado()))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/chamados"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = parse_response_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/chamados/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = parse_response_body(response).await;
    assert_eq!(fetched["codigo"], created["codigo"]);

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/chamados/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_status_update_normalizes_and_stamps() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", sample_chamado()))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Loose input normalizes to the canonical label.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/chamados/{id}/status"),
            json!({"status": "CONCLUIDO", "alterado_por": "tecnico.ti"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["status"], "Concluído");
    assert!(!updated["data_primeira_resposta"].is_null());
    assert!(!updated["data_conclusao"].is_null());
    let first_conclusao = updated["data_conclusao"].as_str().unwrap().to_string();
    let first_resposta = updated["data_primeira_resposta"].as_str().unwrap().to_string();

    // Reopen, then conclude again: first response stays, conclusion re-stamps.
    app.clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/chamados/{id}/status"),
            json!({"status": "aberto"}),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/chamados/{id}/status"),
            json!({"status": "Fechado"}),
        ))
        .await
        .unwrap();
    let reconcluded = parse_response_body(response).await;
    assert_eq!(reconcluded["status"], "Concluído");
    assert_eq!(reconcluded["data_primeira_resposta"], json!(first_resposta));
    assert_ne!(reconcluded["data_conclusao"].as_str().unwrap(), first_conclusao);

    // Every transition appended a history row.
    let transitions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM chamado_status_historico WHERE chamado_id = $1::uuid",
    )
    .bind(&id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(transitions, 3);

    // The assembled feed carries abertura, descricao and the transitions in order.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/chamados/{id}/historico")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let feed = parse_response_body(response).await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 5);
    assert_eq!(feed[0]["tipo"], "abertura");
    assert_eq!(feed[1]["tipo"], "descricao");
    assert!(feed[2]["label"].as_str().unwrap().contains("Concluído"));
    assert!(feed[2]["label"].as_str().unwrap().contains("tecnico.ti"));

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_delete_requires_valid_credentials() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    seed_user(&pool, "admin.ti", "senha-forte", "admin").await;

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/chamados", sample_chamado()))
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Wrong password: 401 and the ticket survives.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/v1/chamados/{id}"),
            json!({"usuario": "admin.ti", "senha": "errada"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chamados")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    // Unknown account is indistinguishable from a wrong password.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/v1/chamados/{id}"),
            json!({"usuario": "ninguem", "senha": "qualquer"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials: ticket gone, exactly one delete notification.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/v1/chamados/{id}"),
            json!({"usuario": "admin.ti", "senha": "senha-forte"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chamados")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    let deleted_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notificacoes WHERE acao = 'deleted'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(deleted_rows, 1);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_fanout_pushes_notification_to_staff_rooms() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let staff_id = seed_user(&pool, "tecnico.plantao", "senha-forte", "tecnico").await;
    let colab_id = seed_user(&pool, "colab.comum", "senha-forte", "colaborador").await;

    let hub = RealtimeHub::new();
    let mut staff_rx = hub.subscribe_user(staff_id).await;
    let mut colab_rx = hub.subscribe_user(colab_id).await;

    let fanout = NotificationFanout::new(
        NotificationRepository::new(pool.clone()),
        UserRepository::new(pool.clone()),
        hub.clone(),
        EmailService::new(EmailConfig::default()),
    );

    let ticket = Ticket {
        id: uuid::Uuid::new_v4(),
        codigo: "EVQ-0099".to_string(),
        protocolo: "20260823-1".to_string(),
        solicitante: "Maria Souza".to_string(),
        cargo: "Recepção".to_string(),
        email: "maria@example.com".to_string(),
        telefone: "(11) 98765-4321".to_string(),
        unidade: "Unidade Centro".to_string(),
        problema: "Internet".to_string(),
        internet_item: None,
        descricao: None,
        data_visita: None,
        status: TicketStatus::Aberto,
        prioridade: "Normal".to_string(),
        data_abertura: Utc::now(),
        data_primeira_resposta: None,
        data_conclusao: None,
        usuario_id: None,
    };
    fanout.ticket_created(&ticket).await;

    // Staff rooms get the targeted push; non-staff rooms stay silent.
    let envelope = staff_rx.recv().await.unwrap();
    assert_eq!(envelope.event, "notification:new");
    assert_eq!(envelope.data["recurso_id"], "EVQ-0099");
    assert!(colab_rx.try_recv().is_err());

    // The durable row behind the push exists exactly once.
    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notificacoes WHERE recurso_id = 'EVQ-0099'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);

    cleanup_all_test_data(&pool).await;
}

#[tokio::test]
async fn test_login_and_blocking_after_failed_attempts() {
    let Some(pool) = try_test_pool().await else { return };
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    seed_user(&pool, "ana.lima", "senha-correta", "tecnico").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({"usuario": "ana.lima", "senha": "senha-correta"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["usuario"], "ana.lima");
    assert!(body["user"]["senha_hash"].is_null());

    // Five wrong passwords block the account; the right one no longer works.
    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/auth/login",
                json!({"usuario": "ana.lima", "senha": "errada"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({"usuario": "ana.lima", "senha": "senha-correta"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Conta bloqueada");

    cleanup_all_test_data(&pool).await;
}
