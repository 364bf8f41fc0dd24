use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{anexos, auth, catalog, chamados, health, notificacoes, usuarios, ws};
use crate::services::{EmailService, NotificationFanout, RealtimeHub};
use persistence::repositories::{NotificationRepository, UserRepository};
use shared::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtKeys,
    pub hub: RealtimeHub,
    pub email: EmailService,
}

impl AppState {
    pub fn fanout(&self) -> NotificationFanout {
        NotificationFanout::new(
            NotificationRepository::new(self.pool.clone()),
            UserRepository::new(self.pool.clone()),
            self.hub.clone(),
            self.email.clone(),
        )
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: JwtKeys::new(&config.auth.jwt_secret, config.auth.token_expiry_secs),
        hub: RealtimeHub::new(),
        email: EmailService::new(config.email.clone()),
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Room for a full multipart batch plus field overhead.
    let body_limit = config.limits.max_attachment_bytes
        * (config.limits.max_attachments_per_upload + 1);

    let api_routes = Router::new()
        // Ticket core
        .route("/chamados", post(chamados::create).get(chamados::list))
        .route(
            "/chamados/:id",
            get(chamados::get_one).delete(chamados::delete),
        )
        .route("/chamados/:id/status", patch(chamados::update_status))
        .route("/chamados/:id/anexos", post(anexos::upload))
        .route("/chamados/:id/tickets", post(chamados::send_ticket))
        .route("/chamados/:id/historico", get(chamados::history))
        .route("/anexos/:id/download", get(anexos::download))
        // Auth and directory
        .route("/auth/login", post(auth::login))
        .route("/usuarios", get(usuarios::list).post(usuarios::create))
        .route("/usuarios/availability", get(usuarios::availability))
        // Notifications
        .route("/notificacoes", get(notificacoes::list))
        .route("/notificacoes/:id/read", patch(notificacoes::mark_read))
        // Reference catalogs
        .route("/problemas", get(catalog::list_problems).post(catalog::create_problem))
        .route("/unidades", get(catalog::list_units).post(catalog::create_unit))
        // Realtime socket
        .route("/ws", get(ws::upgrade));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
