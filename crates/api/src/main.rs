use anyhow::Result;
use tracing::info;

use helpdesk_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::metrics::init_metrics();

    info!("Starting Helpdesk API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let app = app::create_app(config.clone(), pool);

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
