use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use museum_booking::{
    config::Config, database::Database, services::token::TokenServiceClient,
    session::SessionStore, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Museum Booking service");

    // Connect to the database and bring the schema up to date
    let db = Database::new(&config.database.url, config.database.pool_size).await?;
    info!("Database connected");
    db.run_migrations().await?;

    // Session store in Redis
    let sessions = SessionStore::connect(&config.redis.url, &config.session).await?;
    info!("Session store connected");

    let templates = museum_booking::load_templates()?;
    let tokens = TokenServiceClient::from_config(&config.token_service);

    let state = Arc::new(AppState {
        db,
        sessions,
        tokens,
        templates,
        config: config.clone(),
    });

    let app = museum_booking::app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
