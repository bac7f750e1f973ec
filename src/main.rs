use std::{net::SocketAddr, sync::Arc};

use gemini_chat_backend::{config::Config, routes, state::AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if config.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; every chat reply will be the fallback message");
    }

    let state = Arc::new(AppState::new(&config));
    let cors = routes::cors_layer(config.frontend_url.as_deref())?;

    let app = routes::create_router()
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        model = %config.model,
        origin = config.frontend_url.as_deref().unwrap_or("*"),
        "Server is running on port {}",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
