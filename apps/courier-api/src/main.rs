//! Courier API - HTTP entry point for the email delivery service.

use core_config::tracing::{init_tracing, install_color_eyre};
use mailer::EmailService;
use mailer::delivery_log::InMemoryDeliveryLog;
use mailer::token::{MemoryTokenStore, RedisTokenStore, TokenStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

mod api;
mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    // Shared token cache: Redis when configured, in-process otherwise
    let store: Arc<dyn TokenStore> = match &config.redis {
        Some(redis_config) => {
            info!("Connecting to Redis at {}", redis_config.uri);
            let client = redis::Client::open(redis_config.uri.as_str())?;
            let conn = redis::aio::ConnectionManager::new(client).await?;
            info!("Redis connected successfully");
            Arc::new(RedisTokenStore::new(conn))
        }
        None => {
            tracing::warn!("REDIS_HOST not set, using the in-process token cache");
            Arc::new(MemoryTokenStore::new())
        }
    };

    let provider = mailer::config::provider_from_env(store)
        .map_err(|e| eyre::eyre!("Failed to configure email provider: {}", e))?;
    info!("Email provider configured: {}", provider.name());

    let service = EmailService::new(provider, Arc::new(InMemoryDeliveryLog::new()));

    let state = AppState {
        config: config.clone(),
        service,
    };

    let app = api::router(state).layer(TraceLayer::new_for_http());

    let address = config.server.address();
    info!("Starting courier API on {}", address);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
