use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use indicab_api::{app, AppState};
use indicab_core::{Booking, ContactMessage};
use indicab_store::app_config::{Config, StoreBackend};
use indicab_store::DbClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "indicab_api=debug,indicab_core=debug,indicab_store=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Indicab API on port {}", config.server.port);

    let app_state = match config.database.backend {
        StoreBackend::Mongodb => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to MongoDB")?;
            AppState::new(
                Arc::new(db.repository::<Booking>()),
                Arc::new(db.repository::<ContactMessage>()),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            AppState::in_memory()
        }
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
