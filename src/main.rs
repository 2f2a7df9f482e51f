//! Fastenkart - storefront service for industrial fasteners.

use anyhow::Result;
use fastenkart::api::{self, AppState};
use fastenkart::events::EventPublisher;
use fastenkart::store::PgStore;
use fastenkart::AppConfig;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unreachable, domain events disabled");
                None
            }
        },
        None => None,
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        config: Arc::new(config),
        events: EventPublisher::new(nats),
    };

    let app = api::router(state);
    tracing::info!("fastenkart listening on {}", bind_addr);
    axum::serve(tokio::net::TcpListener::bind(&bind_addr).await?, app).await?;
    Ok(())
}
