use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod health;
mod http;
mod metrics;
mod store;

use config::AppConfig;
use domain::order::OrderCommandHandler;
use store::{InMemoryOrderStore, OrderStore, PgOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cafe_orders=debug"))
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(bind_addr = %config.bind_addr, port = config.port, "Starting cafe order service");

    // === 1. Storage backend ===
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            tracing::info!(max_connections = config.db_max_connections, "Connecting to PostgreSQL");
            let pool = store::connect_pool(url, config.db_max_connections).await?;
            store::ensure_schema(&pool).await?;
            Arc::new(PgOrderStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory and lost on restart");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. HTTP server ===
    let orders = web::Data::new(OrderCommandHandler::new(store, metrics));

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(orders.clone())
            .configure(http::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    tracing::info!("Serving on http://{}:{}", config.bind_addr, config.port);
    server
        .bind((config.bind_addr.as_str(), config.port))?
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
