use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use events_server::config::{Config, ConfigError};
use events_server::routes::{create_routes, AppState};
use events_server::services::EventService;
use events_server::storage::{AdapterError, EventStore, PgEventStore};
use events_server::utils::deadline::Deadline;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to open database pool: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database ping failed: {0}")]
    Ping(#[from] AdapterError),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("events_server=info,tower_http=info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    // Connections are opened on first use; the ping below proves connectivity
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.database_timeout)
        .idle_timeout(POOL_IDLE_TIMEOUT)
        .connect_lazy(&config.database_url)?;

    let store = PgEventStore::new(pool);
    store.ping(Deadline::after(config.ping_timeout)).await?;

    tracing::info!("Successfully connected to database");

    if config.run_migrations {
        sqlx::migrate!().run(store.pool()).await?;
        tracing::info!("Migrations run successfully");
    }

    let events = EventService::new(Arc::new(store), config.database_timeout);
    let app: Router = create_routes(AppState::new(events), &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
