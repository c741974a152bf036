//! Post-Harvest Risk Platform - Backend Server
//!
//! Stores harvest batches offline-first and watches them for spoilage risk
//! against the weather forecast.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use postharvest_backend::{
    config::Config,
    create_app,
    external::SimulatedSmsGateway,
    services::{
        AdvisoryService, BatchStore, ForecastFeed, NetworkMonitor, NotificationService,
        OfflineQueue, RemoteBatchStore, RiskMonitor, SyncCoordinator,
    },
    storage::{FileStore, InMemoryBatchStore, PgBatchStore},
    AppState,
};
use shared::Language;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "phr_server=debug,postharvest_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Post-Harvest Risk Server");
    tracing::info!("Environment: {}", config.environment);

    let remote: Arc<dyn RemoteBatchStore> = match &config.database.url {
        Some(url) => {
            // Lazy pool: the server starts even when the database is unreachable
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_millis(config.sync.remote_timeout_ms))
                .connect_lazy(url)?;
            tracing::info!("Database pool created");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                match sqlx::migrate!("./migrations").run(&db_pool).await {
                    Ok(()) => tracing::info!("Migrations completed"),
                    Err(e) => tracing::warn!(error = %e, "Migrations skipped, database unreachable"),
                }
            }
            Arc::new(PgBatchStore::new(db_pool))
        }
        None => {
            tracing::warn!("No database configured, batches are kept in memory");
            Arc::new(InMemoryBatchStore::new())
        }
    };

    let kv = Arc::new(FileStore::open(&config.queue.path).await?);
    let queue = Arc::new(OfflineQueue::new(kv, config.queue.key.clone()));
    let batches = Arc::new(BatchStore::with_remote_timeout(
        remote,
        queue.clone(),
        config.sync.user_id,
        Duration::from_millis(config.sync.remote_timeout_ms),
    ));
    batches.refresh().await;

    let network = Arc::new(NetworkMonitor::new(config.sync.start_online));
    let coordinator = Arc::new(SyncCoordinator::new(
        batches.clone(),
        queue,
        network.clone(),
    ));
    coordinator.start().await;

    let notifications = if config.notification.sms_enabled {
        NotificationService::new(
            Arc::new(SimulatedSmsGateway::new()),
            config.notification.phone_number.clone(),
        )
    } else {
        NotificationService::disabled()
    };
    let advisory = AdvisoryService::new(notifications)
        .with_language(Language::from_code(&config.notification.language));
    let forecast = Arc::new(ForecastFeed::new());

    let monitor = RiskMonitor::new(advisory.clone()).spawn(batches.subscribe(), forecast.subscribe());

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        batches,
        coordinator: coordinator.clone(),
        network,
        forecast,
        advisory,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    coordinator.shutdown().await;
    monitor.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
