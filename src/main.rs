use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use station_telemetry_service::config::Settings;
use station_telemetry_service::postgres::PostgresPool;
use station_telemetry_service::server::{create_app, AppState};
use station_telemetry_service::shutdown::{GracefulShutdown, ShutdownConfig};
use station_telemetry_service::station::create_station_store;
use station_telemetry_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    // Only connect to PostgreSQL when the station store needs it
    let pg_pool = if settings.stations.backend == "postgres" {
        let pool = PostgresPool::new(&settings.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Some(pool)
    } else {
        None
    };

    let stations = create_station_store(&settings.stations, pg_pool.as_ref())
        .await
        .context("Failed to initialize station store")?;

    // Create application state
    let state = AppState::new(settings.clone(), stations);
    tracing::info!("Application state initialized");

    let shutdown = GracefulShutdown::with_config(
        state.registry.clone(),
        state.shutdown.clone(),
        ShutdownConfig::from_streaming(&settings.streaming),
    );
    let registry = state.registry.clone();

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown))
        .await?;

    if !registry.is_empty() {
        tracing::warn!(
            remaining = registry.len(),
            "Connections still registered after shutdown"
        );
    }

    if let Some(pool) = pg_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown: GracefulShutdown) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            "ctrl_c"
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
            "sigterm"
        }
    };

    // Sessions must finish before axum waits on their upgraded connections
    shutdown.execute(reason).await;
}
