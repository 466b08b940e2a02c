//! Report Generator - Main Entry Point
//! JSON-RPC server + single report processor over one SQLite store

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use reportgen_api_rpc::{RpcServer, RpcServerConfig};
use reportgen_core::application::{shutdown_channel, BackoffPolicy, ReportProcessor, ReportService};
use reportgen_core::domain::JobStatus;
use reportgen_core::port::id_provider::UuidProvider;
use reportgen_core::port::time_provider::SystemTimeProvider;
use reportgen_core::port::{BroadcastNotifier, JobStore, SimulatedRenderer};
use reportgen_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

const LOG_FILE_PREFIX: &str = "report-generator.log";

/// Library crates log under `reportgen_*`, this binary under `report_generator`
const DEFAULT_LOG_FILTER: &str = "reportgen=info,report_generator=info";

/// Extra time granted to the processor after the shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging; the guard flushes the file writer on drop
    let _log_guard = init_logging(&config)?;

    info!("Report Generator v{} starting...", reportgen_core::VERSION);

    // 3. Initialize database
    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteJobStore::new(pool.clone()));
    let notifier = BroadcastNotifier::new(config.notify_capacity);

    let service = Arc::new(ReportService::new(
        store.clone(),
        Arc::new(notifier.clone()),
        Arc::new(UuidProvider),
        time_provider.clone(),
    ));

    // 5. Jobs left PROCESSING by a previous run are not requeued
    match store.count_by_status(JobStatus::Processing).await {
        Ok(0) => {}
        Ok(stuck) => warn!(
            stuck_jobs = stuck,
            "Jobs left PROCESSING by a previous run will not be resumed"
        ),
        Err(e) => warn!(error = %e, "Failed to count PROCESSING jobs"),
    }

    // 6. Start JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, service, notifier.clone())
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 7. Start the processor
    info!(
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        work_duration_ms = config.work_duration.as_millis() as u64,
        "Starting report processor..."
    );
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let processor = ReportProcessor::new(
        store,
        Arc::new(notifier),
        Arc::new(SimulatedRenderer::new(config.work_duration)),
        time_provider,
        BackoffPolicy::new(config.poll_interval, config.error_backoff),
    );

    let processor_handle = tokio::spawn(async move {
        if let Err(e) = processor.run(shutdown_rx).await {
            error!(error = ?e, "Report processor failed");
        }
    });

    info!(addr = %rpc_addr, "System ready. Waiting for report requests...");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if tokio::time::timeout(SHUTDOWN_GRACE, processor_handle)
        .await
        .is_err()
    {
        warn!("Report processor did not stop within the grace period");
    }

    pool.close().await;
    telemetry::shutdown();

    info!("Shutdown complete.");

    Ok(())
}

fn init_logging(config: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let otel = telemetry::otel_layer()?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(otel)
        .with(env_filter)
        .with(file_layer);

    match config.log_format {
        // Production: JSON structured logging
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{debug, Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_default_filter_keeps_daemon_and_library_logs() {
        let seen = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap())
            .with(CountingLayer(seen.clone()));

        tracing::subscriber::with_default(subscriber, || {
            // Events from this module carry the binary's own target
            assert!(module_path!().starts_with("report_generator"));
            warn!(stuck_jobs = 1, "Jobs left PROCESSING by a previous run will not be resumed");
            info!(target: "reportgen_core::application::processor", "Report processor started");
            debug!("Filtered out at the default level");
            debug!(target: "sqlx::query", "Filtered out as a foreign crate");
        });

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
