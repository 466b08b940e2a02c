//! Shared fixtures for the SQLite-backed end-to-end tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use reportgen_core::application::{
    shutdown_channel, BackoffPolicy, ReportProcessor, ReportService, ShutdownSender,
    SubmitReportRequest,
};
use reportgen_core::domain::{JobStatus, ReportJob};
use reportgen_core::port::id_provider::UuidProvider;
use reportgen_core::port::time_provider::SystemTimeProvider;
use reportgen_core::port::{BroadcastNotifier, IdProvider, JobStore, SimulatedRenderer, TimeProvider};
use reportgen_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const FAST_POLL: Duration = Duration::from_millis(20);

/// Fresh file-backed database path, unique per test and process
pub fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "reportgen-it-{}-{}.db",
        name,
        std::process::id()
    ));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
    path
}

pub async fn open_store(path: &PathBuf) -> (SqlitePool, Arc<SqliteJobStore>) {
    let pool = create_pool(path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let store = Arc::new(SqliteJobStore::new(pool.clone()));
    (pool, store)
}

pub fn service_with(
    store: Arc<dyn JobStore>,
    notifier: &BroadcastNotifier,
    ids: Arc<dyn IdProvider>,
    clock: Arc<dyn TimeProvider>,
) -> Arc<ReportService> {
    Arc::new(ReportService::new(store, Arc::new(notifier.clone()), ids, clock))
}

pub fn service(store: Arc<dyn JobStore>, notifier: &BroadcastNotifier) -> Arc<ReportService> {
    service_with(store, notifier, Arc::new(UuidProvider), Arc::new(SystemTimeProvider))
}

pub fn processor(
    store: Arc<dyn JobStore>,
    notifier: &BroadcastNotifier,
    work: Duration,
) -> ReportProcessor {
    ReportProcessor::new(
        store,
        Arc::new(notifier.clone()),
        Arc::new(SimulatedRenderer::new(work)),
        Arc::new(SystemTimeProvider),
        BackoffPolicy::new(FAST_POLL, FAST_POLL),
    )
}

/// Spawn the processor loop; returns the sender that stops it
pub fn spawn_processor(processor: ReportProcessor) -> (ShutdownSender, JoinHandle<()>) {
    let (tx, token) = shutdown_channel();
    let handle = tokio::spawn(async move {
        processor.run(token).await.unwrap();
    });
    (tx, handle)
}

pub fn request(report_type: &str) -> SubmitReportRequest {
    SubmitReportRequest {
        report_type: report_type.to_string(),
        start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
    }
}

pub async fn next_update(rx: &mut broadcast::Receiver<ReportJob>) -> ReportJob {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a job update")
        .expect("notifier closed")
}

pub async fn wait_for_status(store: &dyn JobStore, id: &str, status: JobStatus) -> ReportJob {
    let id = id.to_string();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(job) = store.find_by_id(&id).await.unwrap() {
                if job.status == status {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for job status")
}
