//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to `ReportService` calls.

use crate::error::to_rpc_error;
use crate::types::{CreateReportRequest, GetReportRequest, StatsResponse};
use jsonrpsee::types::ErrorObjectOwned;
use reportgen_core::application::ReportService;
use reportgen_core::domain::ReportJob;
use reportgen_core::port::BroadcastNotifier;
use std::sync::Arc;
use tracing::warn;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<ReportService>,
    notifier: BroadcastNotifier,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(service: Arc<ReportService>, notifier: BroadcastNotifier) -> Self {
        Self {
            service,
            notifier,
            start_time: std::time::Instant::now(),
        }
    }

    /// reports.create.v1
    pub async fn create(&self, params: CreateReportRequest) -> Result<ReportJob, ErrorObjectOwned> {
        self.service.submit(params.into()).await.map_err(|e| {
            if !e.is_client_error() {
                warn!(error = %e, "Report submission failed");
            }
            to_rpc_error(e)
        })
    }

    /// reports.list.v1
    pub async fn list(&self) -> Result<Vec<ReportJob>, ErrorObjectOwned> {
        self.service.list().await.map_err(to_rpc_error)
    }

    /// reports.get.v1
    pub async fn get(&self, params: GetReportRequest) -> Result<ReportJob, ErrorObjectOwned> {
        self.service.get(&params.job_id).await.map_err(to_rpc_error)
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        let stats = self.service.stats().await.map_err(to_rpc_error)?;

        Ok(StatsResponse {
            total_jobs: stats.total,
            pending_jobs: stats.pending,
            processing_jobs: stats.processing,
            completed_jobs: stats.completed,
            observers: self.notifier.observer_count(),
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use reportgen_core::domain::JobStatus;
    use reportgen_core::port::id_provider::UuidProvider;
    use reportgen_core::port::job_store::mocks::InMemoryJobStore;
    use reportgen_core::port::time_provider::SystemTimeProvider;
    use serde_json::json;

    fn handler() -> (RpcHandler, BroadcastNotifier) {
        let notifier = BroadcastNotifier::new(16);
        let service = Arc::new(ReportService::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(notifier.clone()),
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
        ));
        (RpcHandler::new(service, notifier.clone()), notifier)
    }

    fn create_params(report_type: &str) -> CreateReportRequest {
        serde_json::from_value(json!({
            "report_type": report_type,
            "start_date": "2024-01-01",
            "end_date": "2024-01-31",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_broadcasts_pending_snapshot() {
        let (handler, notifier) = handler();
        let mut rx = notifier.subscribe();

        let job = handler.create(create_params("sales")).await.unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(rx.recv().await.unwrap(), job);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_report_type() {
        let (handler, notifier) = handler();
        let mut rx = notifier.subscribe();

        let err = handler.create(create_params("")).await.unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert!(handler.list().await.unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_get_unknown_job() {
        let (handler, _) = handler();
        let err = handler
            .get(GetReportRequest {
                job_id: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_reports_observers() {
        let (handler, notifier) = handler();
        let _observer = notifier.subscribe();
        handler.create(create_params("sales")).await.unwrap();

        let stats = handler.stats().await.unwrap();
        assert_eq!(stats.total_jobs, 1);
        assert_eq!(stats.pending_jobs, 1);
        assert_eq!(stats.observers, 1);
    }
}
