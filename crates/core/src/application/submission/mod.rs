// Report Service - submission and read-side use cases

pub mod submit;

pub use submit::SubmitReportRequest;

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{JobId, JobStatus, ReportJob};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobStore, Notifier, TimeProvider};

/// Job counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
}

/// Report Service
pub struct ReportService {
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            notifier,
            id_provider,
            time_provider,
        }
    }

    /// Submit a new report job
    pub async fn submit(&self, req: SubmitReportRequest) -> Result<ReportJob> {
        submit::execute(
            self.store.as_ref(),
            self.notifier.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// All jobs, newest first
    pub async fn list(&self) -> Result<Vec<ReportJob>> {
        self.store.list_all().await
    }

    pub async fn get(&self, id: &JobId) -> Result<ReportJob> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    pub async fn stats(&self) -> Result<JobStats> {
        let mut stats = JobStats::default();
        for status in JobStatus::ALL {
            let count = self.store.count_by_status(status).await?;
            match status {
                JobStatus::Pending => stats.pending = count,
                JobStatus::Processing => stats.processing = count,
                JobStatus::Completed => stats.completed = count,
            }
            stats.total += count;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::notifier::mocks::RecordingNotifier;
    use crate::port::time_provider::mocks::SteppingTimeProvider;

    fn service(store: Arc<InMemoryJobStore>) -> ReportService {
        ReportService::new(
            store,
            Arc::new(RecordingNotifier::new()),
            Arc::new(SequentialIdProvider::new("job")),
            Arc::new(SteppingTimeProvider::new(1_000, 1_000)),
        )
    }

    fn request(report_type: &str) -> SubmitReportRequest {
        SubmitReportRequest {
            report_type: report_type.to_string(),
            start_date: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            end_date: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = Arc::new(InMemoryJobStore::new());
        let service = service(store);

        service.submit(request("a")).await.unwrap();
        service.submit(request("b")).await.unwrap();
        service.submit(request("c")).await.unwrap();

        let listed: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.report_type.as_str().to_string())
            .collect();
        assert_eq!(listed, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let service = service(Arc::new(InMemoryJobStore::new()));
        let err = service.get(&"missing".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stats_counts_each_status() {
        let store = Arc::new(InMemoryJobStore::new());
        let service = service(store.clone());

        let first = service.submit(request("a")).await.unwrap();
        service.submit(request("b")).await.unwrap();

        let mut processing = first.clone();
        processing.start(5).unwrap();
        store.update(&processing).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(
            stats,
            JobStats {
                total: 2,
                pending: 1,
                processing: 1,
                completed: 0,
            }
        );
    }
}
