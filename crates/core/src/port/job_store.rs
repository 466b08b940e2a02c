// Job Store Port (Interface)

use crate::domain::{JobId, JobStatus, ReportJob};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for report job persistence
///
/// Implementations must provide atomic single-record reads and writes and
/// tolerate concurrent use from the processor and request handlers.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &ReportJob) -> Result<()>;

    /// Oldest PENDING job by `created_at` (ties by `id`), or `None`
    async fn find_oldest_pending(&self) -> Result<Option<ReportJob>>;

    /// Full overwrite of an existing job by ID
    ///
    /// Fails with `AppError::NotFound` if no such job exists.
    async fn update(&self, job: &ReportJob) -> Result<()>;

    /// All jobs, newest first
    async fn list_all(&self) -> Result<Vec<ReportJob>>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>>;

    /// Count jobs by status
    async fn count_by_status(&self, status: JobStatus) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory job store with failure injection.
    ///
    /// Every successful `update` is appended to a write log so tests can
    /// replay the exact sequence of persisted transitions.
    #[derive(Default)]
    pub struct InMemoryJobStore {
        jobs: Mutex<HashMap<JobId, ReportJob>>,
        write_log: Mutex<Vec<(JobId, JobStatus)>>,
        query_count: AtomicUsize,
        fail_queries: AtomicUsize,
        fail_updates: AtomicUsize,
        fail_update_to_completed: AtomicUsize,
        fail_inserts: AtomicBool,
    }

    impl InMemoryJobStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `n` calls to `find_oldest_pending`
        pub fn fail_next_queries(&self, n: usize) {
            self.fail_queries.store(n, Ordering::SeqCst);
        }

        /// Fail the next `n` calls to `update`
        pub fn fail_next_updates(&self, n: usize) {
            self.fail_updates.store(n, Ordering::SeqCst);
        }

        /// Fail the next `n` updates that write a COMPLETED status
        pub fn fail_next_completions(&self, n: usize) {
            self.fail_update_to_completed.store(n, Ordering::SeqCst);
        }

        pub fn fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }

        pub fn query_count(&self) -> usize {
            self.query_count.load(Ordering::SeqCst)
        }

        /// Persisted updates in order (job id, status written)
        pub fn write_log(&self) -> Vec<(JobId, JobStatus)> {
            self.write_log.lock().unwrap().clone()
        }

        pub fn get(&self, id: &str) -> Option<ReportJob> {
            self.jobs.lock().unwrap().get(id).cloned()
        }

        pub fn len(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert(&self, job: &ReportJob) -> Result<()> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(AppError::Storage("injected insert failure".to_string()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.contains_key(&job.id) {
                return Err(AppError::Storage(format!(
                    "Unique constraint violation: {}",
                    job.id
                )));
            }
            jobs.insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn find_oldest_pending(&self) -> Result<Option<ReportJob>> {
            self.query_count.fetch_add(1, Ordering::SeqCst);
            if Self::take_failure(&self.fail_queries) {
                return Err(AppError::Storage("injected query failure".to_string()));
            }
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .values()
                .filter(|j| j.status == JobStatus::Pending)
                .min_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)))
                .cloned())
        }

        async fn update(&self, job: &ReportJob) -> Result<()> {
            if Self::take_failure(&self.fail_updates) {
                return Err(AppError::Storage("injected update failure".to_string()));
            }
            if job.status == JobStatus::Completed
                && Self::take_failure(&self.fail_update_to_completed)
            {
                return Err(AppError::Storage("injected completion failure".to_string()));
            }
            let mut jobs = self.jobs.lock().unwrap();
            match jobs.get_mut(&job.id) {
                Some(slot) => {
                    *slot = job.clone();
                    self.write_log
                        .lock()
                        .unwrap()
                        .push((job.id.clone(), job.status));
                    Ok(())
                }
                None => Err(AppError::NotFound(format!("Job {} not found", job.id))),
            }
        }

        async fn list_all(&self) -> Result<Vec<ReportJob>> {
            let mut all: Vec<ReportJob> = self.jobs.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
            Ok(all)
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>> {
            Ok(self.get(id))
        }

        async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.values().filter(|j| j.status == status).count() as i64)
        }
    }
}
