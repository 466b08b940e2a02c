// Notifier Port - fan-out of job snapshots to connected observers

use crate::domain::ReportJob;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Notification errors (never fatal to the operation that triggered them)
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Best-effort broadcast of job snapshots
///
/// `broadcast` is a one-way send: it must not wait for observers, and zero
/// connected observers is not an error.
pub trait Notifier: Send + Sync {
    fn broadcast(&self, job: &ReportJob) -> Result<(), NotificationError>;
}

/// Notifier backed by a `tokio::sync::broadcast` channel.
///
/// Each observer holds its own receiver; an observer that falls more than
/// `capacity` snapshots behind skips the oldest ones.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ReportJob>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> broadcast::Receiver<ReportJob> {
        self.tx.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Notifier for BroadcastNotifier {
    fn broadcast(&self, job: &ReportJob) -> Result<(), NotificationError> {
        // Send only fails when nobody is listening, which is fine.
        match self.tx.send(job.clone()) {
            Ok(observers) => debug!(job_id = %job.id, status = %job.status, observers, "Broadcast job update"),
            Err(_) => debug!(job_id = %job.id, status = %job.status, "No observers for job update"),
        }
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{JobId, JobStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every snapshot it is asked to broadcast
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<ReportJob>>,
        fail_next: AtomicUsize,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `n` broadcasts (nothing is recorded for them)
        pub fn fail_next(&self, n: usize) {
            self.fail_next.store(n, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<ReportJob> {
            self.sent.lock().unwrap().clone()
        }

        /// (job id, status) pairs in broadcast order
        pub fn transitions(&self) -> Vec<(JobId, JobStatus)> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|j| (j.id.clone(), j.status))
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn broadcast(&self, job: &ReportJob) -> Result<(), NotificationError> {
            let failed = self
                .fail_next
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(NotificationError::Delivery("injected failure".to_string()));
            }
            self.sent.lock().unwrap().push(job.clone());
            Ok(())
        }
    }
}
