// Application Layer - Use Cases and Business Logic

pub mod processor;
pub mod submission;

// Re-exports
pub use processor::{
    shutdown_channel, BackoffPolicy, IterationOutcome, ReportProcessor, ShutdownSender,
    ShutdownToken,
};
pub use submission::{JobStats, ReportService, SubmitReportRequest};

use crate::domain::ReportJob;
use crate::port::Notifier;
use tracing::warn;

/// Broadcast a snapshot; failures are logged and swallowed.
pub(crate) fn notify(notifier: &dyn Notifier, job: &ReportJob) {
    if let Err(e) = notifier.broadcast(job) {
        warn!(
            job_id = %job.id,
            status = %job.status,
            error = %e,
            "Failed to broadcast job update"
        );
    }
}
