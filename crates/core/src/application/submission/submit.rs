// Submit Report Use Case

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::notify;
use crate::domain::{ReportJob, ReportType};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobStore, Notifier, TimeProvider};

/// Submit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReportRequest {
    pub report_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Only `report_type` is checked; an inverted date window is accepted.
pub fn validate_request(req: &SubmitReportRequest) -> Result<ReportType> {
    ReportType::parse(req.report_type.as_str()).map_err(|e| match e {
        crate::domain::DomainError::ValidationError(msg) => AppError::Validation(msg),
        other => AppError::Domain(other),
    })
}

/// Execute submit use case
///
/// Exactly one durable write per successful call; the broadcast happens only
/// after the write is confirmed and its failure never fails the call.
///
/// # Arguments
///
/// * `store` - Job store
/// * `notifier` - Observer fan-out
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Submit request
pub async fn execute(
    store: &dyn JobStore,
    notifier: &dyn Notifier,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: SubmitReportRequest,
) -> Result<ReportJob> {
    let report_type = validate_request(&req)?;

    let job = ReportJob::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        report_type,
        req.start_date,
        req.end_date,
    );

    store.insert(&job).await?;

    info!(
        job_id = %job.id,
        report_type = job.report_type.as_str(),
        "Report job submitted"
    );
    notify(notifier, &job);

    Ok(job)
}
