// Report Job Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::{DomainError, Result};

/// Job ID (UUID v4)
pub type JobId = String;

/// Job status. Advances strictly `Pending -> Processing -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
        }
    }

    /// Whether `self -> next` is a legal single step of the state machine
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(JobStatus::Pending),
            "PROCESSING" => Ok(JobStatus::Processing),
            "COMPLETED" => Ok(JobStatus::Completed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Report type (what to generate)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportType(String);

impl ReportType {
    /// Fails on an empty name; any other content is accepted as-is
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(DomainError::ValidationError(
                "report_type is required".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReportType {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<ReportType> for String {
    fn from(report_type: ReportType) -> Self {
        report_type.0
    }
}

/// Report Job Entity
///
/// Everything except the lifecycle fields (`status`, `started_at`,
/// `completed_at`) is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportJob {
    pub id: JobId,
    pub report_type: ReportType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: JobStatus,

    pub created_at: i64, // epoch ms, queue ordering key
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl ReportJob {
    /// Create a new pending job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `report_type` - What to generate
    /// * `start_date` / `end_date` - Reporting window, not cross-validated
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        report_type: ReportType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            report_type,
            start_date,
            end_date,
            status: JobStatus::Pending,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// Create a test job with deterministic ID and timestamp.
    ///
    /// IDs are `test-1`, `test-2`, ...; timestamps start at 1000 and
    /// increment by 1000. Production code injects ID and time via providers.
    pub fn new_test(report_type: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let created_at = (counter * 1000) as i64;
        let window_start = DateTime::<Utc>::UNIX_EPOCH;

        Self::new(
            format!("test-{}", counter),
            created_at,
            ReportType(report_type.to_string()),
            window_start,
            window_start,
        )
    }

    /// Pending -> Processing, stamping `started_at`
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Processing)?;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Processing -> Completed, stamping `completed_at`
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Completed)?;
        self.completed_at = Some(now_millis);
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = ReportJob::new_test("sales");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut job = ReportJob::new_test("sales");
        job.start(10).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.started_at, Some(10));

        job.complete(20).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_at, Some(20));
        assert!(job.status.is_terminal());
    }

    #[test]
    fn test_cannot_skip_processing() {
        let mut job = ReportJob::new_test("sales");
        let err = job.complete(10).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut job = ReportJob::new_test("sales");
        job.start(1).unwrap();
        job.complete(2).unwrap();

        assert!(job.start(3).is_err());
        assert!(job.complete(4).is_err());
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.started_at, Some(1));
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut job = ReportJob::new_test("sales");
        job.start(1).unwrap();
        assert!(job.start(2).is_err());
        assert_eq!(job.started_at, Some(1));
    }

    #[test]
    fn test_transition_table() {
        use JobStatus::*;
        for from in JobStatus::ALL {
            for to in JobStatus::ALL {
                let expected = matches!((from, to), (Pending, Processing) | (Processing, Completed));
                assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_status_string_form() {
        for status in JobStatus::ALL {
            assert_eq!(status.to_string().parse::<JobStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<JobStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
    }

    #[test]
    fn test_report_type_rejects_empty() {
        assert!(ReportType::parse("").is_err());
        assert_eq!(ReportType::parse(" ").unwrap().as_str(), " ");
        assert_eq!(ReportType::parse("sales").unwrap().as_str(), "sales");
    }

    #[test]
    fn test_deserialized_job_keeps_report_type_check() {
        let mut value = serde_json::to_value(ReportJob::new_test("sales")).unwrap();
        assert_eq!(value["report_type"], "sales");

        let roundtrip: ReportJob = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(roundtrip.report_type.as_str(), "sales");

        value["report_type"] = serde_json::json!("");
        let err = serde_json::from_value::<ReportJob>(value).unwrap_err();
        assert!(err.to_string().contains("report_type is required"));
    }
}
