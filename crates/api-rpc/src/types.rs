//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use chrono::{DateTime, Utc};
use reportgen_core::application::SubmitReportRequest;
use serde::{Deserialize, Serialize};

/// reports.create.v1 - Submit a report job
///
/// Dates accept RFC 3339 (`2024-01-01T00:00:00Z`) or a bare calendar date
/// (`2024-01-01`, read as midnight UTC).
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    #[serde(default)]
    pub report_type: String,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub end_date: DateTime<Utc>,
}

impl From<CreateReportRequest> for SubmitReportRequest {
    fn from(req: CreateReportRequest) -> Self {
        SubmitReportRequest {
            report_type: req.report_type,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// reports.get.v1 - Fetch a single job
#[derive(Debug, Deserialize)]
pub struct GetReportRequest {
    pub job_id: String,
}

/// admin.stats.v1 - Get system statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_jobs: i64,
    pub pending_jobs: i64,
    pub processing_jobs: i64,
    pub completed_jobs: i64,
    pub observers: usize,
    pub uptime_seconds: i64,
}

mod flexible_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            de::Error::custom(format!(
                "invalid date '{}': expected RFC 3339 or YYYY-MM-DD",
                raw
            ))
        })
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_create_request_accepts_calendar_dates() {
        let req: CreateReportRequest = serde_json::from_value(json!({
            "report_type": "sales",
            "start_date": "2024-01-01",
            "end_date": "2024-01-31T12:30:00+02:00",
        }))
        .unwrap();

        assert_eq!(req.start_date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(req.end_date, Utc.with_ymd_and_hms(2024, 1, 31, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_missing_report_type_defaults_to_empty() {
        let req: CreateReportRequest = serde_json::from_value(json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-31",
        }))
        .unwrap();
        assert!(req.report_type.is_empty());
    }

    #[test]
    fn test_garbage_date_is_rejected() {
        let result: Result<CreateReportRequest, _> = serde_json::from_value(json!({
            "report_type": "sales",
            "start_date": "last tuesday",
            "end_date": "2024-01-31",
        }));
        assert!(result.unwrap_err().to_string().contains("invalid date"));
    }
}
