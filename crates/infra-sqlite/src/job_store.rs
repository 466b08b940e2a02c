// SQLite JobStore Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reportgen_core::domain::{JobId, JobStatus, ReportJob, ReportType};
use reportgen_core::error::{AppError, Result};
use reportgen_core::port::JobStore;
use sqlx::SqlitePool;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Storage(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "275" => AppError::Storage(format!(
                        "Check constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Storage(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Storage(format!("Database full: {}", db_err.message())),
                    _ => AppError::Storage(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Storage(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Storage("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Storage(format!("Column not found: {}", col)),
        // Connection, pool, protocol errors
        _ => AppError::Storage(err.to_string()),
    }
}

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: &ReportJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO report_jobs (
                id, report_type, start_date, end_date,
                status, created_at, started_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(job.report_type.as_str())
        .bind(job.start_date.timestamp_millis())
        .bind(job.end_date.timestamp_millis())
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_oldest_pending(&self) -> Result<Option<ReportJob>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM report_jobs
            WHERE status = ?
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(JobStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn update(&self, job: &ReportJob) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE report_jobs
            SET report_type = ?, start_date = ?, end_date = ?,
                status = ?, created_at = ?, started_at = ?, completed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(job.report_type.as_str())
        .bind(job.start_date.timestamp_millis())
        .bind(job.end_date.timestamp_millis())
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(&job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", job.id)));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ReportJob>> {
        let rows: Vec<JobRow> =
            sqlx::query_as("SELECT * FROM report_jobs ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<ReportJob>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM report_jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM report_jobs WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    report_type: String,
    start_date: i64, // epoch ms
    end_date: i64,   // epoch ms
    status: String,
    created_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<ReportJob> {
        let status: JobStatus = self.status.parse()?;
        let report_type = ReportType::parse(self.report_type)?;

        Ok(ReportJob {
            start_date: millis_to_utc(&self.id, self.start_date)?,
            end_date: millis_to_utc(&self.id, self.end_date)?,
            id: self.id,
            report_type,
            status,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

fn millis_to_utc(id: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        AppError::Storage(format!("Job {} has out-of-range timestamp {}", id, millis))
    })
}
