//! Report Generator CLI - Command-line client for the report daemon

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "reportgen")]
#[command(about = "Report Generator CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "REPORTGEN_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new report job
    Submit {
        /// Report type (e.g., sales, inventory)
        #[arg(short, long)]
        report_type: String,

        /// First day of the report window (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Last day of the report window (YYYY-MM-DD)
        #[arg(short, long)]
        end: NaiveDate,
    },

    /// List all report jobs, newest first
    List,

    /// Show a single report job
    Get {
        /// Job ID
        job_id: String,
    },

    /// Show system status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Wire shape of a report job as returned by the daemon
#[derive(Deserialize)]
struct ReportJob {
    id: String,
    report_type: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
    created_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
}

#[derive(Tabled)]
struct JobRow {
    job_id: String,
    report_type: String,
    status: String,
    window: String,
    created: String,
    completed: String,
}

impl From<&ReportJob> for JobRow {
    fn from(job: &ReportJob) -> Self {
        Self {
            job_id: job.id.clone(),
            report_type: job.report_type.clone(),
            status: job.status.clone(),
            window: format_window(job.start_date, job.end_date),
            created: format_millis(Some(job.created_at)),
            completed: format_millis(job.completed_at),
        }
    }
}

fn format_window(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("{} .. {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

fn format_millis(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn colored_status(status: &str) -> String {
    match status {
        "PENDING" => status.yellow().to_string(),
        "PROCESSING" => status.cyan().to_string(),
        "COMPLETED" => status.green().to_string(),
        other => other.to_string(),
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            report_type,
            start,
            end,
        } => {
            let params = json!({
                "report_type": report_type,
                "start_date": start.format("%Y-%m-%d").to_string(),
                "end_date": end.format("%Y-%m-%d").to_string(),
            });

            let result = call_rpc(&cli.rpc_url, "reports.create.v1", params).await?;
            let job: ReportJob = serde_json::from_value(result)?;

            println!("{}", "✓ Report job submitted".green().bold());
            println!();

            let table = Table::new(vec![JobRow::from(&job)]).to_string();
            println!("{}", table);
        }

        Commands::List => {
            let result = call_rpc(&cli.rpc_url, "reports.list.v1", json!({})).await?;
            let jobs: Vec<ReportJob> = serde_json::from_value(result)?;

            if jobs.is_empty() {
                println!("{}", "No report jobs".yellow());
                return Ok(());
            }

            let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
            println!("{}", Table::new(rows));
            println!("{} job(s)", jobs.len());
        }

        Commands::Get { job_id } => {
            let params = json!({ "job_id": job_id });

            let result = call_rpc(&cli.rpc_url, "reports.get.v1", params).await?;
            let job: ReportJob = serde_json::from_value(result)?;

            println!("{}", format!("Report job {}", job.id).cyan().bold());
            println!();
            println!("  {} {}", "Type:".bold(), job.report_type);
            println!("  {} {}", "Status:".bold(), colored_status(&job.status));
            println!(
                "  {} {}",
                "Window:".bold(),
                format_window(job.start_date, job.end_date)
            );
            println!("  {} {}", "Created:".bold(), format_millis(Some(job.created_at)));
            println!("  {} {}", "Started:".bold(), format_millis(job.started_at));
            println!("  {} {}", "Completed:".bold(), format_millis(job.completed_at));
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Total Jobs:".bold(), stats["total_jobs"]);
                    println!("  {} {}", "Pending:".bold(), stats["pending_jobs"]);
                    println!("  {} {}", "Processing:".bold(), stats["processing_jobs"]);
                    println!("  {} {}", "Completed:".bold(), stats["completed_jobs"]);
                    println!();
                    println!("  {} {}", "Observers:".bold(), stats["observers"]);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_row_from_wire_json() {
        let job: ReportJob = serde_json::from_value(json!({
            "id": "abc",
            "report_type": "sales",
            "start_date": "2024-01-01T00:00:00Z",
            "end_date": "2024-01-31T00:00:00Z",
            "status": "PENDING",
            "created_at": 0,
            "started_at": null,
            "completed_at": null,
        }))
        .unwrap();

        let row = JobRow::from(&job);
        assert_eq!(row.window, "2024-01-01 .. 2024-01-31");
        assert_eq!(row.created, "1970-01-01 00:00:00");
        assert_eq!(row.completed, "-");
    }

    #[test]
    fn test_submit_parses_calendar_dates() {
        let cli = Cli::try_parse_from([
            "reportgen",
            "submit",
            "--report-type",
            "sales",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
        ])
        .unwrap();

        match cli.command {
            Commands::Submit { start, end, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
            }
            _ => panic!("expected submit"),
        }
    }
}
