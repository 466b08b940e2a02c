//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reportgen_core::application::processor::constants::{
    DEFAULT_NOTIFY_CAPACITY, ERROR_BACKOFF, IDLE_POLL_INTERVAL, SIMULATED_WORK_DURATION,
};

const DEFAULT_DB_PATH: &str = "~/.reportgen/reports.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub work_duration: Duration,
    pub notify_capacity: usize,
    pub log_format: LogFormat,
    /// Extra JSON log file (daily rotation) when set
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("REPORTGEN_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = shellexpand::tilde(&db_path).into_owned();

        let log_format = match lookup("REPORTGEN_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            db_path,
            rpc_host: lookup("REPORTGEN_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&lookup, "REPORTGEN_RPC_PORT", DEFAULT_RPC_PORT)?,
            poll_interval: millis_or(&lookup, "REPORTGEN_POLL_INTERVAL_MS", IDLE_POLL_INTERVAL)?,
            error_backoff: millis_or(&lookup, "REPORTGEN_ERROR_BACKOFF_MS", ERROR_BACKOFF)?,
            work_duration: millis_or(&lookup, "REPORTGEN_WORK_DURATION_MS", SIMULATED_WORK_DURATION)?,
            notify_capacity: parse_or(&lookup, "REPORTGEN_NOTIFY_CAPACITY", DEFAULT_NOTIFY_CAPACITY)?,
            log_format,
            log_dir: lookup("REPORTGEN_LOG_DIR")
                .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration> {
    let default_ms = default.as_millis() as u64;
    parse_or(lookup, key, default_ms).map(Duration::from_millis)
}
