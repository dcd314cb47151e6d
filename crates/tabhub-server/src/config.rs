use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub storage_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("TABHUB_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("TABHUB_PORT", 5000u16)?;
        let db_path: PathBuf = env::var("TABHUB_DB_PATH")
            .unwrap_or_else(|_| "tabhub.db".into())
            .into();
        let timeout_ms = parse_var("TABHUB_STORAGE_TIMEOUT_MS", 5000u64)?;
        let max_upload_mb = parse_var("TABHUB_MAX_UPLOAD_MB", 20usize)?;

        Ok(Self {
            host,
            port,
            db_path,
            storage_timeout: Duration::from_millis(timeout_ms),
            max_upload_bytes: upload_limit_bytes(max_upload_mb)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn upload_limit_bytes(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .with_context(|| format!("Invalid TABHUB_MAX_UPLOAD_MB: {megabytes} MB does not fit in memory"))
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
