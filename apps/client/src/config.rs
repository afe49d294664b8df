use std::time::Duration;

use anyhow::{Context, Result};

use crate::workflow::pipeline::{PipelineTiming, DEFAULT_SETTLE, DEFAULT_TICK};

/// `APPLYEDGE_DB_URL` value that keeps saved jobs in memory only.
pub const EPHEMERAL_DB_URL: &str = "memory";

/// Client configuration loaded from environment variables.
/// Every variable has a default; malformed numbers are startup errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub database_url: String,
    pub progress_tick: Duration,
    pub settle_delay: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: env_or("APPLYEDGE_API_URL", "http://localhost:8000"),
            database_url: env_or("APPLYEDGE_DB_URL", "sqlite://applyedge.db"),
            progress_tick: millis_env("APPLYEDGE_PROGRESS_TICK_MS", DEFAULT_TICK)?,
            settle_delay: millis_env("APPLYEDGE_SETTLE_MS", DEFAULT_SETTLE)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn timing(&self) -> PipelineTiming {
        PipelineTiming {
            tick: self.progress_tick,
            settle: self.settle_delay,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.database_url == EPHEMERAL_DB_URL
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn millis_env(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{key} must be a whole number of milliseconds, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
