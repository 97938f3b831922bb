use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatch::MAX_WORKERS;
use crate::error::{PipelineError, Result};

pub const DATABASE_URL_VAR: &str = "LOTTERYSTAT_DATABASE_URL";
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const WORKERS_VAR: &str = "LOTTERYSTAT_WORKERS";

/// Settings shared by every pipeline entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub workers: usize,
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://lotterystat.db".to_string(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKERS))
                .unwrap_or(4),
            channel_capacity: 256,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. `LOTTERYSTAT_DATABASE_URL` takes precedence over `DATABASE_URL`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_VAR).or_else(|| lookup(FALLBACK_DATABASE_URL_VAR)) {
            self.database_url = url;
        }
        if let Some(workers) = lookup(WORKERS_VAR) {
            self.workers = workers.trim().parse().map_err(|_| {
                PipelineError::Config(format!("{WORKERS_VAR} must be a positive integer, got '{workers}'"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(PipelineError::Config("database_url must not be empty".into()));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(PipelineError::Config(format!(
                "workers must be between 1 and {MAX_WORKERS}, got {}",
                self.workers
            )));
        }
        if self.channel_capacity == 0 {
            return Err(PipelineError::Config(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
