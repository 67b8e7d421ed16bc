use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub port: u16,
    pub database_url: String,
    pub metrics_interval_secs: u64,
    pub sweep_interval_secs: u64,
    pub token_ttl_hours: i64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: "sqlite://./data/sentinel.db".to_string(),
            metrics_interval_secs: 2,
            sweep_interval_secs: 24 * 60 * 60,
            token_ttl_hours: 24,
        }
    }
}

impl WebConfig {
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("SENTINEL_PORT") {
            config.port = port.parse()?;
        }

        // Try SENTINEL_DATABASE_URL first, then DATABASE_URL for convenience
        if let Ok(db_url) = env::var("SENTINEL_DATABASE_URL") {
            config.database_url = db_url;
        } else if let Ok(db_url) = env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(interval) = env::var("SENTINEL_METRICS_INTERVAL") {
            config.metrics_interval_secs = interval.parse()?;
        }

        if let Ok(interval) = env::var("SENTINEL_SWEEP_INTERVAL") {
            config.sweep_interval_secs = interval.parse()?;
        }

        if let Ok(ttl) = env::var("SENTINEL_TOKEN_TTL_HOURS") {
            config.token_ttl_hours = ttl.parse()?;
        }

        Ok(config)
    }
}
