use std::time::Duration;

use secmaster_market_data::DEFAULT_MAX_WORKERS;

const DEFAULT_DB_PATH: &str = "./data/secmaster.db";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub struct Config {
    pub db_path: String,
    pub max_workers: usize,
    pub request_timeout: Duration,
    pub log_format: String,
    /// Variables that failed to parse and fell back to their default.
    /// Logged once tracing is up.
    pub fallbacks: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut fallbacks = Vec::new();
        let mut number = |key: &str, default: u64| -> u64 {
            match lookup(key) {
                None => default,
                Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                    fallbacks.push(format!("{}={:?} is not a number, using {}", key, raw, default));
                    default
                }),
            }
        };

        let max_workers = number("SECMASTER_MAX_WORKERS", DEFAULT_MAX_WORKERS as u64) as usize;
        let timeout_secs = number("SECMASTER_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);

        let db_path = lookup("SECMASTER_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());
        let log_format = lookup("SECMASTER_LOG_FORMAT").unwrap_or_else(|| "text".into());

        Self {
            db_path,
            max_workers,
            request_timeout: Duration::from_secs(timeout_secs),
            log_format,
            fallbacks,
        }
    }
}
