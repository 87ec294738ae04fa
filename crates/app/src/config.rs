use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shopsearch_infra::search::DEFAULT_FUZZY_THRESHOLD;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub catalog_seed: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub fuzzy_threshold: f64,
    pub response_suggestions: usize,
    pub admin_token_secret: Option<String>,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("SHOPSEARCH_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = read_optional_string("SHOPSEARCH_DATABASE_URL");
        let db_max_connections = read_number("SHOPSEARCH_DB_MAX_CONNECTIONS", 5)?;
        let db_acquire_timeout_secs = read_number("SHOPSEARCH_DB_ACQUIRE_TIMEOUT_SECS", 5)?;
        let catalog_seed = read_optional_string("SHOPSEARCH_CATALOG_SEED").map(PathBuf::from);
        let refresh_interval_secs = read_number("SHOPSEARCH_REFRESH_INTERVAL_SECS", 0)?;
        let fuzzy_threshold = parse_threshold(&read_string(
            "SHOPSEARCH_FUZZY_THRESHOLD",
            &DEFAULT_FUZZY_THRESHOLD.to_string(),
        ))?;
        let response_suggestions = read_number("SHOPSEARCH_RESPONSE_SUGGESTIONS", 5)?;
        let admin_token_secret = read_optional_string("SHOPSEARCH_ADMIN_TOKEN_SECRET");
        let cors_allow_origins = parse_list(&read_string("SHOPSEARCH_CORS_ALLOW_ORIGINS", ""));

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(db_acquire_timeout_secs),
            catalog_seed,
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            fuzzy_threshold,
            response_suggestions,
            admin_token_secret,
            cors_allow_origins,
        })
    }
}

/// Loads `.env` from the working directory. Variables already present in
/// the environment win.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_number<T: std::str::FromStr + ToString>(
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber("SHOPSEARCH_FUZZY_THRESHOLD", raw.to_string()))?;
    if value <= 0.0 || value >= 1.0 {
        return Err(ConfigError::InvalidValue(
            "SHOPSEARCH_FUZZY_THRESHOLD",
            raw.to_string(),
        ));
    }
    Ok(value)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|quote| value.strip_prefix(*quote)?.strip_suffix(*quote))
        .unwrap_or(value);
    Some((key.to_string(), value.to_string()))
}
