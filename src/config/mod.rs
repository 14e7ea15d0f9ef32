//! Configuration module for the event listing backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload limit of 5 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the live event store file
    pub store_path: PathBuf,
    /// Path to the seed file copied in on first run
    pub seed_path: PathBuf,
    /// Directory uploaded images are written to and served from
    pub uploads_dir: PathBuf,
    /// Largest accepted image upload in bytes
    pub max_upload_bytes: usize,
    /// Forecast endpoint of the weather provider
    pub weather_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let store_path = env::var("EVENTS_STORE_PATH")
            .unwrap_or_else(|_| "./data/all_events.json".to_string())
            .into();

        let seed_path = env::var("EVENTS_SEED_PATH")
            .unwrap_or_else(|_| "./data/events.json".to_string())
            .into();

        let uploads_dir = env::var("EVENTS_UPLOADS_DIR")
            .unwrap_or_else(|_| "./public/uploads".to_string())
            .into();

        let max_upload_bytes = env::var("EVENTS_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let weather_url = env::var("EVENTS_WEATHER_URL")
            .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());

        let bind_addr = env::var("EVENTS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid EVENTS_BIND_ADDR format");

        let log_level = env::var("EVENTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("EVENTS_LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Pretty);

        Self {
            store_path,
            seed_path,
            uploads_dir,
            max_upload_bytes,
            weather_url,
            bind_addr,
            log_level,
            log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("EVENTS_STORE_PATH");
        env::remove_var("EVENTS_SEED_PATH");
        env::remove_var("EVENTS_UPLOADS_DIR");
        env::remove_var("EVENTS_MAX_UPLOAD_BYTES");
        env::remove_var("EVENTS_WEATHER_URL");
        env::remove_var("EVENTS_BIND_ADDR");
        env::remove_var("EVENTS_LOG_LEVEL");
        env::remove_var("EVENTS_LOG_FORMAT");

        let config = Config::from_env();

        assert_eq!(config.store_path, PathBuf::from("./data/all_events.json"));
        assert_eq!(config.seed_path, PathBuf::from("./data/events.json"));
        assert_eq!(config.uploads_dir, PathBuf::from("./public/uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.weather_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }
}
