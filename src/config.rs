//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the JSON-lines file inside `log_dir`
pub const LOG_FILE_NAME: &str = "predictions.jsonl";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. `None` selects the file sink.
    pub database_url: Option<String>,

    /// Server port
    pub port: u16,

    /// Path to the exported ONNX model
    pub model_path: PathBuf,

    /// Directory holding the prediction log file
    pub log_dir: PathBuf,

    /// Connection pool size for the relational sink
    pub db_max_connections: u32,

    /// How long startup waits for the first database connection
    pub db_connect_timeout: Duration,

    /// Emit logs as JSON instead of human-readable text
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8000,
            model_path: PathBuf::from("results/lightgbm_optimized.onnx"),
            log_dir: PathBuf::from("logs"),
            db_max_connections: 5,
            db_connect_timeout: Duration::from_secs(5),
            log_json: false,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.db_max_connections),

            db_connect_timeout: env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.db_connect_timeout),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Full path of the JSON-lines prediction log
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    /// Database URL with credentials stripped, for logging
    pub fn redacted_database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(|url| url.rsplit('@').next().unwrap_or("***"))
    }
}
