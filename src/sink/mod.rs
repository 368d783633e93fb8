//! Persistence Sink - prediction telemetry
//!
//! Exactly one backend is chosen at startup and kept for the life of the
//! process. Writes never fail the caller: errors are logged and dropped.

pub mod file;
pub mod postgres;

pub use file::FileSink;
pub use postgres::PgSink;

use crate::config::Config;
use crate::models::{LogEntry, PredictionLog};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of trying to bring up the relational backend
pub enum SinkInit {
    Connected(PgSink),
    Degraded(String),
}

impl SinkInit {
    /// Single connection attempt; no retries
    pub async fn attempt(config: &Config) -> Self {
        let Some(url) = config.database_url.as_deref() else {
            return SinkInit::Degraded("DATABASE_URL not set".to_string());
        };

        match PgSink::connect(url, config.db_max_connections, config.db_connect_timeout).await {
            Ok(sink) => SinkInit::Connected(sink),
            Err(e) => SinkInit::Degraded(e.to_string()),
        }
    }
}

/// The active telemetry backend
pub enum PredictionSink {
    Postgres(PgSink),
    File(FileSink),
}

impl PredictionSink {
    /// Pick the backend for this process, falling back to the log file
    pub async fn init(config: &Config) -> Self {
        match SinkInit::attempt(config).await {
            SinkInit::Connected(sink) => {
                tracing::info!(
                    "PostgreSQL prediction logging initialized ({})",
                    config.redacted_database_url().unwrap_or("***")
                );
                PredictionSink::Postgres(sink)
            }
            SinkInit::Degraded(reason) => {
                let path = config.log_file();
                if config.database_url.is_some() {
                    tracing::warn!(
                        "Failed to connect to PostgreSQL ({}), falling back to {}",
                        reason,
                        path.display()
                    );
                } else {
                    tracing::info!("{}, prediction logging will use {}", reason, path.display());
                }

                if let Err(e) = tokio::fs::create_dir_all(&config.log_dir).await {
                    tracing::warn!("Failed to create log directory {}: {}", config.log_dir.display(), e);
                }

                PredictionSink::File(FileSink::new(path))
            }
        }
    }

    /// Backend name reported by `/health`
    pub fn backend(&self) -> &'static str {
        match self {
            PredictionSink::Postgres(_) => "postgres",
            PredictionSink::File(_) => "jsonl",
        }
    }

    /// Best-effort write. Never returns an error to the request path.
    pub async fn write(&self, entry: &LogEntry) {
        if let Err(e) = self.try_write(entry).await {
            tracing::error!(backend = self.backend(), "Failed to log prediction: {}", e);
        }
    }

    pub async fn try_write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        match self {
            PredictionSink::Postgres(sink) => sink.insert(entry).await,
            PredictionSink::File(sink) => sink.append(entry).await,
        }
    }

    /// Newest-first page of logged predictions
    pub async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<PredictionLog>, SinkError> {
        match self {
            PredictionSink::Postgres(sink) => sink.recent(limit, offset).await,
            PredictionSink::File(sink) => sink.recent(limit, offset).await,
        }
    }

    /// Release the pool or file handle. Called once at shutdown.
    pub async fn close(&self) {
        match self {
            PredictionSink::Postgres(sink) => sink.close().await,
            PredictionSink::File(sink) => sink.close().await,
        }
        tracing::info!("Prediction sink closed ({})", self.backend());
    }
}
