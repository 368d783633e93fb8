//! PostgreSQL sink - connection pool and schema

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::models::{LogEntry, PredictionLog};
use super::SinkError;

/// Append-only `predictions` table behind a connection pool
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    /// Connect and apply the schema. Any failure closes the pool again.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, SinkError> {
        let pool = create_pool(database_url, max_connections, acquire_timeout).await?;

        if let Err(e) = run_migrations(&pool).await {
            pool.close().await;
            return Err(e.into());
        }

        Ok(Self { pool })
    }

    pub async fn insert(&self, entry: &LogEntry) -> Result<(), SinkError> {
        sqlx::query(
            r#"
            INSERT INTO predictions
                (timestamp, input_features, status_code, duration_ms, prediction, probability_default, credit_decision, error)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#
        )
        .bind(entry.timestamp)
        .bind(&entry.input_features)
        .bind(entry.status_code.map(i32::from))
        .bind(entry.duration_ms)
        .bind(entry.prediction)
        .bind(entry.probability_default)
        .bind(&entry.credit_decision)
        .bind(&entry.error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<PredictionLog>, SinkError> {
        let rows = sqlx::query_as::<_, PredictionLog>(
            r#"
            SELECT id, timestamp, input_features, prediction, probability_default,
                   credit_decision, status_code, duration_ms, error
            FROM predictions
            ORDER BY timestamp DESC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create database connection pool
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Create tables if not exist
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Prediction log (append-only)
CREATE TABLE IF NOT EXISTS predictions (
    id BIGSERIAL PRIMARY KEY,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    input_features JSONB,
    status_code INT,
    duration_ms DOUBLE PRECISION,
    prediction SMALLINT,
    probability_default DOUBLE PRECISION,
    credit_decision VARCHAR(10),
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_predictions_timestamp ON predictions(timestamp);
"#;
