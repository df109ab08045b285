//! PostgreSQL connection pool and schema bootstrap

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Opens a bounded connection pool with explicit acquire and idle timeouts
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

/// Ensures the account and audit tables exist. Audit rows are indexed by
/// timestamp, credential, and endpoint for the trail query path.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id BIGSERIAL PRIMARY KEY,
            provider_id INTEGER NOT NULL DEFAULT 0,
            domain VARCHAR(255) NOT NULL,
            username VARCHAR(255) NOT NULL,
            secret VARCHAR(255) NOT NULL,
            region VARCHAR(100) NOT NULL DEFAULT '',
            source VARCHAR(255) NOT NULL DEFAULT '',
            created_on DATE NOT NULL DEFAULT CURRENT_DATE
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| DomainError::storage(format!("Failed to create accounts table: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id BIGSERIAL PRIMARY KEY,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            ip_address VARCHAR(45) NOT NULL,
            api_key VARCHAR(50),
            user_name VARCHAR(255),
            method VARCHAR(10) NOT NULL,
            endpoint VARCHAR(255) NOT NULL,
            query_params JSONB,
            status_code INTEGER,
            response_time DOUBLE PRECISION,
            user_agent VARCHAR(500),
            error_message VARCHAR(1000)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| DomainError::storage(format!("Failed to create audit_log table: {}", e)))?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log (timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_audit_api_key ON audit_log (api_key)",
        "CREATE INDEX IF NOT EXISTS idx_audit_endpoint ON audit_log (endpoint)",
        "CREATE INDEX IF NOT EXISTS idx_accounts_domain ON accounts (domain)",
        "CREATE INDEX IF NOT EXISTS idx_accounts_created_on ON accounts (created_on)",
    ] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}
