//! credgate
//!
//! Key-authenticated HTTP gateway over a harvested-account record store:
//! - In-process API key registry with daily quotas and permission sets
//! - Dual-sink audit trail (durable store + append-only request log)
//! - Constrained filtering, sorting, pagination, and ranked search
//! - Bulk ingest with per-item validation

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::api_key::KeyRegistry;
use infrastructure::account::PostgresAccountRepository;
use infrastructure::audit::{FileAuditSink, PostgresAuditRepository};
use infrastructure::storage::{connect_pool, ensure_schema};

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = connect_pool(&config.database).await?;
    ensure_schema(&pool).await?;

    let registry = KeyRegistry::new(config.api_keys.clone());
    info!(keys = registry.len(), "API key registry loaded");

    let audit_log = FileAuditSink::new(&config.audit.log_path).await?;

    Ok(AppState {
        registry: Arc::new(registry),
        accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
        audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
        audit_log: Arc::new(audit_log),
        pool,
    })
}
