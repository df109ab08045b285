//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::account::AccountRepository;
use crate::domain::api_key::KeyRegistry;
use crate::domain::audit::{AuditLogSink, AuditRepository};

/// State handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<KeyRegistry>,
    pub accounts: Arc<dyn AccountRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub audit_log: Arc<dyn AuditLogSink>,
    pub pool: PgPool,
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use sqlx::postgres::PgPoolOptions;

    use super::AppState;
    use crate::config::AppConfig;
    use crate::domain::account::MockAccountRepository;
    use crate::domain::api_key::KeyRegistry;
    use crate::domain::audit::{MockAuditLogSink, MockAuditRepository};

    /// State over mocked repositories. The pool is lazy and never connects.
    pub fn mock_state(accounts: MockAccountRepository) -> AppState {
        mock_state_with(accounts, MockAuditRepository::new())
    }

    pub fn mock_state_with(
        accounts: MockAccountRepository,
        audit: MockAuditRepository,
    ) -> AppState {
        mock_state_full(accounts, audit, MockAuditLogSink::new())
    }

    pub fn mock_state_full(
        accounts: MockAccountRepository,
        audit: MockAuditRepository,
        audit_log: MockAuditLogSink,
    ) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/credgate_test")
            .expect("lazy pool");

        AppState {
            registry: Arc::new(KeyRegistry::new(AppConfig::default().api_keys)),
            accounts: Arc::new(accounts),
            audit: Arc::new(audit),
            audit_log: Arc::new(audit_log),
            pool,
        }
    }
}
