//! In-process key registry and admission control
//!
//! The registry is loaded once at startup and lives for the process lifetime;
//! usage counters are not persisted across restarts. Each key's usage window
//! sits behind its own mutex so the refresh -> compare -> increment sequence
//! is atomic per key.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::domain::DomainError;

use super::entity::{AdmittedKey, ApiKeySpec, Permission, UsageWindow};

struct KeyEntry {
    holder: String,
    permissions: Vec<Permission>,
    daily_quota: u32,
    usage: Mutex<UsageWindow>,
}

/// Process-wide table of API keys
pub struct KeyRegistry {
    keys: HashMap<String, KeyEntry>,
}

impl KeyRegistry {
    pub fn new(specs: Vec<ApiKeySpec>) -> Self {
        let today = Local::now().date_naive();
        let keys = specs
            .into_iter()
            .map(|spec| {
                (
                    spec.token,
                    KeyEntry {
                        holder: spec.holder,
                        permissions: spec.permissions,
                        daily_quota: spec.daily_quota,
                        usage: Mutex::new(UsageWindow::new(today)),
                    },
                )
            })
            .collect();

        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Looks up the holder name for a credential without touching quota state.
    /// Used by the audit pipeline, which must never consume quota.
    pub fn resolve_holder(&self, credential: &str) -> Option<&str> {
        self.keys.get(credential).map(|e| e.holder.as_str())
    }

    /// Validates a credential and admits the request if quota and permissions
    /// allow. The check order is load-bearing: existence, window refresh,
    /// quota comparison, permission intersection, then the increment. A
    /// rejected request never increments the counter.
    pub fn admit(
        &self,
        credential: Option<&str>,
        required: &[Permission],
    ) -> Result<AdmittedKey, DomainError> {
        self.admit_at(credential, required, Local::now().date_naive())
    }

    fn admit_at(
        &self,
        credential: Option<&str>,
        required: &[Permission],
        today: NaiveDate,
    ) -> Result<AdmittedKey, DomainError> {
        let credential = credential.ok_or_else(|| {
            DomainError::authentication_missing(
                "send your key in the X-API-Key header or the api_key query parameter",
            )
        })?;

        let entry = self
            .keys
            .get(credential)
            .ok_or_else(|| DomainError::authentication_invalid("please use a valid API key"))?;

        let mut usage = entry.usage.lock().unwrap_or_else(|e| e.into_inner());
        usage.refresh(today);

        if usage.used_today >= entry.daily_quota {
            return Err(DomainError::rate_limit_exceeded(format!(
                "daily limit of {} requests reached",
                entry.daily_quota
            )));
        }

        if !entry.permissions.iter().any(|p| required.contains(p)) {
            return Err(DomainError::authorization_denied(format!(
                "this operation requires one of: {}",
                required
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        usage.used_today += 1;

        Ok(AdmittedKey {
            holder: entry.holder.clone(),
            permissions: entry.permissions.clone(),
            daily_quota: entry.daily_quota,
            used_today: usage.used_today,
        })
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeyRegistry {
        KeyRegistry::new(vec![
            ApiKeySpec {
                token: "rw-key".to_string(),
                holder: "Demo User".to_string(),
                permissions: vec![Permission::Read, Permission::Write],
                daily_quota: 5,
            },
            ApiKeySpec {
                token: "ro-key".to_string(),
                holder: "Read Only User".to_string(),
                permissions: vec![Permission::Read],
                daily_quota: 3,
            },
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_missing_credential() {
        let result = registry().admit_at(None, &[Permission::Read], today());
        assert!(matches!(
            result,
            Err(DomainError::AuthenticationMissing { .. })
        ));
    }

    #[test]
    fn test_unknown_credential() {
        let result = registry().admit_at(Some("nope"), &[Permission::Read], today());
        assert!(matches!(
            result,
            Err(DomainError::AuthenticationInvalid { .. })
        ));
    }

    #[test]
    fn test_admission_increments_usage() {
        let reg = registry();

        let first = reg
            .admit_at(Some("rw-key"), &[Permission::Read], today())
            .unwrap();
        assert_eq!(first.used_today, 1);
        assert_eq!(first.remaining(), 4);

        let second = reg
            .admit_at(Some("rw-key"), &[Permission::Read], today())
            .unwrap();
        assert_eq!(second.used_today, 2);
    }

    #[test]
    fn test_quota_boundary() {
        let reg = registry();

        // quota=5: five requests admitted, usage lands exactly on the quota
        for expected in 1..=5 {
            let key = reg
                .admit_at(Some("rw-key"), &[Permission::Read], today())
                .unwrap();
            assert_eq!(key.used_today, expected);
        }

        // sixth request rejected, counter stays at 5
        let result = reg.admit_at(Some("rw-key"), &[Permission::Read], today());
        assert!(matches!(result, Err(DomainError::RateLimitExceeded { .. })));

        // next day the window resets and the request is admitted again
        let tomorrow = today().succ_opt().unwrap();
        let key = reg
            .admit_at(Some("rw-key"), &[Permission::Read], tomorrow)
            .unwrap();
        assert_eq!(key.used_today, 1);
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let reg = registry();

        for _ in 0..3 {
            reg.admit_at(Some("ro-key"), &[Permission::Read], today())
                .unwrap();
        }

        for _ in 0..4 {
            let result = reg.admit_at(Some("ro-key"), &[Permission::Read], today());
            assert!(matches!(result, Err(DomainError::RateLimitExceeded { .. })));
        }

        // Counter held at the quota despite repeated rejected attempts
        let tomorrow = today().succ_opt().unwrap();
        let key = reg
            .admit_at(Some("ro-key"), &[Permission::Read], tomorrow)
            .unwrap();
        assert_eq!(key.used_today, 1);
    }

    #[test]
    fn test_permission_any_of_match() {
        let reg = registry();

        // read-only key admitted when read OR write is acceptable
        let result = reg.admit_at(
            Some("ro-key"),
            &[Permission::Read, Permission::Write],
            today(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_permission_denied() {
        let reg = registry();

        let result = reg.admit_at(Some("ro-key"), &[Permission::Write], today());
        assert!(matches!(
            result,
            Err(DomainError::AuthorizationDenied { .. })
        ));
    }

    #[test]
    fn test_quota_checked_before_permission() {
        let reg = registry();

        for _ in 0..3 {
            reg.admit_at(Some("ro-key"), &[Permission::Read], today())
                .unwrap();
        }

        // Over quota AND under-permissioned: quota wins, per the check order
        let result = reg.admit_at(Some("ro-key"), &[Permission::Write], today());
        assert!(matches!(result, Err(DomainError::RateLimitExceeded { .. })));
    }

    #[test]
    fn test_permission_denied_does_not_increment() {
        let reg = registry();

        let denied = reg.admit_at(Some("ro-key"), &[Permission::Write], today());
        assert!(denied.is_err());

        let key = reg
            .admit_at(Some("ro-key"), &[Permission::Read], today())
            .unwrap();
        assert_eq!(key.used_today, 1);
    }

    #[test]
    fn test_resolve_holder() {
        let reg = registry();
        assert_eq!(reg.resolve_holder("rw-key"), Some("Demo User"));
        assert_eq!(reg.resolve_holder("nope"), None);
    }
}
