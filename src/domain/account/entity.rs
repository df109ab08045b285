//! Account record entity and write payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A harvested account credential as stored in the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    /// Service-provider id, 0 when unknown
    pub provider_id: i32,
    pub domain: String,
    pub username: String,
    pub secret: String,
    pub region: String,
    /// Where the record came from, e.g. "API-Demo User"
    pub source: String,
    pub created_on: NaiveDate,
}

/// Payload for inserting a new account, with defaults already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub provider_id: i32,
    pub domain: String,
    pub username: String,
    pub secret: String,
    pub region: String,
    pub source: String,
}

/// Raw item as submitted by callers (single create or bulk ingest)
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInput {
    pub domain: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    #[serde(default)]
    pub provider_id: Option<i32>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl AccountInput {
    /// Names of mandatory fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.domain.as_deref().is_none_or(str::is_empty) {
            missing.push("domain");
        }
        if self.username.as_deref().is_none_or(str::is_empty) {
            missing.push("username");
        }
        if self.secret.as_deref().is_none_or(str::is_empty) {
            missing.push("secret");
        }

        missing
    }

    /// Validates mandatory fields and applies defaults. `default_source` is
    /// derived from the caller's key holder when the item names no source.
    pub fn into_new_account(self, default_source: &str) -> Result<NewAccount, DomainError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        Ok(NewAccount {
            provider_id: self.provider_id.unwrap_or(0),
            domain: self.domain.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            secret: self.secret.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            source: self
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default_source.to_string()),
        })
    }
}

/// Field-level partial update; only present fields are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub provider_id: Option<i32>,
    pub domain: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub region: Option<String>,
    pub source: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.provider_id.is_none()
            && self.domain.is_none()
            && self.username.is_none()
            && self.secret.is_none()
            && self.region.is_none()
            && self.source.is_none()
    }
}
