//! API key metadata and per-key usage state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Capability attached to an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Declarative API key definition as it appears in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySpec {
    /// Opaque credential presented by callers
    pub token: String,
    /// Human-readable holder name
    pub holder: String,
    pub permissions: Vec<Permission>,
    /// Requests allowed per calendar day
    pub daily_quota: u32,
}

/// Usage counter over the current calendar-day window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    pub used_today: u32,
    pub last_reset: NaiveDate,
}

impl UsageWindow {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            used_today: 0,
            last_reset: today,
        }
    }

    /// Resets the counter iff the window has rolled over to a new day.
    /// Idempotent within a day; must run before any quota comparison.
    pub fn refresh(&mut self, today: NaiveDate) {
        if self.last_reset != today {
            self.used_today = 0;
            self.last_reset = today;
        }
    }
}

/// Snapshot handed to handlers after a successful admission
#[derive(Debug, Clone)]
pub struct AdmittedKey {
    pub holder: String,
    pub permissions: Vec<Permission>,
    pub daily_quota: u32,
    /// Usage after this request was counted
    pub used_today: u32,
}

impl AdmittedKey {
    pub fn remaining(&self) -> u32 {
        self.daily_quota.saturating_sub(self.used_today)
    }
}
