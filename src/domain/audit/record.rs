//! Immutable audit record describing one inbound call

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stored credential prefix length
pub const MAX_KEY_LEN: usize = 50;
/// Stored user-agent length
pub const MAX_USER_AGENT_LEN: usize = 500;
/// Stored error-message length
pub const MAX_ERROR_LEN: usize = 1000;

/// One request's identity, parameters, and outcome. Created exactly once per
/// inbound call and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub api_key: Option<String>,
    pub user_name: Option<String>,
    pub method: String,
    pub endpoint: String,
    pub query_params: Option<serde_json::Value>,
    pub status_code: i32,
    /// Latency in seconds
    pub response_time: f64,
    pub user_agent: Option<String>,
    pub error_message: Option<String>,
}

impl AuditRecord {
    /// Builds a record, applying the storage truncation bounds to the
    /// credential, user-agent, and error message.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        ip_address: String,
        api_key: Option<&str>,
        user_name: Option<String>,
        method: String,
        endpoint: String,
        query_params: Option<serde_json::Value>,
        status_code: i32,
        response_time: f64,
        user_agent: Option<&str>,
        error_message: Option<&str>,
    ) -> Self {
        Self {
            timestamp,
            ip_address,
            api_key: api_key.map(|k| truncate(k, MAX_KEY_LEN)),
            user_name,
            method,
            endpoint,
            query_params,
            status_code,
            response_time,
            user_agent: user_agent.map(|ua| truncate(ua, MAX_USER_AGENT_LEN)),
            error_message: error_message.map(|e| truncate(e, MAX_ERROR_LEN)),
        }
    }
}

/// Truncates to at most `max` characters, respecting char boundaries
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(api_key: Option<&str>, user_agent: Option<&str>, error: Option<&str>) -> AuditRecord {
        AuditRecord::new(
            Utc::now(),
            "10.0.0.1".to_string(),
            api_key,
            Some("Demo User".to_string()),
            "GET".to_string(),
            "/records".to_string(),
            None,
            200,
            0.012,
            user_agent,
            error,
        )
    }

    #[test]
    fn test_key_truncated_to_50() {
        let long_key = "k".repeat(80);
        let rec = record(Some(&long_key), None, None);
        assert_eq!(rec.api_key.unwrap().len(), MAX_KEY_LEN);
    }

    #[test]
    fn test_user_agent_truncated_to_500() {
        let long_agent = "a".repeat(600);
        let rec = record(None, Some(&long_agent), None);
        assert_eq!(rec.user_agent.unwrap().len(), MAX_USER_AGENT_LEN);
    }

    #[test]
    fn test_error_truncated_to_1000() {
        let long_error = "e".repeat(1500);
        let rec = record(None, None, Some(&long_error));
        assert_eq!(rec.error_message.unwrap().len(), MAX_ERROR_LEN);
    }

    #[test]
    fn test_short_values_kept_whole() {
        let rec = record(Some("demo-key"), Some("curl/8.0"), Some("boom"));
        assert_eq!(rec.api_key.as_deref(), Some("demo-key"));
        assert_eq!(rec.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(rec.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "é".repeat(60);
        let out = truncate(&s, 50);
        assert_eq!(out.chars().count(), 50);
    }
}
