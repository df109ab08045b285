//! Audit sink contracts
//!
//! Two independent sinks receive every record: a durable store row and an
//! append-only log line. Neither write may influence the response path; the
//! pipeline guards each call separately.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::account::Pagination;
use crate::domain::DomainError;

use super::query::AuditFilter;
use super::record::AuditRecord;

/// One page of audit records plus the total matching-row count
#[derive(Debug, Clone)]
pub struct AuditPage {
    pub records: Vec<StoredAuditRecord>,
    pub total: u64,
}

/// An audit record as read back from the durable store
#[derive(Debug, Clone, Serialize)]
pub struct StoredAuditRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: AuditRecord,
}

/// Requests counted per status code
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status_code: i32,
    pub count: i64,
}

/// Requests counted per label (endpoint, user, ip)
#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    pub value: String,
    pub count: i64,
}

/// Requests counted per calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub date: chrono::NaiveDate,
    pub count: i64,
}

/// Requests counted per hour of day
#[derive(Debug, Clone, Serialize)]
pub struct HourCount {
    pub hour: i32,
    pub count: i64,
}

/// Latency aggregate in seconds
#[derive(Debug, Clone, Serialize)]
pub struct LatencySummary {
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
}

/// Aggregates for the `/audit/stats` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub total_requests: i64,
    pub last_24h: i64,
    pub last_7d: i64,
    pub latency: LatencySummary,
    pub status_codes: Vec<StatusCount>,
    pub top_endpoints: Vec<LabelCount>,
    pub top_users: Vec<LabelCount>,
    pub top_ips: Vec<LabelCount>,
    pub daily_trend_7d: Vec<DayCount>,
    pub hourly_trend_24h: Vec<HourCount>,
}

/// Durable audit store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert(&self, record: &AuditRecord) -> Result<(), DomainError>;

    async fn list(
        &self,
        filter: &AuditFilter,
        page: Pagination,
    ) -> Result<AuditPage, DomainError>;

    async fn stats(&self) -> Result<AuditStats, DomainError>;
}

/// Append-only log sink. `request_body` is the redacted copy of a POST/PUT
/// body, present only when one was captured.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogSink: Send + Sync {
    async fn append(
        &self,
        record: &AuditRecord,
        request_body: Option<&serde_json::Value>,
    ) -> Result<(), DomainError>;
}
