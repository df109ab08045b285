//! Audit domain: immutable call records, validated trail filter, sink contracts

mod query;
mod record;
mod repository;

pub use query::AuditFilter;
pub use record::{AuditRecord, MAX_ERROR_LEN, MAX_KEY_LEN, MAX_USER_AGENT_LEN};
#[cfg(test)]
pub use repository::{MockAuditLogSink, MockAuditRepository};
pub use repository::{
    AuditLogSink, AuditPage, AuditRepository, AuditStats, DayCount, HourCount, LabelCount,
    LatencySummary, StatusCount, StoredAuditRecord,
};
