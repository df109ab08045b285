//! Validated filter for the audit-trail query path

use chrono::{Datelike, Local, NaiveDate};

use crate::domain::DomainError;

/// Earliest year accepted for audit date filters
const MIN_FILTER_YEAR: i32 = 2015;
/// Longest allowed date span, in days
const MAX_SPAN_DAYS: i64 = 365;

/// Filter over stored audit records. Date bounds are validated at
/// construction; everything else is matched as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Inclusive lower bound (start of day)
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound (end of day)
    pub date_to: Option<NaiveDate>,
    /// Partial match on the stored credential
    pub api_key: Option<String>,
    /// Partial match
    pub endpoint: Option<String>,
    /// Exact match
    pub status_code: Option<i32>,
    /// Exact match, uppercased
    pub method: Option<String>,
    /// Partial match on holder name
    pub user: Option<String>,
    /// Partial match
    pub ip: Option<String>,
}

impl AuditFilter {
    /// Parses and validates raw query parameters.
    ///
    /// Date rules: `YYYY-MM-DD` format, `date_from` no earlier than 2015 and
    /// neither bound in the future, `date_from <= date_to`, span at most one
    /// year. Violations are validation errors, surfaced before any store
    /// access.
    #[allow(clippy::too_many_arguments)]
    pub fn from_params(
        date_from: Option<&str>,
        date_to: Option<&str>,
        api_key: Option<String>,
        endpoint: Option<String>,
        status_code: Option<i32>,
        method: Option<String>,
        user: Option<String>,
        ip: Option<String>,
    ) -> Result<Self, DomainError> {
        let today = Local::now().date_naive();

        let date_from = date_from
            .map(|raw| parse_date("date_from", raw))
            .transpose()?;
        let date_to = date_to.map(|raw| parse_date("date_to", raw)).transpose()?;

        if let Some(from) = date_from {
            if from.year() < MIN_FILTER_YEAR {
                return Err(DomainError::validation(format!(
                    "date_from must be {} or later",
                    MIN_FILTER_YEAR
                )));
            }
            if from > today {
                return Err(DomainError::validation("date_from cannot be in the future"));
            }
        }

        if let Some(to) = date_to {
            if to > today {
                return Err(DomainError::validation("date_to cannot be in the future"));
            }
        }

        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(DomainError::validation("date_from must not be after date_to"));
            }
            if (to - from).num_days() > MAX_SPAN_DAYS {
                return Err(DomainError::validation(
                    "date range must not exceed one year",
                ));
            }
        }

        Ok(Self {
            date_from,
            date_to,
            api_key,
            endpoint,
            status_code,
            method: method.map(|m| m.to_ascii_uppercase()),
            user,
            ip,
        })
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        DomainError::validation(format!(
            "{} must be formatted as YYYY-MM-DD (example: 2025-01-23)",
            name
        ))
    })
}
