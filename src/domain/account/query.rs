//! Constrained query options for the account listing path
//!
//! Field names that end up in SQL text come exclusively from the enums here;
//! caller-supplied values are only ever bound as parameters.

use chrono::NaiveDate;

use crate::domain::DomainError;

/// Whitelisted sort fields for `/records`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Id,
    Domain,
    Date,
    Region,
}

impl SortBy {
    /// Column name interpolated into the ORDER BY clause
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Domain => "domain",
            Self::Date => "created_on",
            Self::Region => "region",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "domain" => Some(Self::Domain),
            "date" => Some(Self::Date),
            "region" => Some(Self::Region),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort specification with silent fallback to the default (id, descending)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub by: SortBy,
    pub direction: SortDirection,
}

impl Sort {
    /// Unknown fields or directions fall back to the default, never an error.
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let parsed_by = sort_by.and_then(SortBy::parse);
        let parsed_dir = sort_order.and_then(SortDirection::parse);

        match (parsed_by, parsed_dir) {
            (Some(by), Some(direction)) => Self { by, direction },
            // A sort request that is not fully valid uses the default order
            _ => Self::default(),
        }
    }
}

/// Filter predicate for the account listing and its count query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    /// Partial match
    pub domain: Option<String>,
    /// Partial match
    pub source: Option<String>,
    /// Exact match
    pub region: Option<String>,
    /// Exact match
    pub provider_id: Option<i32>,
    /// Inclusive lower bound on creation date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on creation date
    pub date_to: Option<NaiveDate>,
}

impl AccountFilter {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.source.is_none()
            && self.region.is_none()
            && self.provider_id.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// Parses a `YYYY-MM-DD` query parameter into a date
pub fn parse_filter_date(name: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        DomainError::validation(format!("{} must be formatted as YYYY-MM-DD", name))
    })
}

/// Normalized pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Clamps limit into `1..=max_limit` and page to at least 1.
    pub fn clamped(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Total page count for a result set of `total` rows
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_defaults() {
        let sort = Sort::from_params(None, None);
        assert_eq!(sort.by, SortBy::Id);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_valid_params() {
        let sort = Sort::from_params(Some("domain"), Some("ASC"));
        assert_eq!(sort.by, SortBy::Domain);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_unknown_field_falls_back() {
        let sort = Sort::from_params(Some("unknown_field"), Some("asc"));
        assert_eq!(sort, Sort::default());
    }

    #[test]
    fn test_sort_bad_direction_falls_back() {
        let sort = Sort::from_params(Some("domain"), Some("sideways"));
        assert_eq!(sort, Sort::default());
    }

    #[test]
    fn test_sort_case_insensitive_direction() {
        let sort = Sort::from_params(Some("date"), Some("DeSc"));
        assert_eq!(sort.by, SortBy::Date);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_injection_attempt_falls_back() {
        let sort = Sort::from_params(Some("id; DROP TABLE accounts"), Some("desc"));
        assert_eq!(sort, Sort::default());
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::clamped(Some(0), Some(500), 10, 100);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);

        let p = Pagination::clamped(None, None, 10, 100);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination::clamped(Some(3), Some(10), 10, 100);
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_pagination_pages() {
        let p = Pagination::clamped(Some(1), Some(10), 10, 100);
        assert_eq!(p.pages(95), 10);
        assert_eq!(p.pages(100), 10);
        assert_eq!(p.pages(0), 0);
        assert_eq!(p.pages(1), 1);
    }

    #[test]
    fn test_parse_filter_date() {
        assert!(parse_filter_date("date_from", "2025-01-23").is_ok());
        assert!(matches!(
            parse_filter_date("date_from", "23/01/2025"),
            Err(DomainError::Validation { .. })
        ));
    }
}
