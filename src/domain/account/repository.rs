//! Account repository contract

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::DomainError;

use super::entity::{AccountRecord, AccountUpdate, NewAccount};
use super::query::{AccountFilter, Pagination, Sort};

/// One page of accounts plus the total matching-row count
#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<AccountRecord>,
    pub total: u64,
}

/// A labelled count, used by the stats aggregates
#[derive(Debug, Clone, Serialize)]
pub struct CountBucket {
    pub value: String,
    pub count: i64,
}

/// Accounts created on one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: chrono::NaiveDate,
    pub count: i64,
}

/// Aggregates for the `/stats` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub total_accounts: i64,
    pub recent_accounts_30d: i64,
    pub top_regions: Vec<CountBucket>,
    pub top_domains: Vec<CountBucket>,
    pub daily_trend_7d: Vec<DailyCount>,
}

/// Narrow query contract over the relational record store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Filtered, sorted, paginated listing plus the total count for the same
    /// predicate
    async fn list(
        &self,
        filter: &AccountFilter,
        sort: Sort,
        page: Pagination,
    ) -> Result<AccountPage, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<AccountRecord>, DomainError>;

    async fn exists(&self, id: i64) -> Result<bool, DomainError>;

    /// Inserts one account and returns its new id
    async fn insert(&self, account: &NewAccount) -> Result<i64, DomainError>;

    /// Inserts a batch of already-validated accounts in a single transaction,
    /// committed once after the last statement
    async fn insert_batch(&self, accounts: &[NewAccount]) -> Result<(), DomainError>;

    /// Partial update; `NotFound` if the id does not exist
    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<(), DomainError>;

    /// Delete; `NotFound` if the id does not exist
    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Free-text search over domain/username/region/source with exact-match
    /// ranking (domain first, then username), ties broken by id descending
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<AccountRecord>, DomainError>;

    async fn stats(&self) -> Result<AccountStats, DomainError>;
}
