//! Account record domain: entity, constrained query model, repository contract

mod entity;
mod query;
mod repository;

pub use entity::{AccountInput, AccountRecord, AccountUpdate, NewAccount};
pub use query::{parse_filter_date, AccountFilter, Pagination, Sort, SortBy, SortDirection};
#[cfg(test)]
pub use repository::MockAccountRepository;
pub use repository::{AccountPage, AccountRepository, AccountStats, CountBucket, DailyCount};
