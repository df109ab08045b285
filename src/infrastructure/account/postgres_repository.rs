//! PostgreSQL account repository
//!
//! List and count share one dynamically-built predicate. Caller-supplied
//! values are always bound as parameters; the only text interpolated into the
//! query comes from the `SortBy`/`SortDirection` whitelists.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::account::{
    AccountFilter, AccountPage, AccountRecord, AccountRepository, AccountStats, AccountUpdate,
    CountBucket, DailyCount, NewAccount, Pagination, Sort,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of AccountRepository
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the filter predicate. Text fields match partially, exact fields by
/// equality, dates as inclusive bounds.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter) {
    if let Some(domain) = &filter.domain {
        builder.push(" AND domain LIKE ");
        builder.push_bind(format!("%{}%", domain));
    }
    if let Some(source) = &filter.source {
        builder.push(" AND source LIKE ");
        builder.push_bind(format!("%{}%", source));
    }
    if let Some(region) = &filter.region {
        builder.push(" AND region = ");
        builder.push_bind(region.clone());
    }
    if let Some(provider_id) = filter.provider_id {
        builder.push(" AND provider_id = ");
        builder.push_bind(provider_id);
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND created_on >= ");
        builder.push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND created_on <= ");
        builder.push_bind(date_to);
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn list(
        &self,
        filter: &AccountFilter,
        sort: Sort,
        page: Pagination,
    ) -> Result<AccountPage, DomainError> {
        let mut rows_query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, provider_id, domain, username, secret, region, source, created_on \
             FROM accounts WHERE 1=1",
        );
        push_filters(&mut rows_query, filter);
        rows_query.push(format!(
            " ORDER BY {} {}",
            sort.by.column(),
            sort.direction.keyword()
        ));
        rows_query.push(" LIMIT ");
        rows_query.push_bind(i64::from(page.limit));
        rows_query.push(" OFFSET ");
        rows_query.push_bind(page.offset());

        let rows = rows_query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list accounts: {}", e)))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            accounts.push(row_to_account(row)?);
        }

        // Same predicate, no sort or window: total matching rows
        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM accounts WHERE 1=1");
        push_filters(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count accounts: {}", e)))?;

        Ok(AccountPage {
            accounts,
            total: total as u64,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<AccountRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, provider_id, domain, username, secret, region, source, created_on
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check account existence: {}", e))
                })?;

        Ok(exists)
    }

    async fn insert(&self, account: &NewAccount) -> Result<i64, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (provider_id, domain, username, secret, region, source, created_on)
            VALUES ($1, $2, $3, $4, $5, $6, CURRENT_DATE)
            RETURNING id
            "#,
        )
        .bind(account.provider_id)
        .bind(&account.domain)
        .bind(&account.username)
        .bind(&account.secret)
        .bind(&account.region)
        .bind(&account.source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert account: {}", e)))?;

        Ok(id)
    }

    async fn insert_batch(&self, accounts: &[NewAccount]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to open transaction: {}", e)))?;

        for account in accounts {
            sqlx::query(
                r#"
                INSERT INTO accounts (provider_id, domain, username, secret, region, source, created_on)
                VALUES ($1, $2, $3, $4, $5, $6, CURRENT_DATE)
                "#,
            )
            .bind(account.provider_id)
            .bind(&account.domain)
            .bind(&account.username)
            .bind(&account.secret)
            .bind(&account.region)
            .bind(&account.source)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert batch item: {}", e)))?;
        }

        // Accepted inserts commit as one unit after the loop
        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit batch: {}", e)))?;

        Ok(())
    }

    async fn update(&self, id: i64, update: &AccountUpdate) -> Result<(), DomainError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE accounts SET ");
        let mut fields = query.separated(", ");

        if let Some(provider_id) = update.provider_id {
            fields.push("provider_id = ");
            fields.push_bind_unseparated(provider_id);
        }
        if let Some(domain) = &update.domain {
            fields.push("domain = ");
            fields.push_bind_unseparated(domain.clone());
        }
        if let Some(username) = &update.username {
            fields.push("username = ");
            fields.push_bind_unseparated(username.clone());
        }
        if let Some(secret) = &update.secret {
            fields.push("secret = ");
            fields.push_bind_unseparated(secret.clone());
        }
        if let Some(region) = &update.region {
            fields.push("region = ");
            fields.push_bind_unseparated(region.clone());
        }
        if let Some(source) = &update.source {
            fields.push("source = ");
            fields.push_bind_unseparated(source.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Account {} not found", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Account {} not found", id)));
        }

        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<AccountRecord>, DomainError> {
        let pattern = format!("%{}%", query);

        let rows = sqlx::query(
            r#"
            SELECT id, provider_id, domain, username, secret, region, source, created_on
            FROM accounts
            WHERE domain LIKE $1 OR username LIKE $1 OR region LIKE $1 OR source LIKE $1
            ORDER BY
                CASE
                    WHEN domain = $2 THEN 1
                    WHEN username = $2 THEN 2
                    ELSE 3
                END,
                id DESC
            LIMIT $3
            "#,
        )
        .bind(&pattern)
        .bind(query)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to search accounts: {}", e)))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            accounts.push(row_to_account(row)?);
        }

        Ok(accounts)
    }

    async fn stats(&self) -> Result<AccountStats, DomainError> {
        let total_accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count accounts: {}", e)))?;

        let recent_accounts_30d: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE created_on >= CURRENT_DATE - INTERVAL '30 days'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count recent accounts: {}", e)))?;

        let region_rows = sqlx::query(
            r#"
            SELECT region, COUNT(*) AS count
            FROM accounts
            WHERE region != ''
            GROUP BY region
            ORDER BY count DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate regions: {}", e)))?;

        let domain_rows = sqlx::query(
            r#"
            SELECT domain, COUNT(*) AS count
            FROM accounts
            GROUP BY domain
            ORDER BY count DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate domains: {}", e)))?;

        let trend_rows = sqlx::query(
            r#"
            SELECT created_on AS date, COUNT(*) AS count
            FROM accounts
            WHERE created_on >= CURRENT_DATE - INTERVAL '7 days'
            GROUP BY created_on
            ORDER BY created_on DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate daily trend: {}", e)))?;

        Ok(AccountStats {
            total_accounts,
            recent_accounts_30d,
            top_regions: region_rows
                .iter()
                .map(|row| CountBucket {
                    value: row.get("region"),
                    count: row.get("count"),
                })
                .collect(),
            top_domains: domain_rows
                .iter()
                .map(|row| CountBucket {
                    value: row.get("domain"),
                    count: row.get("count"),
                })
                .collect(),
            daily_trend_7d: trend_rows
                .iter()
                .map(|row| DailyCount {
                    date: row.get("date"),
                    count: row.get("count"),
                })
                .collect(),
        })
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<AccountRecord, DomainError> {
    Ok(AccountRecord {
        id: row.get("id"),
        provider_id: row.get("provider_id"),
        domain: row.get("domain"),
        username: row.get("username"),
        secret: row.get("secret"),
        region: row.get("region"),
        source: row.get("source"),
        created_on: row.get("created_on"),
    })
}
