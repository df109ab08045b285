//! PostgreSQL audit store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::account::Pagination;
use crate::domain::audit::{
    AuditFilter, AuditPage, AuditRecord, AuditRepository, AuditStats, DayCount, HourCount,
    LabelCount, LatencySummary, StatusCount, StoredAuditRecord,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of AuditRepository
#[derive(Debug, Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    if let Some(from) = filter.date_from {
        builder.push(" AND timestamp >= ");
        builder.push_bind(from.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    if let Some(to) = filter.date_to {
        // Inclusive upper bound: end of day
        builder.push(" AND timestamp <= ");
        builder.push_bind(to.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc());
    }
    if let Some(api_key) = &filter.api_key {
        builder.push(" AND api_key LIKE ");
        builder.push_bind(format!("%{}%", api_key));
    }
    if let Some(endpoint) = &filter.endpoint {
        builder.push(" AND endpoint LIKE ");
        builder.push_bind(format!("%{}%", endpoint));
    }
    if let Some(status_code) = filter.status_code {
        builder.push(" AND status_code = ");
        builder.push_bind(status_code);
    }
    if let Some(method) = &filter.method {
        builder.push(" AND method = ");
        builder.push_bind(method.clone());
    }
    if let Some(user) = &filter.user {
        builder.push(" AND user_name LIKE ");
        builder.push_bind(format!("%{}%", user));
    }
    if let Some(ip) = &filter.ip {
        builder.push(" AND ip_address LIKE ");
        builder.push_bind(format!("%{}%", ip));
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn insert(&self, record: &AuditRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log
                (timestamp, ip_address, api_key, user_name, method, endpoint,
                 query_params, status_code, response_time, user_agent, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.ip_address)
        .bind(&record.api_key)
        .bind(&record.user_name)
        .bind(&record.method)
        .bind(&record.endpoint)
        .bind(&record.query_params)
        .bind(record.status_code)
        .bind(record.response_time)
        .bind(&record.user_agent)
        .bind(&record.error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert audit record: {}", e)))?;

        Ok(())
    }

    async fn list(
        &self,
        filter: &AuditFilter,
        page: Pagination,
    ) -> Result<AuditPage, DomainError> {
        let mut rows_query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, timestamp, ip_address, api_key, user_name, method, endpoint, \
             query_params, status_code, response_time, user_agent, error_message \
             FROM audit_log WHERE 1=1",
        );
        push_filters(&mut rows_query, filter);
        rows_query.push(" ORDER BY timestamp DESC LIMIT ");
        rows_query.push_bind(i64::from(page.limit));
        rows_query.push(" OFFSET ");
        rows_query.push_bind(page.offset());

        let rows = rows_query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list audit records: {}", e)))?;

        let records = rows.iter().map(row_to_stored_record).collect();

        let mut count_query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_log WHERE 1=1");
        push_filters(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count audit records: {}", e)))?;

        Ok(AuditPage {
            records,
            total: total as u64,
        })
    }

    async fn stats(&self) -> Result<AuditStats, DomainError> {
        let total_requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count requests: {}", e)))?;

        let last_24h: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log WHERE timestamp >= NOW() - INTERVAL '24 hours'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count last 24h: {}", e)))?;

        let last_7d: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log WHERE timestamp >= NOW() - INTERVAL '7 days'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count last 7d: {}", e)))?;

        let latency_row = sqlx::query(
            r#"
            SELECT COALESCE(AVG(response_time), 0) AS avg_rt,
                   COALESCE(MIN(response_time), 0) AS min_rt,
                   COALESCE(MAX(response_time), 0) AS max_rt
            FROM audit_log
            WHERE response_time IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate latency: {}", e)))?;

        let status_rows = sqlx::query(
            r#"
            SELECT status_code, COUNT(*) AS count
            FROM audit_log
            WHERE status_code IS NOT NULL
            GROUP BY status_code
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate statuses: {}", e)))?;

        let endpoint_rows = top_label_rows(&self.pool, "endpoint").await?;
        let user_rows = top_label_rows(&self.pool, "user_name").await?;
        let ip_rows = top_label_rows(&self.pool, "ip_address").await?;

        let daily_rows = sqlx::query(
            r#"
            SELECT DATE(timestamp) AS date, COUNT(*) AS count
            FROM audit_log
            WHERE timestamp >= NOW() - INTERVAL '7 days'
            GROUP BY DATE(timestamp)
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate daily trend: {}", e)))?;

        let hourly_rows = sqlx::query(
            r#"
            SELECT EXTRACT(HOUR FROM timestamp)::INT AS hour, COUNT(*) AS count
            FROM audit_log
            WHERE timestamp >= NOW() - INTERVAL '24 hours'
            GROUP BY hour
            ORDER BY hour
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate hourly trend: {}", e)))?;

        Ok(AuditStats {
            total_requests,
            last_24h,
            last_7d,
            latency: LatencySummary {
                avg_response_time: latency_row.get("avg_rt"),
                min_response_time: latency_row.get("min_rt"),
                max_response_time: latency_row.get("max_rt"),
            },
            status_codes: status_rows
                .iter()
                .map(|row| StatusCount {
                    status_code: row.get("status_code"),
                    count: row.get("count"),
                })
                .collect(),
            top_endpoints: endpoint_rows,
            top_users: user_rows,
            top_ips: ip_rows,
            daily_trend_7d: daily_rows
                .iter()
                .map(|row| DayCount {
                    date: row.get("date"),
                    count: row.get("count"),
                })
                .collect(),
            hourly_trend_24h: hourly_rows
                .iter()
                .map(|row| HourCount {
                    hour: row.get("hour"),
                    count: row.get("count"),
                })
                .collect(),
        })
    }
}

/// Top-10 counts for one of the fixed label columns. The column name comes
/// from the three literal call sites above, never from caller input.
async fn top_label_rows(pool: &PgPool, column: &str) -> Result<Vec<LabelCount>, DomainError> {
    let query = format!(
        "SELECT {col} AS value, COUNT(*) AS count \
         FROM audit_log WHERE {col} IS NOT NULL \
         GROUP BY {col} ORDER BY count DESC LIMIT 10",
        col = column
    );

    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate {}: {}", column, e)))?;

    Ok(rows
        .iter()
        .map(|row| LabelCount {
            value: row.get("value"),
            count: row.get("count"),
        })
        .collect())
}

fn row_to_stored_record(row: &sqlx::postgres::PgRow) -> StoredAuditRecord {
    let timestamp: DateTime<Utc> = row.get("timestamp");
    let status_code: Option<i32> = row.get("status_code");
    let response_time: Option<f64> = row.get("response_time");

    StoredAuditRecord {
        id: row.get("id"),
        record: AuditRecord {
            timestamp,
            ip_address: row.get("ip_address"),
            api_key: row.get("api_key"),
            user_name: row.get("user_name"),
            method: row.get("method"),
            endpoint: row.get("endpoint"),
            query_params: row.get("query_params"),
            status_code: status_code.unwrap_or(0),
            response_time: response_time.unwrap_or(0.0),
            user_agent: row.get("user_agent"),
            error_message: row.get("error_message"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_filters_binds_all_values() {
        let filter = AuditFilter {
            date_from: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
            date_to: chrono::NaiveDate::from_ymd_opt(2025, 2, 1),
            api_key: Some("demo".to_string()),
            endpoint: Some("/records".to_string()),
            status_code: Some(429),
            method: Some("GET".to_string()),
            user: Some("Demo".to_string()),
            ip: Some("10.0".to_string()),
        };

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_log WHERE 1=1");
        push_filters(&mut builder, &filter);

        let sql = builder.sql();
        assert!(sql.contains("timestamp >= $1"));
        assert!(sql.contains("timestamp <= $2"));
        assert!(sql.contains("api_key LIKE $3"));
        assert!(sql.contains("endpoint LIKE $4"));
        assert!(sql.contains("status_code = $5"));
        assert!(sql.contains("method = $6"));
        assert!(sql.contains("user_name LIKE $7"));
        assert!(sql.contains("ip_address LIKE $8"));
        assert!(!sql.contains("demo"));
    }

    #[test]
    fn test_push_filters_empty_adds_nothing() {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_log WHERE 1=1");
        push_filters(&mut builder, &AuditFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM audit_log WHERE 1=1");
    }
}
