use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopsearch_core::domain::analytics::{SearchAnalyticsRow, SearchLogEntry};
use sqlx::PgPool;

use crate::search::log_store::{SearchLogError, SearchLogStore};

#[derive(Debug, Clone, sqlx::FromRow)]
struct AnalyticsRow {
    query: String,
    search_count: i64,
    avg_results_count: Option<f64>,
    last_searched: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PgSearchLogStore {
    pool: PgPool,
}

impl PgSearchLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchLogStore for PgSearchLogStore {
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError> {
        sqlx::query(
            r#"
            INSERT INTO search_logs (user_id, query, results_count, searched_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.query)
        .bind(entry.results_count)
        .bind(entry.searched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn aggregate_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SearchAnalyticsRow>, SearchLogError> {
        let rows = sqlx::query_as::<_, AnalyticsRow>(
            r#"
            SELECT
                query,
                COUNT(*)::bigint AS search_count,
                AVG(results_count)::double precision AS avg_results_count,
                MAX(searched_at) AS last_searched
            FROM search_logs
            WHERE searched_at >= $1
            GROUP BY query
            ORDER BY search_count DESC, last_searched DESC, query
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| SearchAnalyticsRow {
                query: row.query,
                search_count: row.search_count,
                avg_results_count: row.avg_results_count.unwrap_or(0.0),
                last_searched: row.last_searched,
            })
            .collect())
    }
}
