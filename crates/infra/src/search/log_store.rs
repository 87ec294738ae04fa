use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopsearch_core::domain::analytics::{SearchAnalyticsRow, SearchLogEntry};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SearchLogError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("search log unavailable: {0}")]
    Unavailable(String),
}

/// Append-only storage for executed searches.
#[async_trait]
pub trait SearchLogStore: Send + Sync {
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError>;

    /// Per-query aggregates over entries searched at or after `since`,
    /// most searched first.
    async fn aggregate_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SearchAnalyticsRow>, SearchLogError>;
}

#[derive(Debug, Default)]
pub struct MemorySearchLogStore {
    entries: RwLock<Vec<SearchLogEntry>>,
}

impl MemorySearchLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<SearchLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SearchLogStore for MemorySearchLogStore {
    async fn append(&self, entry: &SearchLogEntry) -> Result<(), SearchLogError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn aggregate_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SearchAnalyticsRow>, SearchLogError> {
        let entries = self.entries.read().await;
        Ok(aggregate(entries.iter().filter(|entry| entry.searched_at >= since)))
    }
}

struct QueryTotals {
    count: i64,
    results: i64,
    last_searched: DateTime<Utc>,
}

fn aggregate<'a>(
    entries: impl Iterator<Item = &'a SearchLogEntry>,
) -> Vec<SearchAnalyticsRow> {
    let mut groups: HashMap<&'a str, QueryTotals> = HashMap::new();
    for entry in entries {
        let totals = groups.entry(entry.query.as_str()).or_insert(QueryTotals {
            count: 0,
            results: 0,
            last_searched: entry.searched_at,
        });
        totals.count += 1;
        totals.results += i64::from(entry.results_count);
        totals.last_searched = totals.last_searched.max(entry.searched_at);
    }
    let mut rows: Vec<SearchAnalyticsRow> = groups
        .into_iter()
        .map(|(query, totals)| SearchAnalyticsRow {
            query: query.to_string(),
            search_count: totals.count,
            avg_results_count: totals.results as f64 / totals.count as f64,
            last_searched: totals.last_searched,
        })
        .collect();
    rows.sort_by(|left, right| {
        right
            .search_count
            .cmp(&left.search_count)
            .then_with(|| right.last_searched.cmp(&left.last_searched))
            .then_with(|| left.query.cmp(&right.query))
    });
    rows
}
