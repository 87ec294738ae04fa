use std::sync::Arc;

use chrono::{Duration, Utc};
use shopsearch_core::domain::analytics::SearchAnalyticsRow;
use tracing::warn;

use crate::search::log_store::{SearchLogError, SearchLogStore};

pub const DEFAULT_DAYS_BACK: i64 = 7;
pub const MAX_DAYS_BACK: i64 = 365;

pub struct AnalyticsAggregator {
    store: Arc<dyn SearchLogStore>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn SearchLogStore>) -> Self {
        Self { store }
    }

    /// Query popularity over the last `days_back` days. A failing log store
    /// degrades to an empty report.
    pub async fn analytics(&self, days_back: i64) -> Vec<SearchAnalyticsRow> {
        match self.try_analytics(days_back).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, days_back, "search analytics unavailable");
                Vec::new()
            }
        }
    }

    /// `days_back` is forced into `1..=MAX_DAYS_BACK`.
    pub async fn try_analytics(
        &self,
        days_back: i64,
    ) -> Result<Vec<SearchAnalyticsRow>, SearchLogError> {
        let since = Utc::now() - Duration::days(days_back.clamp(1, MAX_DAYS_BACK));
        self.store.aggregate_since(since).await
    }
}

pub fn clamp_days_back(days_back: Option<i64>) -> i64 {
    match days_back {
        Some(value) if value > 0 => value.min(MAX_DAYS_BACK),
        _ => DEFAULT_DAYS_BACK,
    }
}
