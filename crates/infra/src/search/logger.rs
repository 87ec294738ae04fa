use std::sync::Arc;

use chrono::Utc;
use shopsearch_core::domain::analytics::SearchLogEntry;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::search::log_store::SearchLogStore;

/// Best-effort search logging. Writes run on their own task and failures
/// are reported to the operational log only.
#[derive(Clone)]
pub struct QueryLogger {
    store: Arc<dyn SearchLogStore>,
}

impl QueryLogger {
    pub fn new(store: Arc<dyn SearchLogStore>) -> Self {
        Self { store }
    }

    /// Appends a log row when the caller is known. Anonymous searches are
    /// not logged. The returned handle may be dropped.
    pub fn log_if_identified(
        &self,
        user_id: Option<i64>,
        query: &str,
        results_count: usize,
    ) -> Option<JoinHandle<()>> {
        let user_id = user_id?;
        let entry = SearchLogEntry {
            user_id: Some(user_id),
            query: query.to_string(),
            results_count: i32::try_from(results_count).unwrap_or(i32::MAX),
            searched_at: Utc::now(),
        };
        let store = self.store.clone();
        Some(tokio::spawn(async move {
            match store.append(&entry).await {
                Ok(()) => debug!(user_id, "search logged"),
                Err(err) => warn!(error = %err, user_id, "search log write failed"),
            }
        }))
    }
}
