use chrono::{DateTime, Utc};
use serde::Serialize;

/// One executed search by an identified caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchLogEntry {
    pub user_id: Option<i64>,
    pub query: String,
    pub results_count: i32,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsRow {
    pub query: String,
    pub search_count: i64,
    pub avg_results_count: f64,
    pub last_searched: DateTime<Utc>,
}
