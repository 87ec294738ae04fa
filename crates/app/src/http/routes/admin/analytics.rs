use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;
use shopsearch_core::domain::analytics::SearchAnalyticsRow;
use shopsearch_infra::search::analytics::clamp_days_back;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub days_back: Option<i64>,
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<Vec<SearchAnalyticsRow>> {
    let days_back = clamp_days_back(params.days_back);
    Json(state.analytics.analytics(days_back).await)
}
