use axum::extract::State;
use axum::Json;

use crate::state::AppState;
use shopsearch_infra::search::IndexStats;

pub async fn get_stats(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.maintenance.stats())
}
