use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;
use shopsearch_core::domain::suggestion::TypedSuggestion;
use shopsearch_infra::search::suggest::clamp_suggestion_limit;

/// Suggestions never fail the request: a missing or too-short query yields
/// an empty list.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
}

pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<Vec<String>> {
    let limit = clamp_suggestion_limit(params.limit);
    let input = params.query.unwrap_or_default();
    Json(state.search.suggestions().suggest_simple(&input, limit))
}

pub async fn post_suggestions(
    State(state): State<AppState>,
    Json(params): Json<SuggestionParams>,
) -> Json<Vec<TypedSuggestion>> {
    let limit = clamp_suggestion_limit(params.limit);
    let input = params.query.unwrap_or_default();
    Json(state.search.suggestions().suggest_typed(&input, limit))
}
