use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::http::middleware::caller_identity::CallerIdentity;
use crate::state::AppState;
use shopsearch_core::domain::search::{SearchHit, SearchQuery, SearchQueryInput, SearchType};
use shopsearch_core::error::CoreError;
use shopsearch_core::types::price_range::PriceRange;
use shopsearch_infra::search::{MatchError, SearchOutcome};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<SearchHit>,
    pub meta: SearchMeta,
    pub filters: AppliedFilters,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
    pub query: String,
    pub search_type: SearchType,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    pub availability: &'static str,
}

#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("{0}")]
    Invalid(#[from] CoreError),
    #[error("{0}")]
    Malformed(String),
    #[error("search operation failed")]
    Execution(#[from] MatchError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn get_search(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    input: Result<Query<SearchQueryInput>, QueryRejection>,
) -> Result<Json<SearchResponse>, SearchApiError> {
    let Query(input) = input?;
    run_search(&state, caller, input)
}

pub async fn post_search(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    input: Result<Json<SearchQueryInput>, JsonRejection>,
) -> Result<Json<SearchResponse>, SearchApiError> {
    let Json(input) = input?;
    run_search(&state, caller, input)
}

fn run_search(
    state: &AppState,
    caller: CallerIdentity,
    input: SearchQueryInput,
) -> Result<Json<SearchResponse>, SearchApiError> {
    let query = SearchQuery::parse(input)?;
    debug!(query = %query.query, search_type = %query.search_type, "search request");
    let outcome = state.search.search(&query, caller.user_id)?;
    Ok(Json(build_response(&query, outcome)))
}

fn build_response(query: &SearchQuery, outcome: SearchOutcome) -> SearchResponse {
    let total = outcome.result.total;
    SearchResponse {
        meta: SearchMeta {
            page: query.pagination.page,
            limit: query.pagination.limit,
            total,
            total_pages: query.pagination.total_pages(total),
            query: query.query.clone(),
            search_type: query.search_type,
            execution_time_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
        },
        filters: applied_filters(query),
        data: outcome.result.hits,
        suggestions: outcome.suggestions,
    }
}

fn applied_filters(query: &SearchQuery) -> AppliedFilters {
    AppliedFilters {
        category_ids: query.category_id.map(|id| vec![id]),
        brand_ids: query.brand_id.map(|id| vec![id]),
        price_range: (!query.price_range.is_unbounded()).then_some(query.price_range),
        availability: if query.include_inactive {
            "inactive"
        } else {
            "active"
        },
    }
}

impl From<QueryRejection> for SearchApiError {
    fn from(rejection: QueryRejection) -> Self {
        SearchApiError::Malformed(rejection.body_text())
    }
}

impl From<JsonRejection> for SearchApiError {
    fn from(rejection: JsonRejection) -> Self {
        SearchApiError::Malformed(rejection.body_text())
    }
}

impl IntoResponse for SearchApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            SearchApiError::Invalid(_) | SearchApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            SearchApiError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
