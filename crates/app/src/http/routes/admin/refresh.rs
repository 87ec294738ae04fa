use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::state::AppState;
use shopsearch_infra::search::{BuildStats, MaintenanceError, ProductRefresh};

#[derive(Debug, Error)]
pub enum RefreshApiError {
    #[error("{0}")]
    Maintenance(#[from] MaintenanceError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    message: &'static str,
    stats: RefreshStats,
}

#[derive(Debug, Serialize)]
pub struct RefreshStats {
    products: usize,
    indexed: usize,
    removed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRefreshResponse {
    message: &'static str,
    product_id: i64,
    outcome: &'static str,
}

pub async fn post_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, RefreshApiError> {
    let stats = state.maintenance.refresh().await?;
    info!(?stats, "search index refresh requested by admin");
    Ok(Json(RefreshResponse {
        message: "Search index refreshed successfully",
        stats: map_stats(stats),
    }))
}

pub async fn post_refresh_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductRefreshResponse>, RefreshApiError> {
    let outcome = state.maintenance.refresh_product(product_id).await?;
    Ok(Json(ProductRefreshResponse {
        message: "Search document refreshed successfully",
        product_id,
        outcome: describe_outcome(outcome),
    }))
}

fn map_stats(stats: BuildStats) -> RefreshStats {
    RefreshStats {
        products: stats.products,
        indexed: stats.indexed,
        removed: stats.removed,
    }
}

fn describe_outcome(outcome: ProductRefresh) -> &'static str {
    match outcome {
        ProductRefresh::Indexed => "indexed",
        ProductRefresh::Removed => "removed",
        ProductRefresh::Absent => "absent",
    }
}

impl IntoResponse for RefreshApiError {
    fn into_response(self) -> axum::response::Response {
        let RefreshApiError::Maintenance(err) = &self;
        let (status, message) = match err {
            MaintenanceError::RefreshInProgress => (StatusCode::CONFLICT, err.to_string()),
            MaintenanceError::Build(cause) => {
                error!(error = %cause, "search index refresh failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "search index refresh failed".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshApiError;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use shopsearch_infra::catalog::CatalogError;
    use shopsearch_infra::search::{BuildError, MaintenanceError};

    #[test]
    fn concurrent_refresh_maps_to_conflict() {
        let response = RefreshApiError::from(MaintenanceError::RefreshInProgress).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn build_failure_maps_to_generic_server_error() {
        let cause = CatalogError::Unavailable("catalog db down".to_string());
        let err = RefreshApiError::from(MaintenanceError::Build(BuildError::Catalog(cause)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "search index refresh failed"}));
    }
}
