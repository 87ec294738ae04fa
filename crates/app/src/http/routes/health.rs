use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthModules {
    pub index: IndexStatus,
    pub database: ConfiguredStatus,
    pub admin_auth: ConfiguredStatus,
}

#[derive(Debug, Serialize)]
pub struct IndexStatus {
    pub documents: usize,
}

#[derive(Debug, Serialize)]
pub struct ConfiguredStatus {
    pub configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let admin_configured = state
        .config
        .admin_token_secret
        .as_ref()
        .is_some_and(|value| !value.is_empty());

    Json(HealthResponse {
        status: "ok",
        modules: HealthModules {
            index: IndexStatus {
                documents: state.store.count_all(),
            },
            database: ConfiguredStatus {
                configured: state.db.is_some(),
            },
            admin_auth: ConfiguredStatus {
                configured: admin_configured,
            },
        },
    })
}
