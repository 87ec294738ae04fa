pub mod scheduler;
pub mod tasks;

use thiserror::Error;
use tracing::{info, warn};

use crate::state::AppState;
use shopsearch_infra::search::MaintenanceError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("index maintenance error: {0}")]
    Maintenance(#[from] MaintenanceError),
}

/// Periodic full refresh. Returns immediately when the interval is zero.
pub async fn start(state: AppState) -> Result<(), JobError> {
    let refresh_interval = state.config.refresh_interval;
    if refresh_interval.is_zero() {
        info!("periodic index refresh disabled");
        return Ok(());
    }

    info!(interval_secs = refresh_interval.as_secs(), "periodic index refresh scheduled");
    scheduler::run_interval("index_refresh", refresh_interval, move || {
        let state = state.clone();
        async move {
            match tasks::index_refresh::run(&state).await {
                Ok(_) => {}
                Err(JobError::Maintenance(MaintenanceError::RefreshInProgress)) => {
                    info!("index refresh skipped, another refresh is running");
                }
                Err(err) => warn!(error = %err, "index refresh failed"),
            }
            Ok(())
        }
    })
    .await
}
