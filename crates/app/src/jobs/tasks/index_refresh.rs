use tracing::info;

use crate::jobs::JobError;
use crate::state::AppState;
use shopsearch_infra::search::BuildStats;

/// One full rebuild of the search index from the catalog.
pub async fn run(state: &AppState) -> Result<BuildStats, JobError> {
    let stats = state.maintenance.refresh().await?;
    info!(
        products = stats.products,
        indexed = stats.indexed,
        removed = stats.removed,
        "index refresh complete"
    );
    Ok(stats)
}
