use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::catalog::CatalogSource;
use crate::search::builder::{BuildError, BuildStats, IndexBuilder, ProductRefresh};
use crate::search::document_store::DocumentStore;

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("refresh already in progress")]
    RefreshInProgress,
    #[error("index build failed: {0}")]
    Build(#[from] BuildError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_documents: usize,
    pub active_documents: usize,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub approximate_size_descriptor: String,
}

/// Admin-facing index operations. Refreshes are exclusive: a second full
/// refresh while one runs is rejected, single-product refreshes queue
/// behind it.
pub struct IndexMaintenance {
    builder: IndexBuilder,
    store: Arc<DocumentStore>,
    refresh_gate: Mutex<()>,
}

impl IndexMaintenance {
    pub fn new(catalog: Arc<dyn CatalogSource>, store: Arc<DocumentStore>) -> Self {
        Self {
            builder: IndexBuilder::new(catalog, store.clone()),
            store,
            refresh_gate: Mutex::new(()),
        }
    }

    pub async fn refresh(&self) -> Result<BuildStats, MaintenanceError> {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            warn!("refresh rejected, another refresh is running");
            return Err(MaintenanceError::RefreshInProgress);
        };
        info!("search index refresh started");
        let stats = self.builder.rebuild().await?;
        Ok(stats)
    }

    pub async fn refresh_product(&self, product_id: i64) -> Result<ProductRefresh, MaintenanceError> {
        let _guard = self.refresh_gate.lock().await;
        let outcome = self.builder.rebuild_product(product_id).await?;
        info!(product_id, ?outcome, "search document refreshed");
        Ok(outcome)
    }

    pub fn stats(&self) -> IndexStats {
        let stats = self.store.stats();
        IndexStats {
            total_documents: stats.total_documents,
            active_documents: stats.active_documents,
            last_updated_at: stats.last_updated_at,
            approximate_size_descriptor: stats.approximate_size,
        }
    }
}
