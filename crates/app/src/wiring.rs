use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::state::AppState;
use shopsearch_infra::catalog::{CatalogError, CatalogSource, MemoryCatalog};
use shopsearch_infra::db::{connect_lazy, DbPool, DbPoolError, PgCatalog, PgSearchLogStore};
use shopsearch_infra::search::{
    AnalyticsAggregator, DocumentStore, IndexMaintenance, MemorySearchLogStore, QueryLogger,
    SearchLogStore, SearchService, StoreError,
};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("document store error: {0}")]
    Store(#[from] StoreError),
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    if let Some(url) = config.database_url.as_deref() {
        if config.catalog_seed.is_some() {
            warn!("database configured; catalog seed file ignored");
        }
        let pool = connect_lazy(url, config.db_max_connections, config.db_acquire_timeout)?;
        let catalog = Arc::new(PgCatalog::new(pool.clone()));
        let log_store = Arc::new(PgSearchLogStore::new(pool.clone()));
        return assemble(config, catalog, log_store, Some(pool));
    }

    let catalog = match config.catalog_seed.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "loading catalog seed");
            MemoryCatalog::from_json_file(path)?
        }
        None => {
            warn!("no database or catalog seed configured; index will stay empty");
            MemoryCatalog::default()
        }
    };
    warn!("db not configured; search logs kept in memory");
    assemble(
        config,
        Arc::new(catalog),
        Arc::new(MemorySearchLogStore::new()),
        None,
    )
}

pub fn assemble(
    config: AppConfig,
    catalog: Arc<dyn CatalogSource>,
    log_store: Arc<dyn SearchLogStore>,
    db: Option<DbPool>,
) -> Result<AppState, WiringError> {
    let store = Arc::new(DocumentStore::new()?);
    let search = SearchService::new(
        store.clone(),
        QueryLogger::new(log_store.clone()),
        config.fuzzy_threshold,
        config.response_suggestions,
    );
    Ok(AppState {
        config: Arc::new(config),
        maintenance: Arc::new(IndexMaintenance::new(catalog, store.clone())),
        analytics: Arc::new(AnalyticsAggregator::new(log_store)),
        search: Arc::new(search),
        store,
        db,
    })
}
