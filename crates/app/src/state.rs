use std::sync::Arc;

use crate::config::AppConfig;
use shopsearch_infra::db::DbPool;
use shopsearch_infra::search::{
    AnalyticsAggregator, DocumentStore, IndexMaintenance, SearchService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DocumentStore>,
    pub search: Arc<SearchService>,
    pub maintenance: Arc<IndexMaintenance>,
    pub analytics: Arc<AnalyticsAggregator>,
    pub db: Option<DbPool>,
}
