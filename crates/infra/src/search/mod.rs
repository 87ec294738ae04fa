pub mod analytics;
pub mod builder;
pub mod document_store;
pub mod filter;
pub mod log_store;
pub mod logger;
pub mod maintenance;
pub mod matcher;
pub mod ranker;
pub mod service;
pub mod suggest;

#[cfg(test)]
pub(crate) mod testing;

pub use analytics::AnalyticsAggregator;
pub use builder::{BuildError, BuildStats, IndexBuilder, ProductRefresh};
pub use document_store::{DocumentStore, StoreError};
pub use log_store::{MemorySearchLogStore, SearchLogError, SearchLogStore};
pub use logger::QueryLogger;
pub use maintenance::{IndexMaintenance, IndexStats, MaintenanceError};
pub use matcher::{MatchError, QueryMatcher, DEFAULT_FUZZY_THRESHOLD};
pub use service::{SearchOutcome, SearchService};
pub use suggest::SuggestionEngine;
