pub mod catalog_repo;
pub mod migrations;
pub mod pool;
pub mod search_log_repo;

pub use catalog_repo::PgCatalog;
pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbPool, DbPoolError};
pub use search_log_repo::PgSearchLogStore;
