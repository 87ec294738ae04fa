pub mod analytics;
pub mod refresh;
pub mod stats;
