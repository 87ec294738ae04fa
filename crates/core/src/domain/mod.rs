pub mod analytics;
pub mod catalog;
pub mod search;
pub mod suggestion;
