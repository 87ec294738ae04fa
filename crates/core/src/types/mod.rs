pub mod pagination;
pub mod price_range;
