use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("query too long (max {0} chars)")]
    QueryTooLong(usize),
    #[error("invalid price range: minPrice {min} is greater than maxPrice {max}")]
    InvertedPriceRange { min: f64, max: f64 },
    #[error("invalid price: {0}")]
    InvalidPrice(f64),
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be between 1 and {max}, got {got}")]
    InvalidLimit { got: u32, max: u32 },
    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}
