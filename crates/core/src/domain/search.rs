use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::text::TokenizedDocument;
use crate::types::pagination::Pagination;
use crate::types::price_range::PriceRange;

pub const MAX_QUERY_LEN: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Exact,
    Fuzzy,
    #[default]
    FullText,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Price,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Draft => "draft",
        }
    }
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Exact => "exact",
            SearchType::Fuzzy => "fuzzy",
            SearchType::FullText => "full_text",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "draft" => Ok(ProductStatus::Draft),
            other => Err(CoreError::UnknownVariant {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized, query-ready snapshot of one catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchDocument {
    pub product_id: i64,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub brand_name: Option<String>,
    pub brand_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_level1: Option<String>,
    pub category_level2: Option<String>,
    pub category_level3: Option<String>,
    pub category_level4: Option<String>,
    pub tags: Vec<String>,
    pub keywords: Option<String>,
    pub price: Option<f64>,
    pub sale_price: Option<f64>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub status: ProductStatus,
    pub is_active: bool,
    pub tokenized_document: TokenizedDocument,
    pub search_rank: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchDocument {
    pub fn is_searchable(&self) -> bool {
        self.status == ProductStatus::Active && self.is_active
    }
}

/// Raw, unvalidated search parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryInput {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<SearchType>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: Option<ProductStatus>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub search_type: SearchType,
    pub pagination: Pagination,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub price_range: PriceRange,
    pub status: ProductStatus,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub include_inactive: bool,
}

impl SearchQuery {
    pub fn parse(input: SearchQueryInput) -> Result<Self, CoreError> {
        let query = input.query.unwrap_or_default();
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::EmptyQuery);
        }
        if query.chars().count() > MAX_QUERY_LEN {
            return Err(CoreError::QueryTooLong(MAX_QUERY_LEN));
        }
        Ok(Self {
            query: query.to_string(),
            search_type: input.search_type.unwrap_or_default(),
            pagination: Pagination::new(input.page, input.limit)?,
            category_id: input.category_id,
            brand_id: input.brand_id,
            price_range: PriceRange::new(input.min_price, input.max_price)?,
            status: input.status.unwrap_or_default(),
            sort_by: input.sort_by.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or_default(),
            include_inactive: input.include_inactive.unwrap_or(false),
        })
    }

    pub fn new(query: &str) -> Result<Self, CoreError> {
        Self::parse(SearchQueryInput {
            query: Some(query.to_string()),
            ..SearchQueryInput::default()
        })
    }
}

/// One ranked product in a search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub price: Option<f64>,
    pub sale_price: Option<f64>,
    pub relevance_score: f64,
    pub search_rank: f64,
    pub sku: Option<String>,
    pub tags: Vec<String>,
    pub status: ProductStatus,
}

impl SearchHit {
    pub fn from_document(doc: &SearchDocument, relevance_score: f64, search_rank: f64) -> Self {
        Self {
            id: doc.product_id,
            name: doc.name.clone(),
            title: doc.title.clone(),
            brand_name: doc.brand_name.clone(),
            category_name: doc.category_name.clone(),
            price: doc.price,
            sale_price: doc.sale_price,
            relevance_score,
            search_rank,
            sku: doc.sku.clone(),
            tags: doc.tags.clone(),
            status: doc.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub total: usize,
    pub hits: Vec<SearchHit>,
}
