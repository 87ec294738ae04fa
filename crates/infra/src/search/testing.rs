//! Fixtures shared by the search module tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use shopsearch_core::domain::analytics::{SearchAnalyticsRow, SearchLogEntry};
use shopsearch_core::domain::catalog::{CatalogBrand, CatalogCategory, CatalogProduct};
use shopsearch_core::domain::search::{ProductStatus, SearchDocument};
use shopsearch_core::text::TokenizedDocument;

use crate::catalog::CatalogData;
use crate::search::builder::assemble_documents;
use crate::search::document_store::DocumentStore;
use crate::search::log_store::{SearchLogError, SearchLogStore};

/// Log store whose every call fails.
pub struct BrokenLogStore;

#[async_trait]
impl SearchLogStore for BrokenLogStore {
    async fn append(&self, _entry: &SearchLogEntry) -> Result<(), SearchLogError> {
        Err(SearchLogError::Unavailable("disk full".to_string()))
    }

    async fn aggregate_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<Vec<SearchAnalyticsRow>, SearchLogError> {
        Err(SearchLogError::Unavailable("disk full".to_string()))
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn document(product_id: i64, name: &str) -> SearchDocument {
    SearchDocument {
        product_id,
        name: name.to_string(),
        title: None,
        description: None,
        short_description: None,
        brand_name: None,
        brand_id: None,
        category_name: None,
        category_id: None,
        category_level1: None,
        category_level2: None,
        category_level3: None,
        category_level4: None,
        tags: Vec::new(),
        keywords: None,
        price: None,
        sale_price: None,
        sku: None,
        barcode: None,
        status: ProductStatus::Active,
        is_active: true,
        tokenized_document: TokenizedDocument::from_weighted_fields([(name, 4)]),
        search_rank: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn product(id: i64, name: &str, brand_id: i64, price: f64) -> CatalogProduct {
    CatalogProduct {
        id,
        name: name.to_string(),
        title: None,
        description: Some(format!("{name} shoes")),
        short_description: None,
        brand_id: Some(brand_id),
        category_id: Some(3),
        tags: vec!["running".to_string(), "Sport".to_string()],
        keywords: None,
        price: Some(price),
        sale_price: None,
        sku: Some(format!("SKU-{id}")),
        barcode: None,
        status: ProductStatus::Active,
        is_active: true,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Nike Air Max (1), Nike Air Force (2) and Puma Runner (3), all active
/// shoes under Apparel > Footwear > Shoes.
pub fn seed_catalog() -> CatalogData {
    CatalogData {
        products: vec![
            product(1, "Nike Air Max", 1, 120.0),
            product(2, "Nike Air Force", 1, 90.0),
            product(3, "Puma Runner", 2, 80.0),
        ],
        brands: vec![
            CatalogBrand {
                id: 1,
                name: "Nike".to_string(),
            },
            CatalogBrand {
                id: 2,
                name: "Puma".to_string(),
            },
        ],
        categories: vec![
            CatalogCategory {
                id: 1,
                name: "Apparel".to_string(),
                parent_id: None,
            },
            CatalogCategory {
                id: 2,
                name: "Footwear".to_string(),
                parent_id: Some(1),
            },
            CatalogCategory {
                id: 3,
                name: "Shoes".to_string(),
                parent_id: Some(2),
            },
        ],
    }
}

pub fn seeded_store() -> Arc<DocumentStore> {
    let catalog = seed_catalog();
    let store = DocumentStore::new().unwrap();
    let documents = assemble_documents(
        &catalog.products,
        &catalog.brands,
        &catalog.categories,
        fixed_time(),
    );
    store.replace_all(documents).unwrap();
    Arc::new(store)
}
