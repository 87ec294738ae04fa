use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use shopsearch_core::domain::catalog::{CatalogBrand, CatalogCategory, CatalogProduct};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog seed: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("invalid catalog row: {0}")]
    InvalidRow(String),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the canonical product, brand and category stores.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError>;
    async fn get_product(&self, product_id: i64) -> Result<Option<CatalogProduct>, CatalogError>;
    async fn list_brands(&self) -> Result<Vec<CatalogBrand>, CatalogError>;
    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
    #[serde(default)]
    pub brands: Vec<CatalogBrand>,
    #[serde(default)]
    pub categories: Vec<CatalogCategory>,
}

/// Catalog held in memory, loaded from a JSON seed file or built directly.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    data: RwLock<CatalogData>,
}

impl MemoryCatalog {
    pub fn new(data: CatalogData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let data: CatalogData = serde_json::from_str(&contents)?;
        Ok(Self::new(data))
    }

    pub fn upsert_product(&self, product: CatalogProduct) -> Result<(), CatalogError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.products.retain(|existing| existing.id != product.id);
        data.products.push(product);
        Ok(())
    }

    pub fn remove_product(&self, product_id: i64) -> Result<(), CatalogError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.products.retain(|existing| existing.id != product_id);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogData) -> T) -> Result<T, CatalogError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(f(&data))
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        self.read(|data| data.products.clone())
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<CatalogProduct>, CatalogError> {
        self.read(|data| {
            data.products
                .iter()
                .find(|product| product.id == product_id)
                .cloned()
        })
    }

    async fn list_brands(&self) -> Result<Vec<CatalogBrand>, CatalogError> {
        self.read(|data| data.brands.clone())
    }

    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError> {
        self.read(|data| data.categories.clone())
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Unavailable("catalog lock poisoned".to_string())
}
