use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopsearch_core::domain::catalog::{CatalogBrand, CatalogCategory, CatalogProduct};
use shopsearch_core::domain::search::ProductStatus;
use sqlx::PgPool;

use crate::catalog::{CatalogError, CatalogSource};

// The catalog tables belong to other services; cast every column whose
// storage type may differ from what the row structs decode (INT4 keys,
// NUMERIC prices, an ENUM status, plain TIMESTAMP columns).
const PRODUCT_COLUMNS: &str = r#"
    id::bigint AS id,
    name,
    title,
    description,
    short_description,
    brand_id::bigint AS brand_id,
    category_id::bigint AS category_id,
    COALESCE(tags, '{}')::text[] AS tags,
    keywords,
    price::double precision AS price,
    sale_price::double precision AS sale_price,
    sku,
    barcode,
    status::text AS status,
    is_active,
    created_at::timestamptz AS created_at,
    updated_at::timestamptz AS updated_at
"#;

const BRANDS_SQL: &str = "SELECT id::bigint AS id, name FROM brands ORDER BY id";

const CATEGORIES_SQL: &str = "SELECT id::bigint AS id, name, parent_id::bigint AS parent_id \
     FROM categories ORDER BY id";

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    title: Option<String>,
    description: Option<String>,
    short_description: Option<String>,
    brand_id: Option<i64>,
    category_id: Option<i64>,
    tags: Vec<String>,
    keywords: Option<String>,
    price: Option<f64>,
    sale_price: Option<f64>,
    sku: Option<String>,
    barcode: Option<String>,
    status: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct BrandRow {
    id: i64,
    name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
}

/// Reads the catalog tables owned by the product, brand and category
/// services.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(map_product).collect()
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<CatalogProduct>, CatalogError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_product).transpose()
    }

    async fn list_brands(&self) -> Result<Vec<CatalogBrand>, CatalogError> {
        let rows = sqlx::query_as::<_, BrandRow>(BRANDS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| CatalogBrand {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<CatalogCategory>, CatalogError> {
        let rows = sqlx::query_as::<_, CategoryRow>(CATEGORIES_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| CatalogCategory {
                id: row.id,
                name: row.name,
                parent_id: row.parent_id,
            })
            .collect())
    }
}

fn map_product(row: ProductRow) -> Result<CatalogProduct, CatalogError> {
    let status: ProductStatus = row
        .status
        .parse()
        .map_err(|_| CatalogError::InvalidRow(format!("product {}: status {}", row.id, row.status)))?;
    Ok(CatalogProduct {
        id: row.id,
        name: row.name,
        title: row.title,
        description: row.description,
        short_description: row.short_description,
        brand_id: row.brand_id,
        category_id: row.category_id,
        tags: row.tags,
        keywords: row.keywords,
        price: row.price,
        sale_price: row.sale_price,
        sku: row.sku,
        barcode: row.barcode,
        status,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
