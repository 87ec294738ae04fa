use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shopsearch_core::domain::catalog::{CatalogBrand, CatalogCategory, CatalogProduct};
use shopsearch_core::domain::search::SearchDocument;
use shopsearch_core::text::TokenizedDocument;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{CatalogError, CatalogSource};
use crate::search::document_store::{DocumentStore, StoreError};

const TAXONOMY_DEPTH: usize = 4;
const MAX_CATEGORY_DEPTH: usize = 32;

const WEIGHT_NAME: u32 = 4;
const WEIGHT_PRIMARY: u32 = 3;
const WEIGHT_SECONDARY: u32 = 2;
const WEIGHT_BODY: u32 = 1;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub products: usize,
    pub indexed: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRefresh {
    Indexed,
    Removed,
    Absent,
}

/// Recomputes search documents from the canonical catalog.
pub struct IndexBuilder {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<DocumentStore>,
}

impl IndexBuilder {
    pub fn new(catalog: Arc<dyn CatalogSource>, store: Arc<DocumentStore>) -> Self {
        Self { catalog, store }
    }

    /// Full rebuild. The catalog is read completely before the store is
    /// touched, so a catalog failure leaves the current documents in place.
    pub async fn rebuild(&self) -> Result<BuildStats, BuildError> {
        let products = self.catalog.list_products().await?;
        let brands = self.catalog.list_brands().await?;
        let categories = self.catalog.list_categories().await?;
        debug!(
            products = products.len(),
            brands = brands.len(),
            categories = categories.len(),
            "catalog loaded"
        );

        let documents = assemble_documents(&products, &brands, &categories, Utc::now());
        let incoming: HashSet<i64> = documents.iter().map(|doc| doc.product_id).collect();
        let removed = self
            .store
            .snapshot()
            .documents()
            .iter()
            .filter(|doc| !incoming.contains(&doc.product_id))
            .count();
        let stats = BuildStats {
            products: products.len(),
            indexed: documents.len(),
            removed,
        };
        self.store.replace_all(documents)?;
        info!(?stats, "search index rebuilt");
        Ok(stats)
    }

    /// Rebuilds a single product's document, dropping it when the product
    /// no longer exists in the catalog.
    pub async fn rebuild_product(&self, product_id: i64) -> Result<ProductRefresh, BuildError> {
        let Some(product) = self.catalog.get_product(product_id).await? else {
            let valid: HashSet<i64> = self
                .store
                .snapshot()
                .documents()
                .iter()
                .map(|doc| doc.product_id)
                .filter(|id| *id != product_id)
                .collect();
            let removed = self.store.delete_missing(&valid)?;
            return Ok(if removed > 0 {
                ProductRefresh::Removed
            } else {
                ProductRefresh::Absent
            });
        };
        let brands = self.catalog.list_brands().await?;
        let categories = self.catalog.list_categories().await?;
        let brand_names = brand_lookup(&brands);
        let taxonomy = CategoryTree::new(&categories);
        let document = assemble_document(&product, &brand_names, &taxonomy, Utc::now());
        self.store.upsert_all(vec![document])?;
        Ok(ProductRefresh::Indexed)
    }
}

pub fn assemble_documents(
    products: &[CatalogProduct],
    brands: &[CatalogBrand],
    categories: &[CatalogCategory],
    now: DateTime<Utc>,
) -> Vec<SearchDocument> {
    let brand_names = brand_lookup(brands);
    let taxonomy = CategoryTree::new(categories);
    let mut documents: Vec<SearchDocument> = products
        .iter()
        .map(|product| assemble_document(product, &brand_names, &taxonomy, now))
        .collect();
    documents.sort_by_key(|doc| doc.product_id);
    documents
}

fn brand_lookup(brands: &[CatalogBrand]) -> HashMap<i64, &str> {
    brands
        .iter()
        .map(|brand| (brand.id, brand.name.as_str()))
        .collect()
}

fn assemble_document(
    product: &CatalogProduct,
    brand_names: &HashMap<i64, &str>,
    taxonomy: &CategoryTree<'_>,
    now: DateTime<Utc>,
) -> SearchDocument {
    let brand_name = product
        .brand_id
        .and_then(|id| brand_names.get(&id))
        .map(|name| name.to_string());
    let category_name = product
        .category_id
        .and_then(|id| taxonomy.name(id))
        .map(str::to_string);
    let mut levels = product
        .category_id
        .map(|id| taxonomy.path(id))
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string);
    let category_level1 = levels.next();
    let category_level2 = levels.next();
    let category_level3 = levels.next();
    let category_level4 = levels.next();
    let tags = normalize_tags(&product.tags);
    let keywords = product
        .keywords
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let mut weighted: Vec<(&str, u32)> = vec![(product.name.as_str(), WEIGHT_NAME)];
    let optional = [
        (product.title.as_deref(), WEIGHT_PRIMARY),
        (brand_name.as_deref(), WEIGHT_PRIMARY),
        (category_name.as_deref(), WEIGHT_SECONDARY),
        (category_level1.as_deref(), WEIGHT_SECONDARY),
        (category_level2.as_deref(), WEIGHT_SECONDARY),
        (category_level3.as_deref(), WEIGHT_SECONDARY),
        (category_level4.as_deref(), WEIGHT_SECONDARY),
        (product.short_description.as_deref(), WEIGHT_BODY),
        (product.description.as_deref(), WEIGHT_BODY),
        (keywords.as_deref(), WEIGHT_BODY),
        (product.sku.as_deref(), WEIGHT_BODY),
    ];
    weighted.extend(
        optional
            .into_iter()
            .filter_map(|(value, weight)| value.map(|value| (value, weight))),
    );
    weighted.extend(tags.iter().map(|tag| (tag.as_str(), WEIGHT_SECONDARY)));
    let tokenized_document = TokenizedDocument::from_weighted_fields(weighted);

    SearchDocument {
        product_id: product.id,
        name: product.name.clone(),
        title: product.title.clone(),
        description: product.description.clone(),
        short_description: product.short_description.clone(),
        brand_name,
        brand_id: product.brand_id,
        category_name,
        category_id: product.category_id,
        category_level1,
        category_level2,
        category_level3,
        category_level4,
        tags,
        keywords,
        price: product.price,
        sale_price: product.sale_price,
        sku: product.sku.clone(),
        barcode: product.barcode.clone(),
        status: product.status,
        is_active: product.is_active,
        tokenized_document,
        search_rank: None,
        created_at: product.created_at,
        updated_at: now.max(product.updated_at),
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Category lookup by id with root-first ancestry.
struct CategoryTree<'a> {
    by_id: HashMap<i64, &'a CatalogCategory>,
}

impl<'a> CategoryTree<'a> {
    fn new(categories: &'a [CatalogCategory]) -> Self {
        Self {
            by_id: categories
                .iter()
                .map(|category| (category.id, category))
                .collect(),
        }
    }

    fn name(&self, id: i64) -> Option<&'a str> {
        self.by_id.get(&id).copied().map(|category| category.name.as_str())
    }

    /// Names from the root down to `id`, capped at four levels. Cycles and
    /// dangling parents end the walk.
    fn path(&self, id: i64) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if chain.len() >= MAX_CATEGORY_DEPTH || !seen.insert(current) {
                break;
            }
            let Some(category) = self.by_id.get(&current).copied() else {
                break;
            };
            chain.push(category.name.as_str());
            next = category.parent_id;
        }
        chain.reverse();
        chain.truncate(TAXONOMY_DEPTH);
        chain
    }
}
