use shopsearch_core::domain::search::{ProductStatus, SearchDocument, SearchQuery};
use shopsearch_core::types::price_range::PriceRange;

/// Structural predicate applied before any strategy scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFilter {
    pub status: ProductStatus,
    pub is_active: bool,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub price_range: PriceRange,
}

impl DocumentFilter {
    pub fn compile(query: &SearchQuery) -> Self {
        Self {
            status: query.status,
            is_active: !query.include_inactive,
            category_id: query.category_id,
            brand_id: query.brand_id,
            price_range: query.price_range,
        }
    }

    pub fn matches(&self, doc: &SearchDocument) -> bool {
        doc.status == self.status
            && doc.is_active == self.is_active
            && self
                .category_id
                .is_none_or(|id| doc.category_id == Some(id))
            && self.brand_id.is_none_or(|id| doc.brand_id == Some(id))
            && self.price_range.contains(doc.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::document;
    use shopsearch_core::domain::search::SearchQueryInput;

    fn query(input: SearchQueryInput) -> SearchQuery {
        SearchQuery::parse(SearchQueryInput {
            query: Some("x".to_string()),
            ..input
        })
        .unwrap()
    }

    #[test]
    fn default_filter_keeps_active_documents_only() {
        let filter = DocumentFilter::compile(&query(SearchQueryInput::default()));
        let mut doc = document(1, "A");
        assert!(filter.matches(&doc));
        doc.is_active = false;
        assert!(!filter.matches(&doc));
        doc.is_active = true;
        doc.status = ProductStatus::Draft;
        assert!(!filter.matches(&doc));
    }

    #[test]
    fn include_inactive_selects_inactive_documents() {
        let filter = DocumentFilter::compile(&query(SearchQueryInput {
            include_inactive: Some(true),
            ..SearchQueryInput::default()
        }));
        let mut doc = document(1, "A");
        assert!(!filter.matches(&doc));
        doc.is_active = false;
        assert!(filter.matches(&doc));
    }

    #[test]
    fn category_brand_and_price_filters_combine() {
        let filter = DocumentFilter::compile(&query(SearchQueryInput {
            category_id: Some(7),
            brand_id: Some(3),
            min_price: Some(50.0),
            max_price: Some(100.0),
            ..SearchQueryInput::default()
        }));
        let mut doc = document(1, "A");
        doc.category_id = Some(7);
        doc.brand_id = Some(3);
        doc.price = Some(90.0);
        assert!(filter.matches(&doc));
        doc.price = Some(120.0);
        assert!(!filter.matches(&doc));
        doc.price = Some(90.0);
        doc.brand_id = Some(4);
        assert!(!filter.matches(&doc));
        doc.brand_id = Some(3);
        doc.category_id = None;
        assert!(!filter.matches(&doc));
    }
}
