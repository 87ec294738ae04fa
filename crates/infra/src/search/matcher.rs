use std::collections::BTreeMap;
use std::sync::Arc;

use shopsearch_core::domain::search::{SearchDocument, SearchQuery, SearchResult, SearchType};
use shopsearch_core::text::{contains_ignore_case, trigram_similarity};
use thiserror::Error;
use tracing::debug;

use crate::search::document_store::{DocumentStore, StoreError};
use crate::search::filter::DocumentFilter;
use crate::search::ranker::{
    Candidate, Ranker, PRIORITY_BRAND, PRIORITY_CONTAINS, PRIORITY_NAME, PRIORITY_SKU,
    PRIORITY_TITLE,
};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub struct QueryMatcher {
    store: Arc<DocumentStore>,
    fuzzy_threshold: f64,
}

impl QueryMatcher {
    pub fn new(store: Arc<DocumentStore>, fuzzy_threshold: f64) -> Self {
        Self {
            store,
            fuzzy_threshold,
        }
    }

    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult, MatchError> {
        let snapshot = self.store.snapshot();
        let filter = DocumentFilter::compile(query);
        let ranker = Ranker::for_query(query);
        let skip = query.pagination.skip();
        let take = query.pagination.take();
        let text = query.query.as_str();
        let needle = text.to_lowercase();

        let page = match query.search_type {
            SearchType::Exact => snapshot.query(
                |doc| filter.matches(doc),
                |doc| exact_candidate(doc, &needle),
                &ranker,
                skip,
                take,
            ),
            SearchType::FullText => {
                let ranks = snapshot.term_ranks(text)?;
                snapshot.query(
                    |doc| filter.matches(doc),
                    |doc| full_text_candidate(doc, text, &ranks),
                    &ranker,
                    skip,
                    take,
                )
            }
            SearchType::Fuzzy => snapshot.query(
                |doc| filter.matches(doc),
                |doc| fuzzy_candidate(doc, text, self.fuzzy_threshold),
                &ranker,
                skip,
                take,
            ),
        };

        debug!(
            strategy = %query.search_type,
            total = page.total,
            returned = page.rows.len(),
            snapshot = snapshot.version(),
            "query matched"
        );
        Ok(SearchResult {
            total: page.total,
            hits: page.rows.iter().map(Candidate::to_hit).collect(),
        })
    }
}

fn exact_candidate<'a>(doc: &'a SearchDocument, needle: &str) -> Option<Candidate<'a>> {
    let fields = [
        (Some(doc.name.as_str()), PRIORITY_NAME),
        (doc.title.as_deref(), PRIORITY_TITLE),
        (doc.brand_name.as_deref(), PRIORITY_BRAND),
        (doc.sku.as_deref(), PRIORITY_SKU),
    ];
    let mut matched = false;
    let mut priority = PRIORITY_CONTAINS;
    for (value, field_priority) in fields {
        let Some(value) = value else {
            continue;
        };
        let value = value.to_lowercase();
        if !value.contains(needle) {
            continue;
        }
        matched = true;
        if value == needle {
            priority = priority.min(field_priority);
        }
    }
    matched.then_some(Candidate {
        document: doc,
        relevance_score: 1.0,
        search_rank: 0.0,
        priority,
    })
}

fn full_text_candidate<'a>(
    doc: &'a SearchDocument,
    text: &str,
    ranks: &BTreeMap<i64, f64>,
) -> Option<Candidate<'a>> {
    let search_rank = *ranks.get(&doc.product_id)?;
    Some(Candidate {
        document: doc,
        relevance_score: field_boost(doc, text),
        search_rank,
        priority: PRIORITY_CONTAINS,
    })
}

/// Heuristic confidence by the first field that contains the whole query.
fn field_boost(doc: &SearchDocument, text: &str) -> f64 {
    let contains = |value: Option<&str>| value.is_some_and(|value| contains_ignore_case(value, text));
    if contains(Some(&doc.name)) {
        1.0
    } else if contains(doc.title.as_deref()) {
        0.9
    } else if contains(doc.brand_name.as_deref()) {
        0.8
    } else if contains(doc.category_name.as_deref()) {
        0.7
    } else if doc.tags.iter().any(|tag| contains_ignore_case(tag, text)) {
        0.6
    } else {
        0.5
    }
}

fn fuzzy_candidate<'a>(
    doc: &'a SearchDocument,
    text: &str,
    threshold: f64,
) -> Option<Candidate<'a>> {
    let best = [
        Some(doc.name.as_str()),
        doc.title.as_deref(),
        doc.brand_name.as_deref(),
        doc.sku.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|value| trigram_similarity(text, value))
    .fold(0.0_f64, f64::max);
    (best > threshold).then_some(Candidate {
        document: doc,
        relevance_score: best,
        search_rank: 0.0,
        priority: PRIORITY_CONTAINS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::{document, seeded_store};
    use shopsearch_core::domain::search::{ProductStatus, SearchQueryInput, SortBy, SortOrder};

    fn matcher() -> QueryMatcher {
        QueryMatcher::new(seeded_store(), DEFAULT_FUZZY_THRESHOLD)
    }

    fn run(matcher: &QueryMatcher, input: SearchQueryInput) -> SearchResult {
        matcher.search(&SearchQuery::parse(input).unwrap()).unwrap()
    }

    fn input(query: &str, search_type: SearchType) -> SearchQueryInput {
        SearchQueryInput {
            query: Some(query.to_string()),
            search_type: Some(search_type),
            ..SearchQueryInput::default()
        }
    }

    fn names(result: &SearchResult) -> Vec<&str> {
        result.hits.iter().map(|hit| hit.name.as_str()).collect()
    }

    #[test]
    fn full_text_returns_only_matching_products() {
        let result = run(&matcher(), SearchQueryInput {
            limit: Some(10),
            ..input("nike air", SearchType::FullText)
        });
        assert_eq!(result.total, 2);
        let names = names(&result);
        assert!(names.contains(&"Nike Air Max"));
        assert!(names.contains(&"Nike Air Force"));
        assert!(result.hits.iter().all(|hit| hit.search_rank > 0.0));
    }

    #[test]
    fn full_text_boost_prefers_name_over_brand() {
        let result = run(&matcher(), input("nike", SearchType::FullText));
        assert_eq!(result.total, 2);
        assert!(result.hits.iter().all(|hit| hit.relevance_score == 1.0));

        let result = run(&matcher(), input("runner", SearchType::FullText));
        assert_eq!(names(&result), vec!["Puma Runner"]);
        assert_eq!(result.hits[0].relevance_score, 1.0);
    }

    #[test]
    fn full_text_with_only_punctuation_matches_nothing() {
        let result = run(&matcher(), input("!!", SearchType::FullText));
        assert_eq!(result.total, 0);
        assert!(result.hits.is_empty());
    }

    #[test]
    fn exact_name_equality_ranks_first() {
        let store = seeded_store();
        let mut newer = document(10, "Nike Air Max Pro");
        newer.updated_at = newer.updated_at + chrono::Duration::days(30);
        store.upsert_all(vec![newer]).unwrap();
        let matcher = QueryMatcher::new(store, DEFAULT_FUZZY_THRESHOLD);

        let result = run(&matcher, input("nike air max", SearchType::Exact));
        assert_eq!(result.total, 2);
        assert_eq!(result.hits[0].name, "Nike Air Max");
        assert!(result.hits.iter().all(|hit| hit.relevance_score == 1.0));
    }

    #[test]
    fn exact_matches_sku_and_brand() {
        let result = run(&matcher(), input("sku-3", SearchType::Exact));
        assert_eq!(names(&result), vec!["Puma Runner"]);
        let result = run(&matcher(), input("puma", SearchType::Exact));
        assert_eq!(result.total, 1);
    }

    #[test]
    fn exact_with_unknown_category_returns_nothing() {
        let result = run(&matcher(), SearchQueryInput {
            category_id: Some(9_999),
            ..input("nike", SearchType::Exact)
        });
        assert_eq!(result.total, 0);
        assert!(result.hits.is_empty());
    }

    #[test]
    fn fuzzy_tolerates_typos() {
        let result = run(&matcher(), input("nikee", SearchType::Fuzzy));
        assert_eq!(result.total, 2);
        assert!(result.hits.iter().all(|hit| hit.search_rank == 0.0));
        assert!(result.hits.iter().all(|hit| hit.relevance_score > DEFAULT_FUZZY_THRESHOLD));
        assert!(result.hits[0].relevance_score >= result.hits[1].relevance_score);
    }

    #[test]
    fn fuzzy_rejects_unrelated_text() {
        let result = run(&matcher(), input("zzzz", SearchType::Fuzzy));
        assert_eq!(result.total, 0);
    }

    #[test]
    fn strategies_respect_status_filter() {
        let store = seeded_store();
        let mut hidden = document(20, "Nike Air Hidden");
        hidden.is_active = false;
        let mut draft = document(21, "Nike Air Draft");
        draft.status = ProductStatus::Draft;
        store.upsert_all(vec![hidden, draft]).unwrap();
        let matcher = QueryMatcher::new(store, DEFAULT_FUZZY_THRESHOLD);

        for search_type in [SearchType::Exact, SearchType::FullText, SearchType::Fuzzy] {
            let result = run(&matcher, input("nike air", search_type));
            assert!(result.hits.iter().all(|hit| hit.status == ProductStatus::Active));
            assert!(result.hits.iter().all(|hit| hit.id < 20), "{search_type}");
        }

        let result = run(&matcher, SearchQueryInput {
            include_inactive: Some(true),
            ..input("nike air", SearchType::FullText)
        });
        assert_eq!(names(&result), vec!["Nike Air Hidden"]);
    }

    #[test]
    fn price_filter_and_sort_override() {
        let result = run(&matcher(), SearchQueryInput {
            min_price: Some(85.0),
            sort_by: Some(SortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..input("nike", SearchType::FullText)
        });
        assert_eq!(names(&result), vec!["Nike Air Force", "Nike Air Max"]);

        let result = run(&matcher(), SearchQueryInput {
            max_price: Some(85.0),
            ..input("nike", SearchType::FullText)
        });
        assert_eq!(result.total, 0);
    }

    #[test]
    fn pagination_reports_filtered_total() {
        let result = run(&matcher(), SearchQueryInput {
            limit: Some(1),
            page: Some(2),
            sort_by: Some(SortBy::Name),
            sort_order: Some(SortOrder::Asc),
            ..input("nike", SearchType::Exact)
        });
        assert_eq!(result.total, 2);
        assert_eq!(names(&result), vec!["Nike Air Max"]);

        let result = run(&matcher(), SearchQueryInput {
            limit: Some(10),
            page: Some(5),
            ..input("nike", SearchType::Exact)
        });
        assert_eq!(result.total, 2);
        assert!(result.hits.is_empty());
    }
}
