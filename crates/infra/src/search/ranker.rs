use std::cmp::Ordering;

use shopsearch_core::domain::search::{
    SearchDocument, SearchHit, SearchQuery, SearchType, SortBy, SortOrder,
};

/// Exact-match priority when the query equals a field outright.
pub const PRIORITY_NAME: u8 = 0;
pub const PRIORITY_TITLE: u8 = 1;
pub const PRIORITY_BRAND: u8 = 2;
pub const PRIORITY_SKU: u8 = 3;
/// Containment only.
pub const PRIORITY_CONTAINS: u8 = 4;

/// A document that survived filtering, with its strategy scores.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub document: &'a SearchDocument,
    pub relevance_score: f64,
    pub search_rank: f64,
    pub priority: u8,
}

impl Candidate<'_> {
    pub fn to_hit(&self) -> SearchHit {
        SearchHit::from_document(self.document, self.relevance_score, self.search_rank)
    }
}

/// Orders candidates: the strategy's own ordering first, then an explicit
/// price or name sort on top when one was requested.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    pub strategy: SearchType,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Ranker {
    pub fn for_query(query: &SearchQuery) -> Self {
        Self {
            strategy: query.search_type,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
        }
    }

    pub fn sort(&self, candidates: &mut [Candidate<'_>]) {
        candidates.sort_by(|left, right| self.strategy_order(left, right));
        match self.sort_by {
            SortBy::Relevance => {}
            SortBy::Price => {
                candidates.sort_by(|left, right| {
                    compare_prices(left.document.price, right.document.price, self.sort_order)
                });
            }
            SortBy::Name => {
                candidates.sort_by(|left, right| {
                    let ordering = compare_names(&left.document.name, &right.document.name);
                    apply_order(ordering, self.sort_order)
                });
            }
        }
    }

    fn strategy_order(&self, left: &Candidate<'_>, right: &Candidate<'_>) -> Ordering {
        let ordering = match self.strategy {
            SearchType::Exact => left
                .priority
                .cmp(&right.priority)
                .then_with(|| right.document.updated_at.cmp(&left.document.updated_at)),
            SearchType::FullText => right
                .relevance_score
                .total_cmp(&left.relevance_score)
                .then_with(|| right.search_rank.total_cmp(&left.search_rank))
                .then_with(|| right.document.updated_at.cmp(&left.document.updated_at)),
            SearchType::Fuzzy => right.relevance_score.total_cmp(&left.relevance_score),
        };
        ordering.then_with(|| left.document.product_id.cmp(&right.document.product_id))
    }
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Unpriced documents sort last in either direction.
fn compare_prices(left: Option<f64>, right: Option<f64>, order: SortOrder) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => apply_order(left.total_cmp(&right), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::document;
    use chrono::Duration;

    fn candidate(doc: &SearchDocument, relevance: f64, rank: f64, priority: u8) -> Candidate<'_> {
        Candidate {
            document: doc,
            relevance_score: relevance,
            search_rank: rank,
            priority,
        }
    }

    fn ids(candidates: &[Candidate<'_>]) -> Vec<i64> {
        candidates.iter().map(|c| c.document.product_id).collect()
    }

    fn ranker(strategy: SearchType, sort_by: SortBy, sort_order: SortOrder) -> Ranker {
        Ranker {
            strategy,
            sort_by,
            sort_order,
        }
    }

    #[test]
    fn exact_orders_by_priority_then_recency() {
        let a = document(1, "A");
        let mut b = document(2, "B");
        b.updated_at = a.updated_at + Duration::hours(1);
        let c = document(3, "C");
        let mut list = vec![
            candidate(&a, 1.0, 0.0, PRIORITY_CONTAINS),
            candidate(&b, 1.0, 0.0, PRIORITY_CONTAINS),
            candidate(&c, 1.0, 0.0, PRIORITY_NAME),
        ];
        ranker(SearchType::Exact, SortBy::Relevance, SortOrder::Desc).sort(&mut list);
        assert_eq!(ids(&list), vec![3, 2, 1]);
    }

    #[test]
    fn full_text_orders_by_relevance_then_rank() {
        let a = document(1, "A");
        let b = document(2, "B");
        let c = document(3, "C");
        let mut list = vec![
            candidate(&a, 0.5, 9.0, PRIORITY_CONTAINS),
            candidate(&b, 1.0, 1.0, PRIORITY_CONTAINS),
            candidate(&c, 1.0, 2.0, PRIORITY_CONTAINS),
        ];
        ranker(SearchType::FullText, SortBy::Relevance, SortOrder::Desc).sort(&mut list);
        assert_eq!(ids(&list), vec![3, 2, 1]);
    }

    #[test]
    fn price_sort_overrides_strategy_and_keeps_unpriced_last() {
        let mut a = document(1, "A");
        a.price = Some(120.0);
        let mut b = document(2, "B");
        b.price = None;
        let mut c = document(3, "C");
        c.price = Some(80.0);
        let mut list = vec![
            candidate(&a, 1.0, 0.0, PRIORITY_CONTAINS),
            candidate(&b, 0.9, 0.0, PRIORITY_CONTAINS),
            candidate(&c, 0.1, 0.0, PRIORITY_CONTAINS),
        ];
        ranker(SearchType::Fuzzy, SortBy::Price, SortOrder::Asc).sort(&mut list);
        assert_eq!(ids(&list), vec![3, 1, 2]);
        ranker(SearchType::Fuzzy, SortBy::Price, SortOrder::Desc).sort(&mut list);
        assert_eq!(ids(&list), vec![1, 3, 2]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let a = document(1, "banana");
        let b = document(2, "Apple");
        let c = document(3, "cherry");
        let mut list = vec![
            candidate(&a, 1.0, 0.0, PRIORITY_CONTAINS),
            candidate(&b, 1.0, 0.0, PRIORITY_CONTAINS),
            candidate(&c, 1.0, 0.0, PRIORITY_CONTAINS),
        ];
        ranker(SearchType::FullText, SortBy::Name, SortOrder::Asc).sort(&mut list);
        assert_eq!(ids(&list), vec![2, 1, 3]);
    }
}
