use std::collections::HashMap;
use std::sync::Arc;

use shopsearch_core::domain::suggestion::{SuggestionType, TypedSuggestion, is_suggestible};
use shopsearch_core::text::trigram_similarity;

use crate::search::document_store::DocumentStore;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;
pub const MAX_SUGGESTION_LIMIT: usize = 50;

/// Autocomplete over active documents.
pub struct SuggestionEngine {
    store: Arc<DocumentStore>,
}

impl SuggestionEngine {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Distinct names, titles, brands and categories containing `input`,
    /// most similar first.
    pub fn suggest_simple(&self, input: &str, limit: usize) -> Vec<String> {
        let input = input.trim();
        if !is_suggestible(input) || limit == 0 {
            return Vec::new();
        }
        let needle = input.to_lowercase();
        let snapshot = self.store.snapshot();
        let mut best = Suggestions::default();
        for doc in snapshot.documents().iter().filter(|doc| doc.is_searchable()) {
            let fields = [
                (Some(doc.name.as_str()), SuggestionType::Product),
                (doc.title.as_deref(), SuggestionType::Product),
                (doc.brand_name.as_deref(), SuggestionType::Brand),
                (doc.category_name.as_deref(), SuggestionType::Category),
            ];
            for (value, kind) in fields {
                if let Some(value) = value {
                    best.offer(input, &needle, value, kind);
                }
            }
        }
        best.into_ranked(limit)
            .into_iter()
            .map(|suggestion| suggestion.suggestion)
            .collect()
    }

    /// Like [`suggest_simple`](Self::suggest_simple) but reports which kind
    /// of field produced each suggestion.
    pub fn suggest_typed(&self, input: &str, limit: usize) -> Vec<TypedSuggestion> {
        let input = input.trim();
        if !is_suggestible(input) || limit == 0 {
            return Vec::new();
        }
        let needle = input.to_lowercase();
        let snapshot = self.store.snapshot();
        let mut best = Suggestions::default();
        for doc in snapshot.documents().iter().filter(|doc| doc.is_searchable()) {
            best.offer(input, &needle, &doc.name, SuggestionType::Product);
            if let Some(brand) = doc.brand_name.as_deref() {
                best.offer(input, &needle, brand, SuggestionType::Brand);
            }
            if let Some(category) = doc.category_name.as_deref() {
                best.offer(input, &needle, category, SuggestionType::Category);
            }
            for tag in &doc.tags {
                best.offer(input, &needle, tag, SuggestionType::Tag);
            }
        }
        best.into_ranked(limit)
    }
}

/// Best candidate per lowercased suggestion text.
#[derive(Default)]
struct Suggestions {
    by_key: HashMap<String, TypedSuggestion>,
}

impl Suggestions {
    fn offer(&mut self, input: &str, needle: &str, value: &str, kind: SuggestionType) {
        let key = value.to_lowercase();
        if !key.contains(needle) {
            return;
        }
        let score = trigram_similarity(input, value);
        let candidate = TypedSuggestion {
            suggestion: value.to_string(),
            suggestion_type: kind,
            relevance_score: score,
        };
        match self.by_key.get(&key) {
            Some(existing) if existing.relevance_score >= score => {}
            _ => {
                self.by_key.insert(key, candidate);
            }
        }
    }

    fn into_ranked(self, limit: usize) -> Vec<TypedSuggestion> {
        let mut ranked: Vec<TypedSuggestion> = self.by_key.into_values().collect();
        ranked.sort_by(|left, right| {
            right
                .relevance_score
                .total_cmp(&left.relevance_score)
                .then_with(|| left.suggestion.cmp(&right.suggestion))
        });
        ranked.truncate(limit);
        ranked
    }
}

pub fn clamp_suggestion_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(value) if value > 0 => value.min(MAX_SUGGESTION_LIMIT),
        _ => DEFAULT_SUGGESTION_LIMIT,
    }
}
