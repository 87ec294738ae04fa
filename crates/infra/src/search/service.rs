use std::sync::Arc;
use std::time::{Duration, Instant};

use shopsearch_core::domain::search::{SearchQuery, SearchResult};
use tracing::error;

use crate::search::document_store::DocumentStore;
use crate::search::logger::QueryLogger;
use crate::search::matcher::{MatchError, QueryMatcher};
use crate::search::suggest::SuggestionEngine;

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: SearchResult,
    pub suggestions: Vec<String>,
    pub elapsed: Duration,
}

/// Runs a search end to end: match and rank, attach related suggestions,
/// and log the query for identified callers. Only the match step can fail
/// the request.
pub struct SearchService {
    matcher: QueryMatcher,
    suggestions: SuggestionEngine,
    logger: QueryLogger,
    response_suggestions: usize,
}

impl SearchService {
    pub fn new(
        store: Arc<DocumentStore>,
        logger: QueryLogger,
        fuzzy_threshold: f64,
        response_suggestions: usize,
    ) -> Self {
        Self {
            matcher: QueryMatcher::new(store.clone(), fuzzy_threshold),
            suggestions: SuggestionEngine::new(store),
            logger,
            response_suggestions,
        }
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn search(
        &self,
        query: &SearchQuery,
        user_id: Option<i64>,
    ) -> Result<SearchOutcome, MatchError> {
        let started = Instant::now();
        let result = self.matcher.search(query).inspect_err(|err| {
            error!(error = %err, query = %query.query, "search execution failed");
        })?;
        let suggestions = self
            .suggestions
            .suggest_simple(&query.query, self.response_suggestions);
        self.logger
            .log_if_identified(user_id, &query.query, result.hits.len());
        Ok(SearchOutcome {
            result,
            suggestions,
            elapsed: started.elapsed(),
        })
    }
}
