use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use shopsearch_core::domain::search::SearchDocument;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, SchemaBuilder, TextFieldIndexing, TextOptions, Value, STORED,
};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use thiserror::Error;

use crate::search::ranker::{Candidate, Ranker};

const TERMS_FIELD: &str = "terms";
const POSITION_FIELD: &str = "position";
const WRITER_MEMORY_BYTES: usize = 15_000_000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
    #[error("missing field in schema: {0}")]
    MissingField(&'static str),
    #[error("missing stored value: {0}")]
    MissingValue(&'static str),
    #[error("stored position {0} out of range")]
    PositionOutOfRange(u64),
    #[error("store writer lock poisoned")]
    WriterPoisoned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total_documents: usize,
    pub active_documents: usize,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub approximate_size: String,
    pub version: u64,
}

/// Process-wide search documents.
///
/// Readers take an immutable [`IndexSnapshot`]; every write builds a new
/// snapshot off to the side and publishes it with a single pointer swap, so a
/// reader sees either the old or the new document set, never a mix. Writes
/// are serialized by `writer`.
pub struct DocumentStore {
    current: ArcSwap<IndexSnapshot>,
    writer: Mutex<()>,
}

pub struct IndexSnapshot {
    documents: Vec<SearchDocument>,
    text: TextIndex,
    version: u64,
}

pub struct StorePage<'a> {
    pub rows: Vec<Candidate<'a>>,
    pub total: usize,
}

struct TextIndex {
    reader: IndexReader,
    analyzer: TextAnalyzer,
    terms: Field,
    position: Field,
}

impl DocumentStore {
    pub fn new() -> Result<Self, StoreError> {
        let empty = IndexSnapshot::build(Vec::new(), 0)?;
        Ok(Self {
            current: ArcSwap::from_pointee(empty),
            writer: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.load_full()
    }

    /// Replaces every document with `documents`.
    pub fn replace_all(&self, documents: Vec<SearchDocument>) -> Result<(), StoreError> {
        let _guard = self.writer.lock().map_err(|_| StoreError::WriterPoisoned)?;
        let version = self.current.load().version + 1;
        let next = IndexSnapshot::build(documents, version)?;
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// Inserts or overwrites documents by product id.
    pub fn upsert_all(&self, documents: Vec<SearchDocument>) -> Result<(), StoreError> {
        if documents.is_empty() {
            return Ok(());
        }
        let _guard = self.writer.lock().map_err(|_| StoreError::WriterPoisoned)?;
        let current = self.current.load_full();
        let mut merged: BTreeMap<i64, SearchDocument> = current
            .documents
            .iter()
            .map(|doc| (doc.product_id, doc.clone()))
            .collect();
        for doc in documents {
            merged.insert(doc.product_id, doc);
        }
        let next = IndexSnapshot::build(merged.into_values().collect(), current.version + 1)?;
        self.current.store(Arc::new(next));
        Ok(())
    }

    /// Drops documents whose product id is not in `valid_ids`; returns how
    /// many were removed.
    pub fn delete_missing(&self, valid_ids: &HashSet<i64>) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().map_err(|_| StoreError::WriterPoisoned)?;
        let current = self.current.load_full();
        let kept: Vec<SearchDocument> = current
            .documents
            .iter()
            .filter(|doc| valid_ids.contains(&doc.product_id))
            .cloned()
            .collect();
        let removed = current.documents.len() - kept.len();
        if removed == 0 {
            return Ok(0);
        }
        let next = IndexSnapshot::build(kept, current.version + 1)?;
        self.current.store(Arc::new(next));
        Ok(removed)
    }

    pub fn count_all(&self) -> usize {
        self.current.load().documents.len()
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.current.load().last_updated_at()
    }

    pub fn approximate_size_descriptor(&self) -> String {
        self.current.load().approximate_size_descriptor()
    }

    pub fn stats(&self) -> StoreStats {
        let snapshot = self.snapshot();
        StoreStats {
            total_documents: snapshot.documents.len(),
            active_documents: snapshot
                .documents
                .iter()
                .filter(|doc| doc.is_searchable())
                .count(),
            last_updated_at: snapshot.last_updated_at(),
            approximate_size: snapshot.approximate_size_descriptor(),
            version: snapshot.version,
        }
    }
}

impl IndexSnapshot {
    fn build(mut documents: Vec<SearchDocument>, version: u64) -> Result<Self, StoreError> {
        documents.sort_by_key(|doc| doc.product_id);
        documents.dedup_by_key(|doc| doc.product_id);
        let text = TextIndex::build(&documents)?;
        Ok(Self {
            documents,
            text,
            version,
        })
    }

    pub fn documents(&self) -> &[SearchDocument] {
        &self.documents
    }

    pub fn get(&self, product_id: i64) -> Option<&SearchDocument> {
        self.documents
            .binary_search_by_key(&product_id, |doc| doc.product_id)
            .ok()
            .map(|idx| &self.documents[idx])
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Term-frequency rank per product id for documents containing every
    /// term of `text`, analyzed with the index's own tokenizer. Text with no
    /// indexable terms matches nothing.
    pub fn term_ranks(&self, text: &str) -> Result<BTreeMap<i64, f64>, StoreError> {
        let mut ranks = BTreeMap::new();
        for (position, score) in self.text.rank(text)? {
            let doc = self
                .documents
                .get(position)
                .ok_or(StoreError::PositionOutOfRange(position as u64))?;
            ranks.insert(doc.product_id, f64::from(score));
        }
        Ok(ranks)
    }

    /// Filters, scores, orders and paginates in one pass over the snapshot.
    ///
    /// `score` returning `None` drops the document from the candidate set.
    /// `total` counts every candidate before pagination.
    pub fn query<'a, P, S>(
        &'a self,
        predicate: P,
        score: S,
        ranker: &Ranker,
        skip: usize,
        limit: usize,
    ) -> StorePage<'a>
    where
        P: Fn(&SearchDocument) -> bool,
        S: Fn(&'a SearchDocument) -> Option<Candidate<'a>>,
    {
        let mut candidates: Vec<Candidate<'a>> = self
            .documents
            .iter()
            .filter(|doc| predicate(*doc))
            .filter_map(&score)
            .collect();
        let total = candidates.len();
        ranker.sort(&mut candidates);
        let rows = candidates.into_iter().skip(skip).take(limit).collect();
        StorePage { rows, total }
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.documents.iter().map(|doc| doc.updated_at).max()
    }

    pub fn approximate_size_descriptor(&self) -> String {
        let bytes: usize = self.documents.iter().map(approximate_document_bytes).sum();
        describe_bytes(bytes)
    }
}

impl TextIndex {
    fn build(documents: &[SearchDocument]) -> Result<Self, StoreError> {
        let schema = build_schema();
        let terms = schema
            .get_field(TERMS_FIELD)
            .map_err(|_| StoreError::MissingField(TERMS_FIELD))?;
        let position = schema
            .get_field(POSITION_FIELD)
            .map_err(|_| StoreError::MissingField(POSITION_FIELD))?;

        let index = Index::create_in_ram(schema);
        let analyzer = index.tokenizer_for_field(terms)?;
        let mut writer: IndexWriter<TantivyDocument> =
            index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        for (idx, doc) in documents.iter().enumerate() {
            let mut document = TantivyDocument::default();
            document.add_text(terms, doc.tokenized_document.to_index_text());
            document.add_u64(position, idx as u64);
            writer.add_document(document)?;
        }
        writer.commit()?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            reader,
            analyzer,
            terms,
            position,
        })
    }

    fn rank(&self, text: &str) -> Result<Vec<(usize, f32)>, StoreError> {
        let searcher = self.reader.searcher();
        let num_docs = searcher.num_docs() as usize;
        let terms = self.query_terms(text);
        if terms.is_empty() || num_docs == 0 {
            return Ok(Vec::new());
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in &terms {
            let term = Term::from_field_text(self.terms, term);
            let term_query = TermQuery::new(term, IndexRecordOption::WithFreqs);
            clauses.push((Occur::Must, Box::new(term_query)));
        }
        let query = BooleanQuery::from(clauses);

        let docs = searcher.search(&query, &TopDocs::with_limit(num_docs))?;
        let mut ranked = Vec::with_capacity(docs.len());
        for (score, address) in docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let position = doc
                .get_first(self.position)
                .and_then(|value| value.as_u64())
                .ok_or(StoreError::MissingValue(POSITION_FIELD))?;
            ranked.push((position as usize, score));
        }
        Ok(ranked)
    }
}

impl TextIndex {
    /// Distinct terms of `text` as the indexed field's analyzer produces them.
    fn query_terms(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        stream.process(&mut |token| {
            if seen.insert(token.text.clone()) {
                terms.push(token.text.clone());
            }
        });
        terms
    }
}

fn build_schema() -> Schema {
    let mut builder = SchemaBuilder::default();
    let indexing = TextFieldIndexing::default()
        .set_tokenizer("default")
        .set_index_option(IndexRecordOption::WithFreqs);
    builder.add_text_field(TERMS_FIELD, TextOptions::default().set_indexing_options(indexing));
    builder.add_u64_field(POSITION_FIELD, STORED);
    builder.build()
}

fn approximate_document_bytes(doc: &SearchDocument) -> usize {
    let optional = [
        &doc.title,
        &doc.description,
        &doc.short_description,
        &doc.brand_name,
        &doc.category_name,
        &doc.category_level1,
        &doc.category_level2,
        &doc.category_level3,
        &doc.category_level4,
        &doc.keywords,
        &doc.sku,
        &doc.barcode,
    ]
    .into_iter()
    .flatten()
    .map(String::len)
    .sum::<usize>();
    let tags: usize = doc.tags.iter().map(String::len).sum();
    let terms: usize = doc
        .tokenized_document
        .terms()
        .map(|(term, _)| term.len() + std::mem::size_of::<u32>())
        .sum();
    std::mem::size_of::<SearchDocument>() + doc.name.len() + optional + tags + terms
}

fn describe_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
