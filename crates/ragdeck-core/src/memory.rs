//! In-memory RAG service

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::{
    AnswerResult, CollectionStatus, DocumentInfo, DocumentRecord, Error, IndexStatus, RagService,
    Result, SearchResult,
};

/// Snippets gathered to answer a question
const ANSWER_SNIPPETS: usize = 3;

struct StoredDocument {
    record: DocumentRecord,
    status: IndexStatus,
}

type Collections = HashMap<String, BTreeMap<String, StoredDocument>>;

/// Local in-memory stand-in for the hosted service.
///
/// Scores documents by query-term overlap. Every call is counted, and
/// indexing can be held back to observe pending documents.
pub struct MemoryRagService {
    collections: Arc<RwLock<Collections>>,
    calls: AtomicUsize,
    hold_indexing: AtomicBool,
    reject_key: bool,
}

impl MemoryRagService {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            calls: AtomicUsize::new(0),
            hold_indexing: AtomicBool::new(false),
            reject_key: false,
        }
    }

    /// A service that refuses the API key on every call
    pub fn rejecting() -> Self {
        Self {
            reject_key: true,
            ..Self::new()
        }
    }

    /// Number of operations received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Leave newly added documents in the `indexing` state until [`Self::finish_indexing`]
    pub fn hold_indexing(&self, hold: bool) {
        self.hold_indexing.store(hold, Ordering::SeqCst);
    }

    /// Mark every pending document as indexed
    pub fn finish_indexing(&self) -> Result<()> {
        let mut collections = self.write()?;
        for documents in collections.values_mut() {
            for document in documents.values_mut() {
                if document.status.is_pending() {
                    document.status = IndexStatus::Indexed;
                }
            }
        }
        Ok(())
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_key {
            return Err(Error::Auth("401 Unauthorized: invalid API key".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| Error::Service(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| Error::Service(format!("Lock error: {}", e)))
    }

    /// Fraction of query words present in the content
    fn text_similarity(query: &str, content: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let content_lower = content.to_lowercase();

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        let matches = query_words
            .iter()
            .filter(|word| content_lower.contains(*word))
            .count();

        if query_words.is_empty() {
            0.0
        } else {
            matches as f32 / query_words.len() as f32
        }
    }

    /// The sentence or line sharing the most words with the query
    fn best_passage(query: &str, content: &str) -> String {
        content
            .split(['.', '\n'])
            .map(str::trim)
            .filter(|passage| !passage.is_empty())
            .map(|passage| (Self::text_similarity(query, passage), passage))
            .fold(None::<(f32, &str)>, |best, (score, passage)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, passage)),
            })
            .map(|(_, passage)| passage.to_string())
            .unwrap_or_default()
    }

    fn not_found(collection: &str) -> Error {
        Error::Service(format!("404 Not Found: collection '{}' does not exist", collection))
    }
}

impl Default for MemoryRagService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RagService for MemoryRagService {
    async fn create_collection(&self, name: &str) -> Result<()> {
        self.enter()?;
        let mut collections = self.write()?;
        if collections.contains_key(name) {
            return Err(Error::Conflict(format!("collection '{}' already exists", name)));
        }
        collections.insert(name.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.enter()?;
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn add_document(&self, collection: &str, document: &DocumentRecord) -> Result<()> {
        self.enter()?;
        let status = if self.hold_indexing.load(Ordering::SeqCst) {
            IndexStatus::Indexing
        } else {
            IndexStatus::Indexed
        };

        let mut collections = self.write()?;
        let documents = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        if documents.contains_key(&document.id) {
            return Err(Error::Conflict(format!(
                "document '{}' already exists in '{}'",
                document.id, collection
            )));
        }

        documents.insert(
            document.id.clone(),
            StoredDocument {
                record: document.clone(),
                status,
            },
        );
        Ok(())
    }

    async fn query(&self, collection: &str, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.enter()?;
        let collections = self.read()?;
        let documents = collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let mut results: Vec<SearchResult> = documents
            .values()
            .filter(|doc| doc.status.is_indexed())
            .filter_map(|doc| {
                let text = String::from_utf8_lossy(doc.record.content.as_bytes());
                let score = Self::text_similarity(query, &text);
                (score > 0.0).then(|| SearchResult {
                    document_id: doc.record.id.clone(),
                    score,
                    snippet: Self::best_passage(query, &text),
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    async fn answer(&self, collection: &str, question: &str) -> Result<AnswerResult> {
        let results = self.query(collection, question, ANSWER_SNIPPETS).await?;
        let snippets = results.into_iter().map(|r| r.snippet).collect();
        Ok(AnswerResult::from_snippets(snippets))
    }

    async fn status(&self, collection: &str) -> Result<CollectionStatus> {
        self.enter()?;
        let collections = self.read()?;
        let documents = collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let mut status = CollectionStatus {
            total: documents.len() as u64,
            ..Default::default()
        };
        for document in documents.values() {
            if document.status.is_indexed() {
                status.indexed_count += 1;
            } else if document.status.is_failed() {
                status.failed_count += 1;
            } else {
                status.pending_count += 1;
            }
        }
        Ok(status)
    }

    async fn document_info(
        &self,
        collection: &str,
        path_prefix: Option<&str>,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentInfo>> {
        self.enter()?;
        let collections = self.read()?;
        let documents = collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        Ok(documents
            .values()
            .filter(|doc| path_prefix.is_none_or(|prefix| doc.record.id.starts_with(prefix)))
            .filter(|doc| after.is_none_or(|after| doc.record.id.as_str() > after))
            .take(limit)
            .map(|doc| DocumentInfo {
                id: doc.record.id.clone(),
                path: doc.record.id.clone(),
                index_status: doc.status,
                metadata: doc.record.metadata.clone(),
            })
            .collect())
    }
}
