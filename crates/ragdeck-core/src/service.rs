//! The hosted RAG service, seen as an opaque capability

use async_trait::async_trait;

use crate::{AnswerResult, CollectionStatus, DocumentInfo, DocumentRecord, Result, SearchResult};

/// Trait for RAG service backends
///
/// Implementations perform exactly one remote operation per call and report
/// failures through the crate's error taxonomy. They do not validate caller
/// input, retry, or reorder results; [`crate::Session`] owns that.
#[async_trait]
pub trait RagService: Send + Sync {
    /// Create a collection; `Error::Conflict` if the name is taken
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Names of every collection visible to the API key
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Store a document; `Error::Conflict` if the id already exists
    async fn add_document(&self, collection: &str, document: &DocumentRecord) -> Result<()>;

    /// Up to `k` snippets relevant to `query`, in whatever order the backend returns
    async fn query(&self, collection: &str, query: &str, k: usize) -> Result<Vec<SearchResult>>;

    /// Answer a question from the collection's contents
    async fn answer(&self, collection: &str, question: &str) -> Result<AnswerResult>;

    /// Indexing counters for a collection
    async fn status(&self, collection: &str) -> Result<CollectionStatus>;

    /// Documents whose path starts with `path_prefix`, ordered by path.
    ///
    /// Returns at most `limit` entries with a path strictly after `after`.
    async fn document_info(
        &self,
        collection: &str,
        path_prefix: Option<&str>,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentInfo>>;
}
