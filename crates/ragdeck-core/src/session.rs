//! API session adapter
//!
//! [`Session`] pairs an immutable [`SessionConfig`] with a [`RagService`]
//! backend. It checks caller input before anything goes over the wire and
//! shapes service responses for display. Every call is a single attempt;
//! errors come back exactly as the backend produced them.

use tracing::{debug, info};

use crate::{
    AnswerResult, CollectionRef, CollectionStatus, DocumentContent, DocumentInfo,
    DocumentRecord, Error, Metadata, RagService, Result, SearchResult, SessionConfig,
};

/// Default page size for document listings
pub const DEFAULT_LIST_LIMIT: usize = 1024;

/// A configured session against one backend
pub struct Session<S: RagService> {
    config: SessionConfig,
    service: S,
}

impl<S: RagService> Session<S> {
    pub fn new(config: SessionConfig, service: S) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Exercise the key once by listing collections.
    ///
    /// A rejected key surfaces here as `Error::Auth` instead of on the first real action.
    pub async fn verify(&self) -> Result<Vec<String>> {
        debug!(key = %self.config.masked_key(), "verifying API key");
        self.service.list_collections().await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        debug!("listing collections");
        self.service.list_collections().await
    }

    /// Create a new collection. An existing name is reported as `Error::Conflict`.
    pub async fn create_collection(&self, name: &str) -> Result<CollectionRef> {
        let name = require_name(name, "collection name")?;
        self.service.create_collection(name).await?;
        info!(collection = name, "created collection");
        Ok(CollectionRef::new(name))
    }

    /// Create the collection, or use it as-is when the name is already taken.
    ///
    /// Returns whether a new collection was created.
    pub async fn ensure_collection(&self, name: &str) -> Result<(CollectionRef, bool)> {
        match self.create_collection(name).await {
            Ok(collection) => Ok((collection, true)),
            Err(Error::Conflict(_)) => {
                debug!(collection = name, "collection already exists");
                Ok((CollectionRef::new(name.trim()), false))
            }
            Err(e) => Err(e),
        }
    }

    /// Upload a document under an id derived from its content
    pub async fn upload_document(
        &self,
        collection: &CollectionRef,
        content: impl Into<DocumentContent>,
        metadata: Metadata,
    ) -> Result<DocumentRecord> {
        let content = content.into();
        let id = content.derived_id();
        self.upload_record(collection, id, content, metadata).await
    }

    /// Upload a document under a caller-chosen id
    pub async fn upload_document_as(
        &self,
        collection: &CollectionRef,
        id: &str,
        content: impl Into<DocumentContent>,
        metadata: Metadata,
    ) -> Result<DocumentRecord> {
        let id = require_name(id, "document id")?.to_string();
        self.upload_record(collection, id, content.into(), metadata).await
    }

    async fn upload_record(
        &self,
        collection: &CollectionRef,
        id: String,
        content: DocumentContent,
        metadata: Metadata,
    ) -> Result<DocumentRecord> {
        if content.is_empty() {
            return Err(Error::Validation("document content is empty".to_string()));
        }

        let record = DocumentRecord {
            id,
            content,
            metadata,
        };
        self.service.add_document(collection.name(), &record).await?;
        info!(
            collection = collection.name(),
            document = %record.id,
            bytes = record.content.len(),
            "uploaded document"
        );
        Ok(record)
    }

    /// Semantic search, best match first, at most `top_k` results
    pub async fn search(
        &self,
        collection: &CollectionRef,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query = require_name(query, "query")?;
        if top_k == 0 {
            return Err(Error::Validation("top_k must be at least 1".to_string()));
        }

        debug!(collection = collection.name(), query, top_k, "searching");
        let results = self.service.query(collection.name(), query, top_k).await?;
        rank_results(results, top_k)
    }

    pub async fn ask(&self, collection: &CollectionRef, question: &str) -> Result<AnswerResult> {
        let question = require_name(question, "question")?;
        debug!(collection = collection.name(), question, "asking");
        self.service.answer(collection.name(), question).await
    }

    pub async fn get_status(&self, collection: &CollectionRef) -> Result<CollectionStatus> {
        debug!(collection = collection.name(), "fetching status");
        self.service.status(collection.name()).await
    }

    /// First page of documents, at most `limit` of them
    pub async fn list_documents(
        &self,
        collection: &CollectionRef,
        path_prefix: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentInfo>> {
        self.list_documents_after(collection, path_prefix, None, limit)
            .await
    }

    /// Page of documents whose path sorts after `after`.
    ///
    /// A page shorter than `limit` is the last one.
    pub async fn list_documents_after(
        &self,
        collection: &CollectionRef,
        path_prefix: Option<&str>,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentInfo>> {
        if limit == 0 {
            return Err(Error::Validation("limit must be at least 1".to_string()));
        }
        debug!(collection = collection.name(), ?path_prefix, ?after, limit, "listing documents");
        self.service
            .document_info(collection.name(), path_prefix, after, limit)
            .await
    }
}

fn require_name<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is empty", what)));
    }
    Ok(trimmed)
}

/// Order results by descending score and cap them at `top_k`.
///
/// Scores are clamped into [0, 1]; a non-finite score or a missing document
/// id means the backend sent something unusable.
pub fn rank_results(mut results: Vec<SearchResult>, top_k: usize) -> Result<Vec<SearchResult>> {
    for result in &mut results {
        if result.document_id.trim().is_empty() {
            return Err(Error::Service("search result without a document id".to_string()));
        }
        if !result.score.is_finite() {
            return Err(Error::Service(format!(
                "search result '{}' has a non-finite score",
                result.document_id
            )));
        }
        result.score = result.score.clamp(0.0, 1.0);
    }

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> SearchResult {
        SearchResult {
            document_id: id.to_string(),
            score,
            snippet: format!("snippet of {}", id),
        }
    }

    #[test]
    fn test_rank_sorts_and_truncates() {
        let ranked = rank_results(
            vec![hit("a", 0.2), hit("b", 0.9), hit("c", 0.5), hit("d", 0.7)],
            3,
        )
        .unwrap();

        let ids: Vec<&str> = ranked.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "c"]);
    }

    #[test]
    fn test_rank_clamps_scores() {
        let ranked = rank_results(vec![hit("a", 1.7), hit("b", -0.3)], 5).unwrap();
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_rank_rejects_malformed() {
        assert!(matches!(
            rank_results(vec![hit("a", f32::NAN)], 5),
            Err(Error::Service(_))
        ));
        assert!(matches!(
            rank_results(vec![hit("  ", 0.5)], 5),
            Err(Error::Service(_))
        ));
    }

    #[test]
    fn test_rank_empty_is_ok() {
        assert!(rank_results(Vec::new(), 3).unwrap().is_empty());
    }

    #[test]
    fn test_require_name() {
        assert_eq!(require_name("  contracts ", "name").unwrap(), "contracts");
        assert!(matches!(require_name(" \t", "name"), Err(Error::Validation(_))));
    }
}
