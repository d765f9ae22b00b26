//! Data model shared by the session adapter and service implementations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Document metadata, string keys to string values
pub type Metadata = BTreeMap<String, String>;

/// Reference to a named collection on the service.
///
/// Nothing about the collection is cached here; the service is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    pub name: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Document payload, either plain text or raw bytes left to the service to parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DocumentContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl DocumentContent {
    /// Whitespace-only text counts as empty
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentContent::Text(text) => text.trim().is_empty(),
            DocumentContent::Bytes(bytes) => bytes.is_empty(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DocumentContent::Text(text) => text.as_bytes(),
            DocumentContent::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Content-derived document id, stable across uploads of the same bytes
    pub fn derived_id(&self) -> String {
        format!("doc-{:x}", md5::compute(self.as_bytes()))
    }
}

impl From<String> for DocumentContent {
    fn from(text: String) -> Self {
        DocumentContent::Text(text)
    }
}

impl From<&str> for DocumentContent {
    fn from(text: &str) -> Self {
        DocumentContent::Text(text.to_string())
    }
}

impl From<Vec<u8>> for DocumentContent {
    fn from(bytes: Vec<u8>) -> Self {
        DocumentContent::Bytes(bytes)
    }
}

/// A document as handed to the service on upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub content: DocumentContent,
    pub metadata: Metadata,
}

/// One ranked hit from a semantic search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    pub score: f32,
    pub snippet: String,
}

/// Answer to a natural-language question with the snippets backing it, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub supporting_snippets: Vec<String>,
}

impl AnswerResult {
    /// Builds an extractive answer: the top snippet answers, all snippets support it
    pub fn from_snippets(snippets: Vec<String>) -> Self {
        let answer_text = snippets
            .first()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        Self {
            answer_text,
            supporting_snippets: snippets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answer_text.is_empty() && self.supporting_snippets.is_empty()
    }
}

/// Per-document processing state reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    NotParsed,
    Parsing,
    NotIndexed,
    Indexing,
    Indexed,
    ParsingFailed,
    IndexingFailed,
    #[serde(other)]
    Unknown,
}

impl IndexStatus {
    pub fn is_indexed(self) -> bool {
        self == IndexStatus::Indexed
    }

    pub fn is_failed(self) -> bool {
        matches!(self, IndexStatus::ParsingFailed | IndexStatus::IndexingFailed)
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            IndexStatus::NotParsed
                | IndexStatus::Parsing
                | IndexStatus::NotIndexed
                | IndexStatus::Indexing
        )
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IndexStatus::NotParsed => "not_parsed",
            IndexStatus::Parsing => "parsing",
            IndexStatus::NotIndexed => "not_indexed",
            IndexStatus::Indexing => "indexing",
            IndexStatus::Indexed => "indexed",
            IndexStatus::ParsingFailed => "parsing_failed",
            IndexStatus::IndexingFailed => "indexing_failed",
            IndexStatus::Unknown => "unknown",
        };
        f.pad(label)
    }
}

/// Listing entry for a stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: String,
    pub path: String,
    pub index_status: IndexStatus,
    pub metadata: Metadata,
}

/// Indexing counters for a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub indexed_count: u64,
    pub pending_count: u64,
    pub failed_count: u64,
    pub total: u64,
}

impl CollectionStatus {
    pub fn is_settled(&self) -> bool {
        self.pending_count == 0
    }

    /// Fraction of documents indexed, 0.0 for an empty collection
    pub fn indexed_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.indexed_count as f64 / self.total as f64
        }
    }
}
