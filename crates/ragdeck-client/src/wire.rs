//! Request and response bodies of the REST API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ragdeck_core::{
    CollectionStatus, DocumentContent, DocumentInfo, IndexStatus, Metadata, SearchResult,
};

#[derive(Serialize)]
pub struct CollectionRequest<'a> {
    pub collection_name: &'a str,
}

#[derive(Serialize)]
pub struct EmptyRequest {}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireContent<'a> {
    Text { text: &'a str },
    Auto { base64_data: String },
}

impl<'a> From<&'a DocumentContent> for WireContent<'a> {
    fn from(content: &'a DocumentContent) -> Self {
        match content {
            DocumentContent::Text(text) => WireContent::Text { text },
            DocumentContent::Bytes(bytes) => WireContent::Auto {
                base64_data: STANDARD.encode(bytes),
            },
        }
    }
}

#[derive(Serialize)]
pub struct AddDocumentRequest<'a> {
    pub collection_name: &'a str,
    pub path: &'a str,
    pub content: WireContent<'a>,
    pub metadata: &'a Metadata,
}

#[derive(Serialize)]
pub struct DocumentInfoListRequest<'a> {
    pub collection_name: &'a str,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_gt: Option<&'a str>,
}

#[derive(Serialize)]
pub struct TopSnippetsRequest<'a> {
    pub collection_name: &'a str,
    pub query: &'a str,
    pub k: usize,
}

#[derive(Deserialize)]
pub struct CollectionListResponse {
    pub collection_names: Vec<String>,
}

#[derive(Deserialize)]
pub struct WireSnippet {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    pub score: f32,
}

#[derive(Deserialize)]
pub struct TopSnippetsResponse {
    pub results: Vec<WireSnippet>,
}

impl TopSnippetsResponse {
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
            .into_iter()
            .map(|snippet| SearchResult {
                document_id: snippet.path,
                score: snippet.score,
                snippet: snippet.content.unwrap_or_default(),
            })
            .collect()
    }
}

/// Metadata values come back as either a string or a list of strings
#[derive(Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    One(String),
    Many(Vec<String>),
}

impl MetadataValue {
    fn into_string(self) -> String {
        match self {
            MetadataValue::One(value) => value,
            MetadataValue::Many(values) => values.join(", "),
        }
    }
}

#[derive(Deserialize)]
pub struct WireDocumentInfo {
    pub id: String,
    pub path: String,
    pub index_status: IndexStatus,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl From<WireDocumentInfo> for DocumentInfo {
    fn from(info: WireDocumentInfo) -> Self {
        DocumentInfo {
            id: info.id,
            path: info.path,
            index_status: info.index_status,
            metadata: info
                .metadata
                .into_iter()
                .map(|(key, value)| (key, value.into_string()))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct DocumentInfoListResponse {
    pub documents: Vec<WireDocumentInfo>,
}

/// Collection counters; per-stage parsing/indexing counts are not needed
#[derive(Deserialize)]
pub struct StatusResponse {
    pub num_documents: u64,
    pub num_indexed_documents: u64,
    #[serde(default)]
    pub num_failed_documents: u64,
}

impl From<StatusResponse> for CollectionStatus {
    fn from(status: StatusResponse) -> Self {
        let indexed = status.num_indexed_documents;
        let failed = status.num_failed_documents;
        // Anything neither indexed nor failed is still in flight. Counters that
        // disagree widen the total so indexed + pending + failed == total.
        let settled = indexed.saturating_add(failed);
        let total = status.num_documents.max(settled);

        CollectionStatus {
            indexed_count: indexed,
            pending_count: total - settled,
            failed_count: failed,
            total,
        }
    }
}

/// Error payload, `{"detail": ...}` where detail is a string or a validation list
#[derive(Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
