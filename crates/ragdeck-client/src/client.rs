//! REST client for the hosted RAG service

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use ragdeck_core::{
    AnswerResult, CollectionStatus, DocumentInfo, DocumentRecord, Error, RagService, Result,
    SearchResult, SessionConfig, rank_results,
};

use crate::wire::{
    AddDocumentRequest, CollectionListResponse, CollectionRequest, DocumentInfoListRequest,
    DocumentInfoListResponse, EmptyRequest, ErrorBody, StatusResponse, TopSnippetsRequest,
    TopSnippetsResponse,
};

/// RAG service client speaking the REST API directly.
///
/// The underlying HTTP client is built without a request timeout, so calls
/// inherit whatever the transport does.
pub struct RagApiClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl RagApiClient {
    /// Endpoint paths
    pub const ADD_COLLECTION: &'static str = "/collections/add-collection";
    pub const LIST_COLLECTIONS: &'static str = "/collections/get-collection-list";
    pub const ADD_DOCUMENT: &'static str = "/documents/add-document";
    pub const DOCUMENT_INFO_LIST: &'static str = "/documents/get-document-info-list";
    pub const TOP_SNIPPETS: &'static str = "/queries/top-snippets";
    pub const GET_STATUS: &'static str = "/status/get-status";

    /// Snippets retrieved to back an answer
    pub const ANSWER_SNIPPETS: usize = 5;

    /// Create a new client from a session configuration
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint().to_string(),
            api_key: config.api_key().to_string(),
            client,
        })
    }

    /// Authenticated JSON POST to `path`
    pub(crate) fn request<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.endpoint, path))
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .json(body)
    }

    /// Send a request and return the body of a successful response
    async fn execute<B: Serialize + Sync + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        debug!(path, "dispatching request");

        let response = self
            .request(path, body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        debug!(path, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        Ok(text)
    }

    async fn call<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.execute(path, body).await?;
        decode(path, &text)
    }
}

/// Map a reqwest failure (connect, timeout, body read) to the taxonomy
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Service(format!("request timed out: {}", err))
    } else {
        Error::Service(format!("request failed: {}", err))
    }
}

/// Map a non-success HTTP status to the taxonomy, keeping the server's message
pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message())
        .unwrap_or_else(|_| body.trim().to_string());
    let detail = if detail.is_empty() {
        status.canonical_reason().unwrap_or("no details").to_string()
    } else {
        detail
    };
    let message = format!("{}: {}", status.as_u16(), detail);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
        StatusCode::CONFLICT => Error::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
        _ => Error::Service(message),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::Service(format!("malformed response from {}: {}", path, e)))
}

#[async_trait]
impl RagService for RagApiClient {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let body = CollectionRequest {
            collection_name: name,
        };
        self.execute(Self::ADD_COLLECTION, &body).await?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response: CollectionListResponse =
            self.call(Self::LIST_COLLECTIONS, &EmptyRequest {}).await?;
        Ok(response.collection_names)
    }

    async fn add_document(&self, collection: &str, document: &DocumentRecord) -> Result<()> {
        let body = AddDocumentRequest {
            collection_name: collection,
            path: &document.id,
            content: (&document.content).into(),
            metadata: &document.metadata,
        };
        self.execute(Self::ADD_DOCUMENT, &body).await?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let body = TopSnippetsRequest {
            collection_name: collection,
            query,
            k,
        };
        let response: TopSnippetsResponse = self.call(Self::TOP_SNIPPETS, &body).await?;
        Ok(response.into_results())
    }

    /// The API has no generative endpoint; answers are extracted from the top snippets.
    async fn answer(&self, collection: &str, question: &str) -> Result<AnswerResult> {
        let results = self
            .query(collection, question, Self::ANSWER_SNIPPETS)
            .await?;
        let results = rank_results(results, Self::ANSWER_SNIPPETS)?;

        let snippets = results
            .into_iter()
            .map(|r| r.snippet)
            .filter(|s| !s.trim().is_empty())
            .collect();
        Ok(AnswerResult::from_snippets(snippets))
    }

    async fn status(&self, collection: &str) -> Result<CollectionStatus> {
        let body = CollectionRequest {
            collection_name: collection,
        };
        let response: StatusResponse = self.call(Self::GET_STATUS, &body).await?;
        Ok(response.into())
    }

    async fn document_info(
        &self,
        collection: &str,
        path_prefix: Option<&str>,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DocumentInfo>> {
        let body = DocumentInfoListRequest {
            collection_name: collection,
            limit,
            path_prefix,
            path_gt: after,
        };
        let response: DocumentInfoListResponse =
            self.call(Self::DOCUMENT_INFO_LIST, &body).await?;
        Ok(response.documents.into_iter().map(Into::into).collect())
    }
}
