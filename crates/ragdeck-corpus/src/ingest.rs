//! Bulk corpus ingestion and indexing progress

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use ragdeck_core::{CollectionRef, DEFAULT_LIST_LIMIT, Error, RagService, Result, Session};

use crate::loader::CorpusDocument;

/// Polling and listing settings for ingestion
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
    /// Page size when listing documents for progress
    pub list_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub total_tokens: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl IngestReport {
    pub fn attempted(&self) -> usize {
        self.uploaded + self.skipped + self.failed
    }
}

/// Wall-clock timings of one download, upload and indexing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceStats {
    pub download: Duration,
    pub upload: Duration,
    /// `None` when indexing was not waited for
    pub indexing: Option<Duration>,
    pub documents: usize,
    pub total_tokens: usize,
}

impl PerformanceStats {
    pub fn new(download: Duration, report: &IngestReport, indexing: Option<Duration>) -> Self {
        Self {
            download,
            upload: report.elapsed,
            indexing,
            documents: report.attempted(),
            total_tokens: report.total_tokens,
        }
    }

    pub fn total(&self) -> Duration {
        self.download + self.upload + self.indexing.unwrap_or_default()
    }

    /// End-to-end documents per second
    pub fn docs_per_sec(&self) -> f64 {
        per_sec(self.documents, self.total())
    }

    /// End-to-end tokens per second
    pub fn tokens_per_sec(&self) -> f64 {
        per_sec(self.total_tokens, self.total())
    }

    /// Documents per second of indexing alone; `None` if not measured or instant
    pub fn index_rate(&self) -> Option<f64> {
        self.indexing
            .filter(|d| !d.is_zero())
            .map(|d| per_sec(self.documents, d))
    }

    pub fn avg_doc_tokens(&self) -> usize {
        self.total_tokens.checked_div(self.documents).unwrap_or(0)
    }
}

fn per_sec(count: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { count as f64 / secs } else { 0.0 }
}

/// Indexed versus stored documents for one corpus in a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorpusProgress {
    pub indexed: usize,
    pub total: usize,
}

impl CorpusProgress {
    pub fn has_documents(&self) -> bool {
        self.total > 0
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.indexed == self.total
    }
}

/// Uploads corpus documents through a session and tracks their indexing
pub struct CorpusIngestor<'a, S: RagService> {
    session: &'a Session<S>,
    config: IngestConfig,
}

impl<'a, S: RagService> CorpusIngestor<'a, S> {
    pub fn new(session: &'a Session<S>) -> Self {
        Self {
            session,
            config: IngestConfig::default(),
        }
    }

    pub fn with_config(session: &'a Session<S>, config: IngestConfig) -> Self {
        Self { session, config }
    }

    /// Upload each document as `{id}.txt`, one call per document.
    ///
    /// Documents already present are counted as skipped. Other failures are
    /// recorded and the run continues, except for a rejected API key, which
    /// aborts the run.
    pub async fn ingest(
        &self,
        collection: &CollectionRef,
        documents: &[CorpusDocument],
        mut on_document: impl FnMut(usize, &CorpusDocument),
    ) -> Result<IngestReport> {
        let started = Instant::now();
        let mut report = IngestReport::default();

        for (i, document) in documents.iter().enumerate() {
            on_document(i, document);
            report.total_tokens += document.token_count();

            let upload = self
                .session
                .upload_document_as(
                    collection,
                    &document.path(),
                    document.content.as_str(),
                    document.metadata(),
                )
                .await;

            match upload {
                Ok(_) => report.uploaded += 1,
                Err(Error::Conflict(_)) => report.skipped += 1,
                Err(e @ Error::Auth(_)) => return Err(e),
                Err(e) => {
                    warn!(file = %document.filename, error = %e, "failed to upload corpus document");
                    report.failed += 1;
                    report.errors.push(format!("{}: {}", document.filename, e));
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            collection = collection.name(),
            uploaded = report.uploaded,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "corpus ingestion finished"
        );
        Ok(report)
    }

    /// Count indexed and stored documents belonging to `corpus_key`.
    ///
    /// Pages through the whole listing, `list_limit` documents at a time.
    pub async fn progress(
        &self,
        collection: &CollectionRef,
        corpus_key: &str,
    ) -> Result<CorpusProgress> {
        let prefix = format!("{}_", corpus_key);
        let mut progress = CorpusProgress::default();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .session
                .list_documents_after(
                    collection,
                    Some(&prefix),
                    after.as_deref(),
                    self.config.list_limit,
                )
                .await?;

            progress.total += page.len();
            progress.indexed += page.iter().filter(|d| d.index_status.is_indexed()).count();

            let last = match page.last() {
                Some(last) if page.len() >= self.config.list_limit => last,
                _ => return Ok(progress),
            };
            if after.as_deref().is_some_and(|after| last.path.as_str() <= after) {
                return Err(Error::Service(format!(
                    "document listing did not advance past '{}'",
                    last.path
                )));
            }
            after = Some(last.path.clone());
        }
    }

    /// Poll [`Self::progress`] until the corpus is fully indexed or `max_wait` elapses.
    ///
    /// Returns the last observed progress either way.
    pub async fn wait_until_indexed(
        &self,
        collection: &CollectionRef,
        corpus_key: &str,
        mut on_tick: impl FnMut(&CorpusProgress),
    ) -> Result<CorpusProgress> {
        let started = Instant::now();

        loop {
            let progress = self.progress(collection, corpus_key).await?;
            on_tick(&progress);

            if progress.is_complete() || started.elapsed() >= self.config.max_wait {
                return Ok(progress);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
