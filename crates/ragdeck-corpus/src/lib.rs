//! Benchmark corpora for ragdeck
//!
//! This crate provides the predefined legal corpora, loading and download of
//! corpus archives, bulk ingestion through a session, and benchmark query
//! evaluation.

pub mod benchmark;
pub mod catalog;
pub mod ingest;
pub mod loader;

#[cfg(test)]
mod tests;

pub use benchmark::{BenchmarkQuery, BenchmarkSet, Evaluation, ExpectedSnippet, ResultMatch, evaluate, highlight};
pub use catalog::{CORPORA, Corpus, find};
pub use ingest::{CorpusIngestor, CorpusProgress, IngestConfig, IngestReport, PerformanceStats};
pub use loader::{CorpusDocument, count_tokens, download, extract_archive, load_dir};

// Re-export core types for convenience
pub use ragdeck_core::{Error, Result};
