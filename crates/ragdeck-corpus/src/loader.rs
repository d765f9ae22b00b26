//! Corpus loading from local directories and zip archives

use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use ragdeck_core::{Error, Metadata, Result};

/// A corpus file ready for upload
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CorpusDocument {
    pub id: String,
    pub content: String,
    pub filename: String,
    pub corpus: String,
}

impl CorpusDocument {
    /// Path the document is stored under on the service
    pub fn path(&self) -> String {
        format!("{}.txt", self.id)
    }

    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("corpus".to_string(), self.corpus.clone());
        metadata.insert("filename".to_string(), self.filename.clone());
        metadata
    }

    pub fn token_count(&self) -> usize {
        count_tokens(&self.content)
    }
}

/// Approximate token count: whitespace-separated words
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_corpus_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("txt") | Some("json")
    )
}

/// Load every non-blank `.txt` and `.json` file below `dir`.
///
/// Files that cannot be read as UTF-8 are logged and skipped.
pub fn load_dir(dir: &Path, corpus_key: &str) -> Result<Vec<CorpusDocument>> {
    if !dir.is_dir() {
        return Err(Error::Corpus(format!(
            "corpus directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_corpus_file(path) {
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not read corpus file");
                continue;
            }
        };

        if content.trim().is_empty() {
            debug!(file = %path.display(), "skipping blank file");
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.clone());

        documents.push(CorpusDocument {
            id: format!("{}_{}", corpus_key, stem),
            content,
            filename,
            corpus: corpus_key.to_string(),
        });
    }

    info!(corpus = corpus_key, documents = documents.len(), "loaded corpus");
    Ok(documents)
}

/// Unpack a zip archive held in memory into `dest`
pub fn extract_archive(bytes: &[u8], dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Corpus(format!("invalid corpus archive: {}", e)))?;
    archive
        .extract(dest)
        .map_err(|e| Error::Corpus(format!("failed to extract corpus archive: {}", e)))
}

/// Download a zipped corpus and load it
pub async fn download(url: &str, corpus_key: &str) -> Result<Vec<CorpusDocument>> {
    info!(corpus = corpus_key, "downloading corpus archive");

    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Corpus(format!("failed to download corpus: {}", e)))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Corpus(format!("failed to download corpus: {}", e)))?;

    let dir = tempfile::tempdir()?;
    extract_archive(&bytes, dir.path())?;
    load_dir(dir.path(), corpus_key)
}
