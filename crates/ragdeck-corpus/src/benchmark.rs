//! Benchmark query sets and answer matching

use rand::Rng;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use ragdeck_core::{Error, Result, SearchResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSnippet {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkQuery {
    pub query: String,
    #[serde(default)]
    pub snippets: Vec<ExpectedSnippet>,
}

impl BenchmarkQuery {
    /// Non-blank expected answers, in file order
    pub fn expected_answers(&self) -> Vec<&str> {
        self.snippets
            .iter()
            .filter_map(|s| s.answer.as_deref())
            .filter(|a| !a.trim().is_empty())
            .collect()
    }
}

/// A benchmark file: `{"tests": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkSet {
    pub tests: Vec<BenchmarkQuery>,
}

impl BenchmarkSet {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Corpus(format!("invalid benchmark queries: {}", e)))
    }

    pub async fn fetch(url: &str) -> Result<Self> {
        let text = reqwest::get(url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Corpus(format!("failed to download queries: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::Corpus(format!("failed to download queries: {}", e)))?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BenchmarkQuery> {
        self.tests.get(index)
    }

    /// Uniformly chosen question index, `None` for an empty set
    pub fn random_index(&self) -> Option<usize> {
        if self.tests.is_empty() {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..self.tests.len()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMatch {
    /// 1-based position in the result list
    pub rank: usize,
    pub document_id: String,
    pub matched_answers: Vec<String>,
}

impl ResultMatch {
    pub fn is_match(&self) -> bool {
        !self.matched_answers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub results: Vec<ResultMatch>,
    /// Total (result, answer) hits
    pub matches_found: usize,
}

/// Check each search result for expected answers (case-insensitive substring)
pub fn evaluate(query: &BenchmarkQuery, results: &[SearchResult]) -> Evaluation {
    let expected = query.expected_answers();

    let results: Vec<ResultMatch> = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let content = result.snippet.to_lowercase();
            ResultMatch {
                rank: i + 1,
                document_id: result.document_id.clone(),
                matched_answers: expected
                    .iter()
                    .filter(|answer| content.contains(&answer.to_lowercase()))
                    .map(|answer| answer.to_string())
                    .collect(),
            }
        })
        .collect();

    let matches_found = results.iter().map(|r| r.matched_answers.len()).sum();
    Evaluation {
        results,
        matches_found,
    }
}

/// Wrap the first case-insensitive occurrence of each answer in `content`.
///
/// Spans are located on the raw text and overlapping spans are merged, so
/// each region is wrapped exactly once.
pub fn highlight<S: AsRef<str>>(
    content: &str,
    answers: &[S],
    wrap: impl Fn(&str) -> String,
) -> String {
    let mut spans: Vec<(usize, usize)> = answers
        .iter()
        .map(AsRef::as_ref)
        .filter(|answer| !answer.trim().is_empty())
        .filter_map(|answer| {
            RegexBuilder::new(&regex::escape(answer))
                .case_insensitive(true)
                .build()
                .ok()?
                .find(content)
                .map(|found| (found.start(), found.end()))
        })
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&content[cursor..start]);
        out.push_str(&wrap(&content[start..end]));
        cursor = end;
    }
    out.push_str(&content[cursor..]);
    out
}
