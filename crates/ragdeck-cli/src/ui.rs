//! UI utilities for the CLI

use colored::*;
use std::io::{self, BufRead, Write};

use ragdeck_core::{AnswerResult, CollectionStatus, DocumentInfo, Error, SearchResult};
use ragdeck_corpus::{
    BenchmarkQuery, Corpus, CorpusProgress, Evaluation, IngestReport, PerformanceStats, highlight,
};

/// Characters of a snippet shown before truncation
const SNIPPET_PREVIEW: usize = 600;

/// Display startup banner
pub fn display_banner(masked_key: &str, endpoint: &str) {
    let width = 60;
    let top_border = format!("┌{}┐", "─".repeat(width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(width - 2));

    let line = |text: &str| format!("│  {:<pad$}│", text, pad = width - 4);

    println!();
    println!("{}", top_border.blue());
    println!("{}", line("ragdeck - hosted RAG from the terminal").blue().bold());
    println!("{}", line(&format!("key: {}", masked_key)).blue());
    println!("{}", line(&format!("endpoint: {}", endpoint)).blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Ask for an API key on stdin
pub fn prompt_api_key() -> io::Result<String> {
    print!("{} ", "Enter your API key:".cyan());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Print an error with its category, the way every command reports failures
pub fn render_error(error: &Error) {
    eprintln!("{} [{}] {}", "❌".red(), error.kind().red().bold(), error);
    if matches!(error, Error::Auth(_)) {
        eprintln!("   {}", "Check the API key and try again.".dimmed());
    }
}

pub fn render_collections(names: &[String]) {
    if names.is_empty() {
        println!("{} No collections yet", "ℹ".cyan());
        return;
    }

    println!("{} Found {} collections", "✅".green(), names.len());
    for name in names {
        println!("  {} {}", "•".blue(), name);
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_PREVIEW).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Snippet text for display: matched answers highlighted in full, otherwise a preview
fn annotate(snippet: &str, matched: &[String], wrap: impl Fn(&str) -> String) -> String {
    if matched.is_empty() {
        preview(snippet)
    } else {
        highlight(snippet, matched, wrap)
    }
}

/// Show a benchmark question with the answers it expects and where they come from
pub fn render_benchmark_query(query: &BenchmarkQuery, index: usize, total: usize) {
    println!(
        "{} {}",
        format!("📝 Question {}/{}:", index + 1, total).bold(),
        query.query
    );
    if query.snippets.is_empty() {
        return;
    }

    println!();
    println!(
        "{}",
        format!("🎯 Expected answers ({} snippets)", query.snippets.len()).dimmed()
    );
    for (i, snippet) in query.snippets.iter().enumerate() {
        println!(
            "  {} {}",
            format!("Answer {}:", i + 1).bold(),
            snippet.answer.as_deref().unwrap_or("No answer provided")
        );
        if let Some(path) = &snippet.file_path {
            println!("    {} {}", "📍 Source:".dimmed(), path.dimmed());
        }
    }
}

pub fn render_search_results(results: &[SearchResult], evaluation: Option<&Evaluation>) {
    if results.is_empty() {
        println!("{} No results", "ℹ".cyan());
        return;
    }

    println!("{} Found {} results", "✅".green(), results.len());
    for (i, result) in results.iter().enumerate() {
        let matched = evaluation
            .and_then(|e| e.results.get(i))
            .map(|m| m.matched_answers.as_slice())
            .unwrap_or_default();

        let marker = if matched.is_empty() { "" } else { " ✅" };
        println!();
        println!(
            "{} {}{}  {} {}",
            format!("Result {}", i + 1).bold(),
            format!("{:.3}", result.score).yellow(),
            marker,
            "📍".dimmed(),
            result.document_id.dimmed()
        );

        println!(
            "{}",
            annotate(&result.snippet, matched, |found| found.on_green().bold().to_string())
        );
    }

    if let Some(evaluation) = evaluation {
        println!();
        if evaluation.matches_found > 0 {
            println!(
                "{} {} expected answer(s) found",
                "🎯".green(),
                evaluation.matches_found
            );
        } else {
            println!("{} No expected answers found in results", "⚠️".yellow());
        }
    }
}

pub fn render_answer(answer: &AnswerResult) {
    if answer.is_empty() {
        println!("{} No answer: the collection has nothing relevant", "ℹ".cyan());
        return;
    }

    println!("{} {}", "💡".cyan(), answer.answer_text.bold());
    if !answer.supporting_snippets.is_empty() {
        println!();
        println!("{}", "Supporting snippets:".dimmed());
        for (i, snippet) in answer.supporting_snippets.iter().enumerate() {
            println!("  {}. {}", i + 1, preview(snippet));
        }
    }
}

pub fn render_status(collection: &str, status: &CollectionStatus) {
    println!("{} {}", "📂".blue(), collection.bold());
    println!(
        "  indexed {}  pending {}  failed {}  total {}",
        status.indexed_count.to_string().green(),
        status.pending_count.to_string().yellow(),
        status.failed_count.to_string().red(),
        status.total
    );
    if status.total > 0 {
        println!("  {:.1}% indexed", status.indexed_ratio() * 100.0);
    }
}

pub fn render_documents(documents: &[DocumentInfo]) {
    if documents.is_empty() {
        println!("{} No documents", "ℹ".cyan());
        return;
    }

    for document in documents {
        let status = format!("{:<16}", document.index_status);
        let status = if document.index_status.is_indexed() {
            status.green()
        } else if document.index_status.is_failed() {
            status.red()
        } else {
            status.yellow()
        };
        println!("  {} {}", status, document.path);
    }
}

pub fn render_corpora(corpora: &[Corpus]) {
    for corpus in corpora {
        println!("  {} {}", format!("{:<12}", corpus.key).bold(), corpus.description);
    }
}

pub fn render_ingest_report(report: &IngestReport) {
    println!(
        "{} Upload complete: {} sent for indexing in {:.2}s",
        "📤".green(),
        report.uploaded,
        report.elapsed.as_secs_f64()
    );
    if report.skipped > 0 {
        println!("  {} already present", report.skipped);
    }
    if report.failed > 0 {
        println!("{} {} documents failed to upload", "⚠️".yellow(), report.failed);
        for error in &report.errors {
            println!("    {}", error.dimmed());
        }
    }
    println!("  ~{} tokens", report.total_tokens);
}

pub fn render_performance(stats: &PerformanceStats) {
    let indexing = stats
        .indexing
        .map(|d| format!("{:.2}s", d.as_secs_f64()))
        .unwrap_or_else(|| "not measured".to_string());
    let index_rate = match (stats.indexing, stats.index_rate()) {
        (_, Some(rate)) => format!("{:.1} docs/s", rate),
        (Some(_), None) => "instant".to_string(),
        (None, None) => "n/a".to_string(),
    };

    println!();
    println!("{}", "Performance".bold());
    println!(
        "  📥 download {:.2}s  📤 upload {:.2}s  ⚡ indexing {}  🏁 total {:.2}s",
        stats.download.as_secs_f64(),
        stats.upload.as_secs_f64(),
        indexing,
        stats.total().as_secs_f64()
    );
    println!(
        "  📄 {:.1} docs/s  🔤 {:.0} tokens/s  ⚡ index rate {}  📊 avg {} tokens/doc",
        stats.docs_per_sec(),
        stats.tokens_per_sec(),
        index_rate,
        stats.avg_doc_tokens()
    );
    println!(
        "{} Processed {} documents with {} tokens in {:.2}s",
        "🎯".green(),
        stats.documents,
        stats.total_tokens,
        stats.total().as_secs_f64()
    );
}

pub fn render_progress(progress: &CorpusProgress) {
    if !progress.has_documents() {
        println!("{} Corpus not indexed: no documents found", "⚠️".yellow());
    } else if progress.is_complete() {
        println!(
            "{} Corpus ready: {}/{} documents indexed",
            "✅".green(),
            progress.indexed,
            progress.total
        );
    } else {
        println!(
            "{} Partial indexing: {}/{} documents indexed",
            "⏳".yellow(),
            progress.indexed,
            progress.total
        );
    }
}
