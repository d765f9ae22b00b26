use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ragdeck_cli::{
    display_banner, prompt_api_key, render_answer, render_benchmark_query, render_collections,
    render_corpora, render_documents, render_error, render_ingest_report, render_performance,
    render_progress, render_search_results, render_status,
};
use ragdeck_client::{ClientConfig, RagApiClient, configure_with};
use ragdeck_core::{CollectionRef, DEFAULT_LIST_LIMIT, DocumentContent, Error, Metadata, Session};
use ragdeck_corpus::{BenchmarkSet, CORPORA, CorpusIngestor, PerformanceStats, evaluate};

type Client = Session<RagApiClient>;

#[derive(Parser)]
#[command(name = "ragdeck")]
#[command(about = "Collections, uploads, search and Q&A against a hosted RAG service", long_about = None)]
struct Cli {
    /// API key (defaults to RAGDECK_API_KEY / ZEROENTROPY_API_KEY, then a prompt)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Override the service endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Skip the banner
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List collections
    Collections,
    /// Create a collection
    Create { name: String },
    /// Upload a file into a collection
    Upload {
        collection: String,
        file: PathBuf,
        /// Document id (defaults to a content digest)
        #[arg(long)]
        id: Option<String>,
        /// Metadata entry, repeatable
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        meta: Vec<(String, String)>,
    },
    /// Semantic search
    Search {
        collection: String,
        query: String,
        /// Number of results
        #[arg(short, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..=10))]
        k: u16,
    },
    /// Ask a question
    Ask { collection: String, question: String },
    /// Indexing status of a collection
    Status { collection: String },
    /// List documents in a collection
    Docs {
        collection: String,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Predefined benchmark corpora
    Corpus {
        #[command(subcommand)]
        action: CorpusCommand,
    },
    /// Run a benchmark query against an indexed corpus
    Bench {
        corpus: String,
        collection: String,
        /// Which benchmark question to run
        #[arg(long, default_value_t = 0, conflicts_with = "random")]
        index: usize,
        /// Pick a question at random
        #[arg(long)]
        random: bool,
        #[arg(short, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..=10))]
        k: u16,
    },
}

#[derive(Subcommand)]
enum CorpusCommand {
    /// Show available corpora
    List,
    /// Download (or read from --dir) and upload a corpus
    Index {
        corpus: String,
        collection: String,
        /// Load from a local directory instead of downloading
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Poll until indexing finishes
        #[arg(long)]
        wait: bool,
    },
    /// Indexing progress of a corpus
    Progress { corpus: String, collection: String },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty metadata key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Corpus {
        action: CorpusCommand::List,
    } = cli.command
    {
        render_corpora(&CORPORA);
        return Ok(());
    }

    let mut config = ClientConfig::from_env()
        .with_api_key(cli.api_key)
        .with_endpoint(cli.endpoint);
    if !config.has_api_key() {
        let key = prompt_api_key().context("failed to read API key")?;
        config = config.with_api_key(Some(key));
    }

    let session = match config.into_session_config().and_then(configure_with) {
        Ok(session) => session,
        Err(e) => {
            render_error(&e);
            std::process::exit(1);
        }
    };

    debug!(endpoint = session.config().endpoint(), "session configured");
    if !cli.quiet {
        display_banner(&session.config().masked_key(), session.config().endpoint());
    }

    if let Err(e) = run(&session, cli.command).await {
        render_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(session: &Client, command: Command) -> ragdeck_core::Result<()> {
    match command {
        Command::Collections => {
            let names = session.verify().await?;
            render_collections(&names);
        }
        Command::Create { name } => {
            let collection = session.create_collection(&name).await?;
            println!("{} Created new collection: {}", "✅".green(), collection);
        }
        Command::Upload {
            collection,
            file,
            id,
            meta,
        } => {
            let bytes = std::fs::read(&file)?;
            let content = match String::from_utf8(bytes) {
                Ok(text) => DocumentContent::Text(text),
                Err(e) => DocumentContent::Bytes(e.into_bytes()),
            };
            let metadata: Metadata = meta.into_iter().collect();
            let collection = CollectionRef::new(collection);

            let record = match id {
                Some(id) => {
                    session
                        .upload_document_as(&collection, &id, content, metadata)
                        .await?
                }
                None => session.upload_document(&collection, content, metadata).await?,
            };
            println!(
                "{} Uploaded {} ({} bytes) to {}",
                "📤".green(),
                record.id.bold(),
                record.content.len(),
                collection
            );
        }
        Command::Search {
            collection,
            query,
            k,
        } => {
            let results = session
                .search(&CollectionRef::new(collection), &query, k as usize)
                .await?;
            render_search_results(&results, None);
        }
        Command::Ask {
            collection,
            question,
        } => {
            let answer = session.ask(&CollectionRef::new(collection), &question).await?;
            render_answer(&answer);
        }
        Command::Status { collection } => {
            let status = session.get_status(&CollectionRef::new(&collection)).await?;
            render_status(&collection, &status);
        }
        Command::Docs {
            collection,
            prefix,
            limit,
        } => {
            let documents = session
                .list_documents(&CollectionRef::new(collection), prefix.as_deref(), limit)
                .await?;
            render_documents(&documents);
        }
        Command::Corpus { action } => run_corpus(session, action).await?,
        Command::Bench {
            corpus,
            collection,
            index,
            random,
            k,
        } => {
            let corpus = lookup_corpus(&corpus)?;
            let collection = CollectionRef::new(collection);

            let progress = CorpusIngestor::new(session)
                .progress(&collection, corpus.key)
                .await?;
            if !progress.is_complete() {
                render_progress(&progress);
                println!(
                    "{} Corpus must be fully indexed before querying",
                    "⚠️".yellow()
                );
                return Ok(());
            }

            let set = BenchmarkSet::fetch(corpus.queries_url).await?;
            let index = if random {
                set.random_index().ok_or_else(|| {
                    Error::Corpus(format!("no benchmark questions for {}", corpus.name))
                })?
            } else {
                index
            };
            let test = set.get(index).ok_or_else(|| {
                Error::Validation(format!(
                    "question index {} out of range (0..{})",
                    index,
                    set.len()
                ))
            })?;

            render_benchmark_query(test, index, set.len());
            println!();
            let results = session.search(&collection, &test.query, k as usize).await?;
            let evaluation = evaluate(test, &results);
            render_search_results(&results, Some(&evaluation));
        }
    }

    Ok(())
}

async fn run_corpus(session: &Client, action: CorpusCommand) -> ragdeck_core::Result<()> {
    match action {
        CorpusCommand::List => render_corpora(&CORPORA),
        CorpusCommand::Index {
            corpus,
            collection,
            dir,
            wait,
        } => {
            let corpus = lookup_corpus(&corpus)?;
            let (collection, created) = session.ensure_collection(&collection).await?;
            if created {
                println!("{} Created new collection: {}", "✅".green(), collection);
            } else {
                println!("{} Using existing collection: {}", "✅".green(), collection);
            }

            let started = Instant::now();
            let documents = match dir {
                Some(dir) => ragdeck_corpus::load_dir(&dir, corpus.key)?,
                None => {
                    println!("{} Downloading {}...", "📥".cyan(), corpus.name);
                    ragdeck_corpus::download(corpus.corpus_url, corpus.key).await?
                }
            };
            let download = started.elapsed();
            println!("{} {} documents to upload", "📄".cyan(), documents.len());

            let ingestor = CorpusIngestor::new(session);
            let total = documents.len();
            let report = ingestor
                .ingest(&collection, &documents, |i, document| {
                    eprint!("\r  Indexing {}/{}: {:<40}", i + 1, total, document.filename);
                })
                .await?;
            eprintln!();
            render_ingest_report(&report);

            let mut indexing = None;
            if wait {
                let started = Instant::now();
                let progress = ingestor
                    .wait_until_indexed(&collection, corpus.key, |p| {
                        eprint!("\r  {}/{} documents indexed", p.indexed, p.total);
                    })
                    .await?;
                eprintln!();
                render_progress(&progress);
                if progress.is_complete() {
                    indexing = Some(started.elapsed());
                }
            }

            render_performance(&PerformanceStats::new(download, &report, indexing));
        }
        CorpusCommand::Progress { corpus, collection } => {
            let corpus = lookup_corpus(&corpus)?;
            let progress = CorpusIngestor::new(session)
                .progress(&CollectionRef::new(collection), corpus.key)
                .await?;
            render_progress(&progress);
        }
    }

    Ok(())
}

fn lookup_corpus(key: &str) -> ragdeck_core::Result<&'static ragdeck_corpus::Corpus> {
    ragdeck_corpus::find(key).ok_or_else(|| {
        let known: Vec<&str> = CORPORA.iter().map(|c| c.key).collect();
        Error::Validation(format!(
            "unknown corpus '{}', expected one of: {}",
            key,
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("source=scan=2").unwrap(),
            ("source".to_string(), "scan=2".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "ragdeck",
            "search",
            "contracts",
            "termination clause",
            "-k",
            "5",
        ])
        .unwrap();
        match cli.command {
            Command::Search { collection, query, k } => {
                assert_eq!(collection, "contracts");
                assert_eq!(query, "termination clause");
                assert_eq!(k, 5);
            }
            _ => panic!("expected search"),
        }

        assert!(Cli::try_parse_from(["ragdeck", "search", "c", "q", "-k", "0"]).is_err());
        assert!(Cli::try_parse_from(["ragdeck", "search", "c", "q", "-k", "11"]).is_err());
    }

    #[test]
    fn test_cli_parses_random_bench() {
        let cli = Cli::try_parse_from(["ragdeck", "bench", "cuad", "legal", "--random"]).unwrap();
        assert!(matches!(cli.command, Command::Bench { random: true, .. }));

        assert!(
            Cli::try_parse_from(["ragdeck", "bench", "cuad", "legal", "--random", "--index", "4"])
                .is_err()
        );
    }
}
