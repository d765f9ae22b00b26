//! Terminal rendering for ragdeck

mod ui;

pub use ui::{
    display_banner, prompt_api_key, render_answer, render_benchmark_query, render_collections,
    render_corpora, render_documents, render_error, render_ingest_report, render_performance,
    render_progress, render_search_results, render_status,
};

// Re-export core types
pub use ragdeck_core::{Error, Result};
