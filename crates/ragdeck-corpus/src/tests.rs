//! Snapshot tests for corpus ingestion and benchmarks

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        BenchmarkSet, CorpusDocument, CorpusIngestor, IngestConfig, IngestReport,
        PerformanceStats, evaluate, highlight,
    };
    use insta::assert_yaml_snapshot;
    use ragdeck_core::{MemoryRagService, Metadata, SearchResult, Session, SessionConfig};
    use std::time::Duration;

    fn session() -> Session<MemoryRagService> {
        Session::new(
            SessionConfig::new("ze_corpus_tests").unwrap(),
            MemoryRagService::new(),
        )
    }

    fn document(corpus: &str, stem: &str, content: &str) -> CorpusDocument {
        CorpusDocument {
            id: format!("{}_{}", corpus, stem),
            content: content.to_string(),
            filename: format!("{}.txt", stem),
            corpus: corpus.to_string(),
        }
    }

    fn fast_polling() -> IngestConfig {
        IngestConfig {
            poll_interval: Duration::from_millis(1),
            max_wait: Duration::from_millis(20),
            list_limit: 100,
        }
    }

    #[tokio::test]
    async fn test_ingest_report_snapshot() {
        let session = session();
        let collection = session.create_collection("legal").await.unwrap();
        session
            .upload_document_as(&collection, "cuad_1.txt", "already there", Metadata::new())
            .await
            .unwrap();

        let documents = vec![
            document("cuad", "1", "License grant is non-exclusive."),
            document("cuad", "2", "Either party may terminate for convenience."),
            document("cuad", "3", "Liability is capped at fees paid."),
        ];

        let ingestor = CorpusIngestor::new(&session);
        let mut seen = Vec::new();
        let report = ingestor
            .ingest(&collection, &documents, |i, _| seen.push(i))
            .await
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(report.attempted(), 3);
        assert_yaml_snapshot!(report, @r###"
        uploaded: 2
        skipped: 1
        failed: 0
        errors: []
        total_tokens: 16
        "###);
    }

    #[tokio::test]
    async fn test_ingest_records_failures() {
        let session = session();
        let missing = ragdeck_core::CollectionRef::new("missing");

        let report = CorpusIngestor::new(&session)
            .ingest(&missing, &[document("maud", "1", "text")], |_, _| {})
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("1.txt: "));
    }

    #[tokio::test]
    async fn test_ingest_aborts_on_rejected_key() {
        let session = Session::new(
            SessionConfig::new("ze_revoked").unwrap(),
            MemoryRagService::rejecting(),
        );
        let collection = ragdeck_core::CollectionRef::new("legal");

        let result = CorpusIngestor::new(&session)
            .ingest(
                &collection,
                &[document("maud", "1", "a"), document("maud", "2", "b")],
                |_, _| {},
            )
            .await;

        assert!(matches!(result, Err(ragdeck_core::Error::Auth(_))));
        assert_eq!(session.service().calls(), 1);
    }

    #[tokio::test]
    async fn test_progress_and_wait() {
        let session = session();
        let collection = session.create_collection("legal").await.unwrap();
        let ingestor = CorpusIngestor::with_config(&session, fast_polling());

        let empty = ingestor.progress(&collection, "cuad").await.unwrap();
        assert!(!empty.has_documents());

        session.service().hold_indexing(true);
        ingestor
            .ingest(
                &collection,
                &[document("cuad", "1", "one"), document("cuad", "2", "two")],
                |_, _| {},
            )
            .await
            .unwrap();
        session
            .upload_document_as(&collection, "maud_1.txt", "other corpus", Metadata::new())
            .await
            .unwrap();

        let mut ticks = 0;
        let pending = ingestor
            .wait_until_indexed(&collection, "cuad", |_| ticks += 1)
            .await
            .unwrap();
        assert_eq!(pending.total, 2);
        assert_eq!(pending.indexed, 0);
        assert!(ticks >= 2);

        session.service().finish_indexing().unwrap();
        let done = ingestor
            .wait_until_indexed(&collection, "cuad", |_| {})
            .await
            .unwrap();
        assert!(done.is_complete());
    }

    #[test]
    fn test_benchmark_parsing_snapshot() {
        let set = BenchmarkSet::from_json_str(
            r#"{
                "tests": [
                    {
                        "query": "Is there a cap on liability",
                        "snippets": [
                            {"answer": "Liability is capped", "file_path": "cuad/3.txt"},
                            {"file_path": "cuad/9.txt"}
                        ]
                    },
                    {"query": "Who pays taxes"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().expected_answers(), vec!["Liability is capped"]);
        assert_yaml_snapshot!(set.get(1).unwrap(), @r###"
        query: Who pays taxes
        snippets: []
        "###);

        assert!(BenchmarkSet::from_json_str("{\"queries\": []}").is_err());
    }

    #[test]
    fn test_evaluate_counts_matches() {
        let set = BenchmarkSet::from_json_str(
            r#"{"tests": [{"query": "termination", "snippets": [
                {"answer": "terminate for convenience"},
                {"answer": "thirty days"}
            ]}]}"#,
        )
        .unwrap();

        let results = vec![
            SearchResult {
                document_id: "cuad_2.txt".to_string(),
                score: 0.9,
                snippet: "Either party may Terminate for Convenience on thirty days notice".to_string(),
            },
            SearchResult {
                document_id: "cuad_5.txt".to_string(),
                score: 0.4,
                snippet: "Governing law".to_string(),
            },
        ];

        let evaluation = evaluate(set.get(0).unwrap(), &results);
        assert_eq!(evaluation.matches_found, 2);
        assert!(evaluation.results[0].is_match());
        assert_eq!(evaluation.results[0].rank, 1);
        assert!(!evaluation.results[1].is_match());
    }

    #[test]
    fn test_highlight() {
        let marked = highlight("The Cap on Liability applies. The cap", &["cap on liability"], |s| {
            format!("[{}]", s)
        });
        assert_eq!(marked, "The [Cap on Liability] applies. The cap");

        assert_eq!(highlight("a (b) c", &["(b)"], |s| format!("<{}>", s)), "a <(b)> c");
        assert_eq!(highlight("nothing here", &["absent"], |s| s.to_string()), "nothing here");
        assert_eq!(highlight("text", &["  "], |s| format!("!{}", s)), "text");
    }

    #[test]
    fn test_highlight_merges_overlapping_answers() {
        let answers = vec!["cap on liability".to_string(), "liability applies".to_string()];
        let marked = highlight("The Cap on Liability applies here.", &answers, |s| {
            format!("[{}]", s)
        });
        assert_eq!(marked, "The [Cap on Liability applies] here.");

        let marked = highlight("alpha beta gamma", &["gamma", "alpha"], |s| format!("<{}>", s));
        assert_eq!(marked, "<alpha> beta <gamma>");
    }

    #[tokio::test]
    async fn test_progress_pages_past_list_limit() {
        let session = session();
        let collection = session.create_collection("legal").await.unwrap();
        let ingestor = CorpusIngestor::with_config(
            &session,
            IngestConfig {
                list_limit: 2,
                ..fast_polling()
            },
        );

        ingestor
            .ingest(
                &collection,
                &[document("cuad", "1", "one"), document("cuad", "2", "two")],
                |_, _| {},
            )
            .await
            .unwrap();
        session.service().hold_indexing(true);
        ingestor
            .ingest(&collection, &[document("cuad", "3", "three")], |_, _| {})
            .await
            .unwrap();

        let progress = ingestor.progress(&collection, "cuad").await.unwrap();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.indexed, 2);
        assert!(!progress.is_complete());

        let waited = ingestor
            .wait_until_indexed(&collection, "cuad", |_| {})
            .await
            .unwrap();
        assert!(!waited.is_complete());

        session.service().finish_indexing().unwrap();
        let done = ingestor.progress(&collection, "cuad").await.unwrap();
        assert_eq!(done.indexed, 3);
        assert!(done.is_complete());
    }

    #[test]
    fn test_default_list_limit_matches_page_size() {
        assert_eq!(IngestConfig::default().list_limit, ragdeck_core::DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn test_performance_stats() {
        let report = IngestReport {
            uploaded: 8,
            skipped: 2,
            total_tokens: 5000,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        let stats = PerformanceStats::new(Duration::from_secs(1), &report, Some(Duration::from_secs(2)));

        assert_eq!(stats.total(), Duration::from_secs(5));
        assert_eq!(stats.docs_per_sec(), 2.0);
        assert_eq!(stats.tokens_per_sec(), 1000.0);
        assert_eq!(stats.index_rate(), Some(5.0));
        assert_eq!(stats.avg_doc_tokens(), 500);

        let unmeasured = PerformanceStats::new(Duration::ZERO, &IngestReport::default(), None);
        assert_eq!(unmeasured.docs_per_sec(), 0.0);
        assert_eq!(unmeasured.index_rate(), None);
        assert_eq!(unmeasured.avg_doc_tokens(), 0);
    }

    #[test]
    fn test_random_index_in_range() {
        let set = BenchmarkSet::from_json_str(
            r#"{"tests": [{"query": "a"}, {"query": "b"}, {"query": "c"}]}"#,
        )
        .unwrap();
        for _ in 0..50 {
            assert!(set.random_index().unwrap() < 3);
        }
        assert_eq!(BenchmarkSet::default().random_index(), None);
    }
}
