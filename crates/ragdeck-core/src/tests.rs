//! Session behavior against the in-memory backend

#[cfg(test)]
mod session_tests {
    use crate::{
        CollectionRef, DocumentContent, Error, MemoryRagService, Metadata, Session, SessionConfig,
    };
    use insta::assert_yaml_snapshot;

    fn session() -> Session<MemoryRagService> {
        let config = SessionConfig::new("ze_test_key_0001").unwrap();
        Session::new(config, MemoryRagService::new())
    }

    fn contracts() -> Vec<&'static str> {
        vec![
            "Either party may invoke the termination clause with thirty days notice.",
            "The termination of this agreement does not affect accrued rights.",
            "Each clause of this contract is severable.",
            "Payment is due within sixty days of invoice. Late fees apply.",
            "Governing law is the State of Delaware.",
        ]
    }

    async fn seeded(session: &Session<MemoryRagService>) -> CollectionRef {
        let collection = session.create_collection("contracts").await.unwrap();
        for text in contracts() {
            session
                .upload_document(&collection, text, Metadata::new())
                .await
                .unwrap();
        }
        collection
    }

    #[tokio::test]
    async fn test_configure_keeps_key_and_verifies() {
        let session = session();
        assert_eq!(session.config().api_key(), "ze_test_key_0001");
        assert!(session.verify().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_key_surfaces_auth_error() {
        let config = SessionConfig::new("ze_revoked_key").unwrap();
        let session = Session::new(config, MemoryRagService::rejecting());

        assert!(matches!(session.verify().await, Err(Error::Auth(_))));
        assert!(matches!(
            session.create_collection("x").await,
            Err(Error::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_create_collection_twice_conflicts() {
        let session = session();

        let first = session.create_collection("x").await.unwrap();
        assert_eq!(first.name(), "x");

        let second = session.create_collection("x").await;
        assert!(matches!(second, Err(Error::Conflict(_))));
        assert_eq!(session.list_collections().await.unwrap(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_ensure_collection_reuses_existing() {
        let session = session();

        let (_, created) = session.ensure_collection("legal").await.unwrap();
        assert!(created);
        let (collection, created) = session.ensure_collection("legal").await.unwrap();
        assert!(!created);
        assert_eq!(collection.name(), "legal");
    }

    #[tokio::test]
    async fn test_empty_collection_name_never_reaches_service() {
        let session = session();
        let result = session.create_collection("   ").await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(session.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected_locally() {
        let session = session();
        let collection = session.create_collection("docs").await.unwrap();
        let calls_before = session.service().calls();

        for content in [
            DocumentContent::from(""),
            DocumentContent::from(" \n\t "),
            DocumentContent::from(Vec::<u8>::new()),
        ] {
            let result = session
                .upload_document(&collection, content, Metadata::new())
                .await;
            assert!(matches!(result, Err(Error::Validation(_))));
        }

        assert_eq!(session.service().calls(), calls_before);
    }

    #[tokio::test]
    async fn test_upload_derives_stable_id() {
        let session = session();
        let collection = session.create_collection("docs").await.unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "unit-test".to_string());

        let record = session
            .upload_document(&collection, "hello world", metadata.clone())
            .await
            .unwrap();
        assert_eq!(record.id, "doc-5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(record.metadata, metadata);

        let again = session
            .upload_document(&collection, "hello world", Metadata::new())
            .await;
        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_upload_with_explicit_id() {
        let session = session();
        let collection = session.create_collection("docs").await.unwrap();

        let record = session
            .upload_document_as(&collection, "nda.txt", b"binary payload".to_vec(), Metadata::new())
            .await
            .unwrap();
        assert_eq!(record.id, "nda.txt");

        let blank = session
            .upload_document_as(&collection, "", "text", Metadata::new())
            .await;
        assert!(matches!(blank, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_to_missing_collection_is_service_error() {
        let session = session();
        let result = session
            .upload_document(&CollectionRef::new("nowhere"), "text", Metadata::new())
            .await;
        assert!(matches!(result, Err(Error::Service(_))));
    }

    #[tokio::test]
    async fn test_search_is_ranked_and_bounded() {
        let session = session();
        let collection = seeded(&session).await;

        let results = session
            .search(&collection, "termination clause", 3)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        for result in &results {
            assert!(!result.document_id.is_empty());
            assert!((0.0..=1.0).contains(&result.score));
        }
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(results[0].snippet.contains("termination clause"));
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let session = session();
        let collection = seeded(&session).await;

        let results = session
            .search(&collection, "cryptocurrency", 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_input_validation() {
        let session = session();
        let collection = seeded(&session).await;
        let calls_before = session.service().calls();

        assert!(matches!(
            session.search(&collection, "", 3).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            session.search(&collection, "termination", 0).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(session.service().calls(), calls_before);
    }

    #[tokio::test]
    async fn test_ask_on_empty_collection() {
        let session = session();
        let collection = session.create_collection("empty").await.unwrap();

        let answer = session
            .ask(&collection, "What is the notice period?")
            .await
            .unwrap();
        assert!(answer.supporting_snippets.is_empty());
        assert!(answer.answer_text.is_empty());
    }

    #[tokio::test]
    async fn test_ask_uses_top_snippet() {
        let session = session();
        let collection = seeded(&session).await;

        let answer = session
            .ask(&collection, "When is payment due")
            .await
            .unwrap();
        assert_eq!(answer.answer_text, "Payment is due within sixty days of invoice");
        assert_eq!(answer.supporting_snippets[0], answer.answer_text);
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let session = session();
        let collection = session.create_collection("pending").await.unwrap();

        session
            .upload_document(&collection, "already indexed", Metadata::new())
            .await
            .unwrap();
        session.service().hold_indexing(true);
        session
            .upload_document(&collection, "still indexing one", Metadata::new())
            .await
            .unwrap();
        session
            .upload_document(&collection, "still indexing two", Metadata::new())
            .await
            .unwrap();

        let status = session.get_status(&collection).await.unwrap();
        assert_yaml_snapshot!(status, @r###"
        indexed_count: 1
        pending_count: 2
        failed_count: 0
        total: 3
        "###);

        session.service().finish_indexing().unwrap();
        let status = session.get_status(&collection).await.unwrap();
        assert!(status.is_settled());
        assert_eq!(status.indexed_count, 3);
    }

    #[tokio::test]
    async fn test_list_documents_by_prefix() {
        let session = session();
        let collection = session.create_collection("corpus").await.unwrap();

        for (id, text) in [
            ("cuad_1.txt", "first"),
            ("cuad_2.txt", "second"),
            ("maud_1.txt", "third"),
        ] {
            session
                .upload_document_as(&collection, id, text, Metadata::new())
                .await
                .unwrap();
        }

        let cuad = session
            .list_documents(&collection, Some("cuad_"), 100)
            .await
            .unwrap();
        let paths: Vec<&str> = cuad.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["cuad_1.txt", "cuad_2.txt"]);

        let capped = session.list_documents(&collection, None, 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_list_documents_after_cursor() {
        let session = session();
        let collection = session.create_collection("corpus").await.unwrap();
        for id in ["cuad_1.txt", "cuad_2.txt", "cuad_3.txt"] {
            session
                .upload_document_as(&collection, id, "text", Metadata::new())
                .await
                .unwrap();
        }

        let page = session
            .list_documents_after(&collection, Some("cuad_"), Some("cuad_1.txt"), 1)
            .await
            .unwrap();
        assert_eq!(page[0].path, "cuad_2.txt");

        let rest = session
            .list_documents_after(&collection, Some("cuad_"), Some("cuad_3.txt"), 10)
            .await
            .unwrap();
        assert!(rest.is_empty());

        assert!(matches!(
            session.list_documents_after(&collection, None, None, 0).await,
            Err(Error::Validation(_))
        ));
    }
}
