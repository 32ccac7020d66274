//! End-to-end tests for the research pipeline
//!
//! Tests:
//! 1. Full run against a file-backed database
//! 2. Unknown query ids
//! 3. Vault scoping by document id
//! 4. Re-running a query and the latest-result rule
//! 5. Feedback and metrics after runs
//! 6. Persistence failures partway through a run

use tempfile::TempDir;
use vaultscope_core::db::{
    Citation, CitationInsert, FeedbackInsert, ResearchResult, ResearchResultInsert,
    VaultDocumentInsert,
};
use vaultscope_core::{
    extract_citations, retrieve, run_research, synthesize, Config, Database, QueryStatus,
    ResearchQuery, ResearchStore, RetrievalOptions, RunOptions, VaultDocument, VaultscopeError,
};

fn setup_db() -> (Database, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = Database::open(&temp.path().join("research.sqlite")).unwrap();
    db.initialize().unwrap();
    (db, temp)
}

fn add_doc(db: &Database, title: &str, content: &str, url: Option<&str>) -> i64 {
    db.insert_vault_document(&VaultDocumentInsert {
        title,
        content: Some(content),
        source_url: url,
    })
    .unwrap()
    .id
}

#[tokio::test]
async fn test_full_pipeline_end_to_end() {
    let (db, _temp) = setup_db();
    add_doc(
        &db,
        "Microplastics in marine ecosystems",
        "Microplastics accumulate in marine food webs and sediments.",
        Some("https://example.org/microplastics"),
    );
    add_doc(&db, "Desert weather", "Hot days, cold nights, little rain.", None);

    let query = db.insert_query("microplastics marine", None).unwrap();
    assert_eq!(query.status, QueryStatus::Pending);

    let outcome = run_research(&db, query.id, &RunOptions::default())
        .await
        .unwrap();

    let result = db.get_result(outcome.research_result_id).unwrap().unwrap();
    assert_eq!(result.research_query_id, query.id);

    let report = result.report().unwrap().unwrap();
    assert_eq!(report.query, "microplastics marine");
    assert_eq!(report.schema_version, 1);
    assert!((report.confidence - outcome.confidence).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&outcome.confidence));

    // Same inputs, same chunk set: citation count must match a direct extraction
    let docs = db.list_vault_documents(None).unwrap();
    let chunks = retrieve(&query.query_text, &docs, &RetrievalOptions::default());
    let synthesis = synthesize(&query.query_text, &chunks);
    let expected = extract_citations(&chunks, &synthesis.section_source_ids());

    let citations = db.list_citations_for_result(result.id).unwrap();
    assert_eq!(citations.len(), expected.len());
    assert_eq!(outcome.citation_count, expected.len());
    assert_eq!(
        citations
            .iter()
            .map(|c| c.source_id.clone().unwrap())
            .collect::<Vec<_>>(),
        expected.iter().map(|c| c.source_id.clone()).collect::<Vec<_>>()
    );
    assert_eq!(
        citations[0].source_url.as_deref(),
        Some("https://example.org/microplastics")
    );

    assert_eq!(
        db.get_query(query.id).unwrap().unwrap().status,
        QueryStatus::Completed
    );
}

/// Delegates to a real database but refuses to write citations
struct CitationWriteFails {
    db: Database,
}

impl ResearchStore for CitationWriteFails {
    fn get_query(&self, id: i64) -> vaultscope_core::Result<Option<ResearchQuery>> {
        ResearchStore::get_query(&self.db, id)
    }

    fn update_status(&self, id: i64, status: QueryStatus) -> vaultscope_core::Result<()> {
        self.db.update_status(id, status)
    }

    fn get_all_vault_documents(&self) -> vaultscope_core::Result<Vec<VaultDocument>> {
        self.db.get_all_vault_documents()
    }

    fn get_vault_documents_by_ids(&self, ids: &[i64]) -> vaultscope_core::Result<Vec<VaultDocument>> {
        ResearchStore::get_vault_documents_by_ids(&self.db, ids)
    }

    fn insert_result(
        &self,
        result: &ResearchResultInsert<'_>,
    ) -> vaultscope_core::Result<ResearchResult> {
        ResearchStore::insert_result(&self.db, result)
    }

    fn insert_citation(&self, _citation: &CitationInsert<'_>) -> vaultscope_core::Result<Citation> {
        Err(VaultscopeError::Io(std::io::Error::other("disk full")))
    }
}

#[tokio::test]
async fn test_citation_write_failure_fails_the_run() {
    let (db, _temp) = setup_db();
    add_doc(&db, "Ocean plastics", "ocean plastics in the gyre", None);
    let query = db.insert_query("ocean plastics", None).unwrap();
    let store = CitationWriteFails { db };

    let err = run_research(&store, query.id, &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultscopeError::Io(_)));
    assert!(err.to_string().contains("disk full"));

    assert_eq!(
        store.db.get_query(query.id).unwrap().unwrap().status,
        QueryStatus::Failed
    );
    // The result row written before the failure stays, without citations
    let results = store.db.list_results_for_query(query.id).unwrap();
    assert_eq!(results.len(), 1);
    assert!(store
        .db
        .list_citations_for_result(results[0].id)
        .unwrap()
        .is_empty());

    // A later run against the healthy store recovers the query
    let outcome = run_research(&store.db, query.id, &RunOptions::default())
        .await
        .unwrap();
    assert!(outcome.rerun);
    assert_eq!(
        store.db.get_query(query.id).unwrap().unwrap().status,
        QueryStatus::Completed
    );
}

#[tokio::test]
async fn test_unknown_query_reports_not_found() {
    let (db, _temp) = setup_db();

    let err = run_research(&db, 9999, &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultscopeError::QueryNotFound(9999)));
    assert!(err.to_string().contains("not found"));

    // The best-effort failed transition touched nothing
    assert!(db.get_query(9999).unwrap().is_none());
    assert!(db.list_queries(&Default::default()).unwrap().is_empty());
}

#[tokio::test]
async fn test_vault_scoping_limits_sources() {
    let (db, _temp) = setup_db();
    let kept = add_doc(&db, "Agentic AI survey", "agentic AI planning loops", None);
    let skipped = add_doc(&db, "Agentic AI tooling", "agentic AI tool use", None);
    let query = db.insert_query("agentic AI", None).unwrap();

    let options = RunOptions {
        vault_doc_ids: Some(vec![kept]),
    };
    let outcome = run_research(&db, query.id, &options).await.unwrap();

    let citations = db
        .list_citations_for_result(outcome.research_result_id)
        .unwrap();
    let ids: Vec<_> = citations
        .iter()
        .filter_map(|c| c.source_id.as_deref())
        .collect();
    assert!(ids.contains(&format!("vault:{}", kept).as_str()));
    assert!(!ids.contains(&format!("vault:{}", skipped).as_str()));
}

#[tokio::test]
async fn test_rerun_keeps_history_and_latest_wins() {
    let (db, _temp) = setup_db();
    let query = db.insert_query("history", None).unwrap();

    let first = run_research(&db, query.id, &RunOptions::default())
        .await
        .unwrap();
    add_doc(&db, "History notes", "a history of history", None);
    let second = run_research(&db, query.id, &RunOptions::default())
        .await
        .unwrap();

    let results = db.list_results_for_query(query.id).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, second.research_result_id);
    assert_eq!(results[1].id, first.research_result_id);
    assert_eq!(
        db.latest_result_for_query(query.id).unwrap().unwrap().id,
        second.research_result_id
    );
    assert!(second.citation_count > first.citation_count);
}

#[tokio::test]
async fn test_metrics_after_runs_and_feedback() {
    let (db, _temp) = setup_db();
    let a = db.insert_query("first topic", None).unwrap();
    let b = db.insert_query("second topic", None).unwrap();

    let outcome = run_research(&db, a.id, &RunOptions::default())
        .await
        .unwrap();
    run_research(&db, b.id, &RunOptions::default())
        .await
        .unwrap();
    assert!(run_research(&db, 777, &RunOptions::default()).await.is_err());

    db.insert_feedback(&FeedbackInsert {
        research_result_id: Some(outcome.research_result_id),
        research_query_id: Some(a.id),
        rating: Some(4),
        feedback_text: Some("useful"),
    })
    .unwrap();

    let metrics = db.research_metrics().unwrap();
    assert_eq!(metrics.total_queries, 2);
    assert_eq!(metrics.total_runs, 2);
    assert_eq!(metrics.completed_queries, 2);
    assert_eq!(metrics.failed_queries, 0);
    assert_eq!(metrics.total_feedback_count, 1);
    assert_eq!(metrics.avg_rating, Some(4.0));
    assert!(metrics.avg_confidence.is_some());
}

#[tokio::test]
async fn test_database_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("research.sqlite");
    let query_id = {
        let db = Database::open(&path).unwrap();
        db.initialize().unwrap();
        let query = db.insert_query("persisted", None).unwrap();
        run_research(&db, query.id, &RunOptions::default())
            .await
            .unwrap();
        query.id
    };

    let db = Database::open(&path).unwrap();
    db.initialize().unwrap();
    assert_eq!(
        db.get_query(query_id).unwrap().unwrap().status,
        QueryStatus::Completed
    );
    assert!(db.latest_result_for_query(query_id).unwrap().is_some());
}

#[test]
fn test_default_config_matches_default_retrieval() {
    let config = Config::default();
    assert_eq!(
        config.retrieval.to_options().unwrap(),
        RetrievalOptions::default()
    );
}
