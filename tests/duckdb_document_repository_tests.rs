use std::sync::Arc;

use docqa::application::{DocumentRepository, QueryLogRepository};
use docqa::connector::adapter::{
    DuckdbDocumentRepository, DuckdbQueryLogRepository, DATABASE_FILE_NAME,
};
use docqa::domain::{ChunkDraft, ChunkMetadata, Embedding, MetadataValue, NewDocument, NewQueryRecord};
use tempfile::tempdir;

fn draft(index: u32, text: &str) -> ChunkDraft {
    let mut metadata = ChunkMetadata::new();
    metadata.insert("page".to_string(), MetadataValue::Integer(index as i64));
    ChunkDraft::new(index, text, metadata)
}

#[tokio::test]
async fn duckdb_document_roundtrip_save_and_find() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join(DATABASE_FILE_NAME);
    let repo = DuckdbDocumentRepository::new(&db_path).expect("duckdb init");

    let saved = repo
        .save_document(
            NewDocument::new("report.pdf", "application/pdf", 2048)
                .with_metadata("source", "cli")
                .with_metadata("content_hash", "abc123"),
        )
        .await
        .expect("save");

    let found = repo
        .find_by_id(saved.id())
        .await
        .expect("find_by_id")
        .expect("document exists");
    assert_eq!(found.filename(), "report.pdf");
    assert_eq!(found.file_type(), "application/pdf");
    assert_eq!(found.file_size(), 2048);
    assert_eq!(found.metadata_str("source"), Some("cli"));
    assert_eq!(found.metadata_str("content_hash"), Some("abc123"));

    assert!(repo.find_by_id(saved.id() + 100).await.expect("find").is_none());
}

#[tokio::test]
async fn duckdb_documents_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join(DATABASE_FILE_NAME);

    let id = {
        let repo = DuckdbDocumentRepository::new(&db_path).expect("duckdb init");
        let document = repo
            .save_document(NewDocument::new("notes.txt", "text/plain", 10))
            .await
            .expect("save");
        repo.save_chunks(document.id(), &[draft(0, "hello")])
            .await
            .expect("save chunks");
        document.id()
    };

    let repo = DuckdbDocumentRepository::new(&db_path).expect("duckdb reopen");
    let chunks = repo.find_chunks(id).await.expect("find_chunks");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_text(), "hello");
}

#[tokio::test]
async fn duckdb_chunks_come_back_in_index_order() {
    let repo = DuckdbDocumentRepository::in_memory().expect("duckdb init");
    let document = repo
        .save_document(NewDocument::new("a.txt", "text/plain", 1))
        .await
        .expect("save");

    repo.save_chunks(
        document.id(),
        &[
            draft(2, "third"),
            draft(0, "first").with_embedding(Embedding::new(vec![1.0, 0.0], "test")),
            draft(1, "second"),
        ],
    )
    .await
    .expect("save chunks");

    let chunks = repo.find_chunks(document.id()).await.expect("find_chunks");
    let texts: Vec<&str> = chunks.iter().map(|c| c.chunk_text()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert!(chunks[0].has_embedding());
    assert!(!chunks[1].has_embedding());
    assert_eq!(
        chunks[2].metadata().get("page"),
        Some(&MetadataValue::Integer(2))
    );
    assert_eq!(repo.count_chunks().await.expect("count"), 3);
}

#[tokio::test]
async fn duckdb_list_is_newest_first() {
    let repo = DuckdbDocumentRepository::in_memory().expect("duckdb init");
    let first = repo
        .save_document(NewDocument::new("first.txt", "text/plain", 1))
        .await
        .expect("save");
    let second = repo
        .save_document(NewDocument::new("second.txt", "text/plain", 1))
        .await
        .expect("save");

    let documents = repo.list().await.expect("list");
    let ids: Vec<i64> = documents.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![second.id(), first.id()]);
}

#[tokio::test]
async fn duckdb_delete_cascades_to_chunks_and_queries() {
    let repo = DuckdbDocumentRepository::in_memory().expect("duckdb init");
    let log = Arc::new(DuckdbQueryLogRepository::with_connection(repo.shared_connection()));

    let doomed = repo
        .save_document(NewDocument::new("doomed.txt", "text/plain", 1))
        .await
        .expect("save");
    let kept = repo
        .save_document(NewDocument::new("kept.txt", "text/plain", 1))
        .await
        .expect("save");

    repo.save_chunks(doomed.id(), &[draft(0, "a"), draft(1, "b")])
        .await
        .expect("save chunks");
    repo.save_chunks(kept.id(), &[draft(0, "c")])
        .await
        .expect("save chunks");

    log.save(NewQueryRecord::new("about doomed", Some(doomed.id()), "answer"))
        .await
        .expect("log");
    log.save(NewQueryRecord::new("about kept", Some(kept.id()), "answer"))
        .await
        .expect("log");
    log.save(NewQueryRecord::new("about everything", None, "answer"))
        .await
        .expect("log");

    assert!(repo.delete(doomed.id()).await.expect("delete"));
    assert!(!repo.delete(doomed.id()).await.expect("second delete"));

    assert!(repo.find_by_id(doomed.id()).await.expect("find").is_none());
    assert!(repo.find_chunks(doomed.id()).await.expect("chunks").is_empty());
    assert_eq!(repo.find_chunks(kept.id()).await.expect("chunks").len(), 1);

    let remaining = log.list(10).await.expect("list");
    let texts: Vec<&str> = remaining.iter().map(|q| q.query_text()).collect();
    assert_eq!(remaining.len(), 2);
    assert!(!texts.contains(&"about doomed"));
    assert_eq!(log.count().await.expect("count"), 2);
}

#[tokio::test]
async fn duckdb_query_log_orders_and_limits() {
    let repo = DuckdbDocumentRepository::in_memory().expect("duckdb init");
    let log = DuckdbQueryLogRepository::with_connection(repo.shared_connection());

    for i in 0..5 {
        log.save(NewQueryRecord::new(format!("q{}", i), None, "a"))
            .await
            .expect("log");
    }

    let records = log.list(3).await.expect("list");
    let texts: Vec<&str> = records.iter().map(|q| q.query_text()).collect();
    assert_eq!(texts, vec!["q4", "q3", "q2"]);
    assert!(records.iter().all(|r| r.is_global()));
}
