use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params, Connection, Row};
use serde_json::Map;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::DocumentRepository;
use crate::domain::{
    current_timestamp, ChunkDraft, ChunkMetadata, Document, DocumentChunk, DomainError, Embedding,
    NewDocument,
};

pub const DATABASE_FILE_NAME: &str = "docqa.duckdb";

pub struct DuckdbDocumentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbDocumentRepository {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns a clone of the shared connection Arc.
    /// DuckDB only allows one write connection per file, so the vector and
    /// query log repositories are built on this one.
    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }
}

/// Creates the `documents`, `document_chunks` and `queries` tables.
pub(crate) fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        r#"
        CREATE SEQUENCE IF NOT EXISTS documents_id_seq START 1;
        CREATE SEQUENCE IF NOT EXISTS document_chunks_id_seq START 1;
        CREATE SEQUENCE IF NOT EXISTS queries_id_seq START 1;

        CREATE TABLE IF NOT EXISTS documents (
            id BIGINT PRIMARY KEY,
            filename TEXT NOT NULL,
            file_type TEXT NOT NULL,
            file_size BIGINT NOT NULL,
            upload_date BIGINT NOT NULL,
            metadata TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS document_chunks (
            id BIGINT PRIMARY KEY,
            document_id BIGINT NOT NULL,
            chunk_text TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            metadata TEXT NOT NULL,
            embedding FLOAT[],
            embedding_model TEXT
        );

        CREATE TABLE IF NOT EXISTS queries (
            id BIGINT PRIMARY KEY,
            query_text TEXT NOT NULL,
            document_id BIGINT,
            result_text TEXT NOT NULL,
            query_date BIGINT NOT NULL
        );
        "#,
    )
    .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

    debug!("DuckDB document schema initialized");
    Ok(())
}

/// Formats a vector as an inline `FLOAT[]` literal.
///
/// List values can't be bound as parameters, so they are written into the SQL.
/// Only finite floats are accepted.
pub(crate) fn vector_to_list_literal(vector: &[f32]) -> Result<String, DomainError> {
    let mut s = String::with_capacity(vector.len() * 8 + 10);
    s.push('[');
    for (i, v) in vector.iter().enumerate() {
        if !v.is_finite() {
            return Err(DomainError::invalid_input(format!(
                "Embedding contains a non-finite value at position {}",
                i
            )));
        }
        if i > 0 {
            s.push_str(", ");
        }
        s.push_str(&format!("{}", v));
    }
    s.push_str("]::FLOAT[]");
    Ok(s)
}

pub(crate) fn value_to_vector(value: Value) -> Option<Vec<f32>> {
    match value {
        Value::List(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Float(f) => Some(f),
                    Value::Double(d) => Some(d as f32),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

pub(crate) fn parse_chunk_metadata(json: &str) -> ChunkMetadata {
    serde_json::from_str(json).unwrap_or_default()
}

fn row_to_document(row: &Row<'_>) -> duckdb::Result<Document> {
    let metadata_json: String = row.get(5)?;
    let metadata: Map<String, serde_json::Value> =
        serde_json::from_str(&metadata_json).unwrap_or_default();

    Ok(Document::reconstitute(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get::<_, i64>(3)? as u64,
        row.get(4)?,
        metadata,
    ))
}

fn row_to_chunk(row: &Row<'_>) -> duckdb::Result<DocumentChunk> {
    let metadata_json: String = row.get(4)?;
    let embedding_value: Value = row.get(5)?;
    let embedding_model: Option<String> = row.get(6)?;

    let embedding = value_to_vector(embedding_value)
        .map(|vector| Embedding::new(vector, embedding_model.unwrap_or_default()));

    Ok(DocumentChunk::reconstitute(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get::<_, i32>(3)? as u32,
        parse_chunk_metadata(&metadata_json),
        embedding,
    ))
}

fn next_id(conn: &Connection, sequence: &str) -> Result<i64, DomainError> {
    conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |row| {
        row.get(0)
    })
    .map_err(|e| DomainError::storage(format!("Failed to allocate id from {}: {}", sequence, e)))
}

#[async_trait]
impl DocumentRepository for DuckdbDocumentRepository {
    async fn save_document(&self, document: NewDocument) -> Result<Document, DomainError> {
        let conn = self.conn.lock().await;
        let id = next_id(&conn, "documents_id_seq")?;
        let upload_date = current_timestamp();
        let metadata_json = serde_json::to_string(&document.metadata)
            .map_err(|e| DomainError::internal(format!("Failed to serialize metadata: {}", e)))?;

        conn.execute(
            r#"
            INSERT INTO documents (id, filename, file_type, file_size, upload_date, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                document.filename,
                document.file_type,
                document.file_size as i64,
                upload_date,
                metadata_json,
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to save document: {}", e)))?;

        debug!("Saved document {} ({})", id, document.filename);

        Ok(Document::reconstitute(
            id,
            document.filename,
            document.file_type,
            document.file_size,
            upload_date,
            document.metadata,
        ))
    }

    async fn save_chunks(
        &self,
        document_id: i64,
        chunks: &[ChunkDraft],
    ) -> Result<Vec<DocumentChunk>, DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let exists: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE id = ?",
                params![document_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check document: {}", e)))?;
        if exists == 0 {
            return Err(DomainError::not_found(format!(
                "Document not found: {}",
                document_id
            )));
        }

        let mut stored = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let id = next_id(&tx, "document_chunks_id_seq")?;
            let metadata_json = serde_json::to_string(&chunk.metadata).map_err(|e| {
                DomainError::internal(format!("Failed to serialize chunk metadata: {}", e))
            })?;

            let result = match &chunk.embedding {
                Some(embedding) => {
                    let list_lit = vector_to_list_literal(embedding.vector())?;
                    let sql = format!(
                        "INSERT INTO document_chunks \
                        (id, document_id, chunk_text, chunk_index, metadata, embedding, embedding_model) \
                        VALUES (?, ?, ?, ?, ?, {}, ?)",
                        list_lit
                    );
                    tx.execute(
                        &sql,
                        params![
                            id,
                            document_id,
                            chunk.text,
                            chunk.chunk_index as i32,
                            metadata_json,
                            embedding.model(),
                        ],
                    )
                }
                None => tx.execute(
                    "INSERT INTO document_chunks \
                    (id, document_id, chunk_text, chunk_index, metadata, embedding, embedding_model) \
                    VALUES (?, ?, ?, ?, ?, NULL, NULL)",
                    params![
                        id,
                        document_id,
                        chunk.text,
                        chunk.chunk_index as i32,
                        metadata_json,
                    ],
                ),
            };
            result.map_err(|e| {
                DomainError::storage(format!(
                    "Failed to insert chunk {} of document {}: {}",
                    chunk.chunk_index, document_id, e
                ))
            })?;

            stored.push(DocumentChunk::reconstitute(
                id,
                document_id,
                chunk.text.clone(),
                chunk.chunk_index,
                chunk.metadata.clone(),
                chunk.embedding.clone(),
            ));
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Saved {} chunks for document {}", stored.len(), document_id);
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, filename, file_type, file_size, upload_date, metadata FROM documents WHERE id = ?1",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![id], row_to_document) {
            Ok(document) => Ok(Some(document)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to query document: {}",
                e
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<Document>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, filename, file_type, file_size, upload_date, metadata FROM documents \
                ORDER BY upload_date DESC, id DESC",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let documents = stmt
            .query_map([], row_to_document)
            .map_err(|e| DomainError::storage(format!("Failed to list documents: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read document row: {}", e)))?;

        Ok(documents)
    }

    async fn find_chunks(&self, document_id: i64) -> Result<Vec<DocumentChunk>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, document_id, chunk_text, chunk_index, metadata, embedding, embedding_model \
                FROM document_chunks WHERE document_id = ?1 ORDER BY chunk_index",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let chunks = stmt
            .query_map(params![document_id], row_to_chunk)
            .map_err(|e| DomainError::storage(format!("Failed to query chunks: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read chunk row: {}", e)))?;

        Ok(chunks)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let exists: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check document: {}", e)))?;
        if exists == 0 {
            return Ok(false);
        }

        tx.execute("DELETE FROM queries WHERE document_id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete queries: {}", e)))?;
        let chunks = tx
            .execute("DELETE FROM document_chunks WHERE document_id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete chunks: {}", e)))?;
        tx.execute("DELETE FROM documents WHERE id = ?", params![id])
            .map_err(|e| DomainError::storage(format!("Failed to delete document: {}", e)))?;

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Deleted document {} and {} chunks", id, chunks);
        Ok(true)
    }

    async fn count_chunks(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM document_chunks", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count chunks: {}", e)))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_to_list_literal() {
        assert_eq!(
            vector_to_list_literal(&[0.5, -1.0]).unwrap(),
            "[0.5, -1]::FLOAT[]"
        );
        assert!(vector_to_list_literal(&[f32::NAN]).is_err());
    }

    #[test]
    fn test_value_to_vector() {
        let value = Value::List(vec![Value::Float(0.25), Value::Double(0.5)]);
        assert_eq!(value_to_vector(value), Some(vec![0.25, 0.5]));
        assert_eq!(value_to_vector(Value::Null), None);
    }
}
