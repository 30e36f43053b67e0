use std::sync::Arc;

use async_trait::async_trait;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::debug;

use super::duckdb_document_repository::{parse_chunk_metadata, vector_to_list_literal};
use crate::application::VectorRepository;
use crate::domain::{sort_retrieved, DocumentChunk, DomainError, RetrievalQuery, RetrievedChunk};

/// Cosine similarity search over the `document_chunks` table.
pub struct DuckdbVectorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbVectorRepository {
    /// The connection must already carry the document schema
    /// (see `DuckdbDocumentRepository::shared_connection`).
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl VectorRepository for DuckdbVectorRepository {
    async fn search(
        &self,
        query_embedding: &[f32],
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        if query_embedding.is_empty() || query.limit() == 0 {
            return Ok(Vec::new());
        }
        if let Some(ids) = query.document_ids() {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
        }

        let list_lit = vector_to_list_literal(query_embedding)?;
        let dimensions = query_embedding.len();

        // list_cosine_similarity fails on lists of different lengths, so the
        // length check is repeated inside the CASE.
        let mut sql = format!(
            "SELECT c.id, c.document_id, c.chunk_text, c.chunk_index, c.metadata, d.filename, \
                CAST(CASE WHEN len(c.embedding) = {dim} \
                    THEN list_cosine_similarity(c.embedding, {list_lit}) END AS DOUBLE) AS score \
            FROM document_chunks c \
            JOIN documents d ON d.id = c.document_id \
            WHERE c.embedding IS NOT NULL AND len(c.embedding) = {dim}",
            dim = dimensions,
            list_lit = list_lit
        );

        if let Some(ids) = query.document_ids() {
            let joined = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            sql.push_str(&format!(" AND c.document_id IN ({})", joined));
        }

        sql.push_str(" ORDER BY score DESC NULLS LAST, c.document_id, c.chunk_index");

        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::storage(format!("Failed to prepare search: {}", e)))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| DomainError::storage(format!("Failed to run search: {}", e)))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?
        {
            let score: Option<f64> = row
                .get(6)
                .map_err(|e| DomainError::storage(format!("Failed to read score: {}", e)))?;
            let score = match score {
                Some(s) if s.is_finite() => s as f32,
                _ => continue,
            };

            if !query.accepts_score(score) {
                continue;
            }

            let metadata_json: String = row
                .get(4)
                .map_err(|e| DomainError::storage(format!("Failed to read metadata: {}", e)))?;

            let chunk = DocumentChunk::reconstitute(
                row.get::<_, i64>(0)
                    .map_err(|e| DomainError::storage(format!("Failed to read id: {}", e)))?,
                row.get::<_, i64>(1)
                    .map_err(|e| DomainError::storage(format!("Failed to read document_id: {}", e)))?,
                row.get::<_, String>(2)
                    .map_err(|e| DomainError::storage(format!("Failed to read chunk_text: {}", e)))?,
                row.get::<_, i32>(3)
                    .map_err(|e| DomainError::storage(format!("Failed to read chunk_index: {}", e)))?
                    as u32,
                parse_chunk_metadata(&metadata_json),
                None,
            );
            let document_name: String = row
                .get(5)
                .map_err(|e| DomainError::storage(format!("Failed to read filename: {}", e)))?;

            results.push(RetrievedChunk::new(chunk, document_name, score));
            if results.len() >= query.limit() {
                break;
            }
        }

        sort_retrieved(&mut results);
        debug!("Vector search returned {} chunks", results.len());
        Ok(results)
    }
}
