use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::QueryLogRepository;
use crate::domain::{current_timestamp, DomainError, NewQueryRecord, QueryRecord};

pub struct DuckdbQueryLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbQueryLogRepository {
    /// The connection must already carry the document schema.
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

fn row_to_record(row: &Row<'_>) -> duckdb::Result<QueryRecord> {
    Ok(QueryRecord::reconstitute(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

#[async_trait]
impl QueryLogRepository for DuckdbQueryLogRepository {
    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, DomainError> {
        let conn = self.conn.lock().await;
        let id: i64 = conn
            .query_row("SELECT nextval('queries_id_seq')", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to allocate query id: {}", e)))?;
        let query_date = current_timestamp();

        conn.execute(
            "INSERT INTO queries (id, query_text, document_id, result_text, query_date) \
            VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                record.query_text,
                record.document_id,
                record.result_text,
                query_date,
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to save query: {}", e)))?;

        debug!("Logged query {}", id);

        Ok(QueryRecord::reconstitute(
            id,
            record.query_text,
            record.document_id,
            record.result_text,
            query_date,
        ))
    }

    async fn list(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, query_text, document_id, result_text, query_date FROM queries \
                ORDER BY query_date DESC, id DESC LIMIT ?",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let records = stmt
            .query_map(params![limit as i64], row_to_record)
            .map_err(|e| DomainError::storage(format!("Failed to list queries: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read query row: {}", e)))?;

        Ok(records)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM queries", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count queries: {}", e)))?;
        Ok(count as u64)
    }
}
