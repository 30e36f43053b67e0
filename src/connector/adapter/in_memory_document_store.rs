use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{DocumentRepository, QueryLogRepository, VectorRepository};
use crate::domain::{
    cosine_similarity, current_timestamp, sort_retrieved, ChunkDraft, Document, DocumentChunk,
    DomainError, NewDocument, NewQueryRecord, QueryRecord, RetrievalQuery, RetrievedChunk,
};

#[derive(Default)]
struct State {
    documents: BTreeMap<i64, Document>,
    chunks: BTreeMap<i64, Vec<DocumentChunk>>,
    queries: Vec<QueryRecord>,
    next_document_id: i64,
    next_chunk_id: i64,
    next_query_id: i64,
}

impl State {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Non-persistent storage implementing the document, vector and query log
/// repositories over one shared state.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentStore {
    async fn save_document(&self, document: NewDocument) -> Result<Document, DomainError> {
        let mut state = self.state.lock().await;
        let id = State::allocate(&mut state.next_document_id);
        let stored = Document::reconstitute(
            id,
            document.filename,
            document.file_type,
            document.file_size,
            current_timestamp(),
            document.metadata,
        );
        state.documents.insert(id, stored.clone());
        debug!("Saved document {} to memory", id);
        Ok(stored)
    }

    async fn save_chunks(
        &self,
        document_id: i64,
        chunks: &[ChunkDraft],
    ) -> Result<Vec<DocumentChunk>, DomainError> {
        let mut state = self.state.lock().await;
        if !state.documents.contains_key(&document_id) {
            return Err(DomainError::not_found(format!(
                "Document not found: {}",
                document_id
            )));
        }

        let mut stored = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let id = State::allocate(&mut state.next_chunk_id);
            stored.push(DocumentChunk::reconstitute(
                id,
                document_id,
                chunk.text.clone(),
                chunk.chunk_index,
                chunk.metadata.clone(),
                chunk.embedding.clone(),
            ));
        }

        let entry = state.chunks.entry(document_id).or_default();
        entry.extend(stored.iter().cloned());
        entry.sort_by_key(|c| c.chunk_index());

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.documents.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, DomainError> {
        let state = self.state.lock().await;
        let mut documents: Vec<Document> = state.documents.values().cloned().collect();
        documents.sort_by(|a, b| {
            b.upload_date()
                .cmp(&a.upload_date())
                .then(b.id().cmp(&a.id()))
        });
        Ok(documents)
    }

    async fn find_chunks(&self, document_id: i64) -> Result<Vec<DocumentChunk>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.chunks.get(&document_id).cloned().unwrap_or_default())
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        if state.documents.remove(&id).is_none() {
            return Ok(false);
        }
        state.chunks.remove(&id);
        state.queries.retain(|q| q.document_id() != Some(id));
        Ok(true)
    }

    async fn count_chunks(&self) -> Result<u64, DomainError> {
        let state = self.state.lock().await;
        Ok(state.chunks.values().map(|c| c.len() as u64).sum())
    }
}

#[async_trait]
impl VectorRepository for InMemoryDocumentStore {
    async fn search(
        &self,
        query_embedding: &[f32],
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        let state = self.state.lock().await;
        let mut results = Vec::new();

        for (document_id, chunks) in &state.chunks {
            if !query.includes_document(*document_id) {
                continue;
            }
            let document_name = match state.documents.get(document_id) {
                Some(document) => document.filename().to_string(),
                None => continue,
            };

            for chunk in chunks {
                let score = match chunk
                    .embedding()
                    .and_then(|e| cosine_similarity(query_embedding, e.vector()))
                {
                    Some(score) if score.is_finite() => score,
                    _ => continue,
                };
                if !query.accepts_score(score) {
                    continue;
                }
                results.push(RetrievedChunk::new(
                    chunk.clone().without_embedding(),
                    document_name.clone(),
                    score,
                ));
            }
        }

        sort_retrieved(&mut results);
        results.truncate(query.limit());
        Ok(results)
    }
}

#[async_trait]
impl QueryLogRepository for InMemoryDocumentStore {
    async fn save(&self, record: NewQueryRecord) -> Result<QueryRecord, DomainError> {
        let mut state = self.state.lock().await;
        let id = State::allocate(&mut state.next_query_id);
        let stored = QueryRecord::reconstitute(
            id,
            record.query_text,
            record.document_id,
            record.result_text,
            current_timestamp(),
        );
        state.queries.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        let state = self.state.lock().await;
        let mut records = state.queries.clone();
        records.sort_by(|a, b| {
            b.query_date()
                .cmp(&a.query_date())
                .then(b.id().cmp(&a.id()))
        });
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let state = self.state.lock().await;
        Ok(state.queries.len() as u64)
    }
}
