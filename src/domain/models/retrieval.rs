use serde::{Deserialize, Serialize};

use super::DocumentChunk;

pub const DEFAULT_RETRIEVAL_LIMIT: usize = 4;

/// Parameters for a similarity search over stored chunks.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    limit: usize,
    document_ids: Option<Vec<i64>>,
    min_score: Option<f32>,
}

impl RetrievalQuery {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_RETRIEVAL_LIMIT,
            document_ids: None,
            min_score: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_document_ids(mut self, ids: Vec<i64>) -> Self {
        self.document_ids = Some(ids);
        self
    }

    pub fn for_document(self, id: i64) -> Self {
        self.with_document_ids(vec![id])
    }

    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn document_ids(&self) -> Option<&[i64]> {
        self.document_ids.as_deref()
    }

    pub fn min_score(&self) -> Option<f32> {
        self.min_score
    }

    /// Whether a chunk of `document_id` is in scope for this query.
    pub fn includes_document(&self, document_id: i64) -> bool {
        self.document_ids
            .as_ref()
            .map(|ids| ids.contains(&document_id))
            .unwrap_or(true)
    }

    pub fn accepts_score(&self, score: f32) -> bool {
        self.min_score.map(|min| score >= min).unwrap_or(true)
    }
}

impl Default for RetrievalQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    chunk: DocumentChunk,
    document_name: String,
    score: f32,
}

impl RetrievedChunk {
    pub fn new(chunk: DocumentChunk, document_name: String, score: f32) -> Self {
        Self {
            chunk,
            document_name,
            score,
        }
    }

    pub fn chunk(&self) -> &DocumentChunk {
        &self.chunk
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

/// Orders search results: score descending, then document id and chunk index.
pub fn sort_retrieved(results: &mut [RetrievedChunk]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.document_id().cmp(&b.chunk.document_id()))
            .then(a.chunk.chunk_index().cmp(&b.chunk.chunk_index()))
    });
}

/// A chunk that contributed context to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSource {
    pub document_id: i64,
    pub document_name: String,
    pub chunk_index: u32,
    pub score: Option<f32>,
    pub preview: String,
}

/// The answer to a question, with the chunks used to build it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub document_id: Option<i64>,
    pub sources: Vec<AnswerSource>,
}
