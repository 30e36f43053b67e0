use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{
    ChatClient, DocumentRepository, EmbeddingService, QueryLogRepository, VectorRepository,
};
use crate::domain::{
    build_stuff_prompt, Answer, AnswerSource, Document, DomainError, NewQueryRecord,
    RetrievalQuery, RetrievedChunk, DEFAULT_RETRIEVAL_LIMIT,
};

const SOURCE_PREVIEW_CHARS: usize = 200;

/// Answers questions about one document or about every stored document.
pub struct QueryDocumentsUseCase {
    document_repo: Arc<dyn DocumentRepository>,
    vector_repo: Arc<dyn VectorRepository>,
    query_log: Arc<dyn QueryLogRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
    chat_client: Arc<dyn ChatClient>,
    top_k: usize,
}

struct Context {
    chunks: Vec<RetrievedChunk>,
    scored: bool,
}

impl QueryDocumentsUseCase {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository>,
        vector_repo: Arc<dyn VectorRepository>,
        query_log: Arc<dyn QueryLogRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
        chat_client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            document_repo,
            vector_repo,
            query_log,
            embedding_service,
            chat_client,
            top_k: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn ask_document(&self, document_id: i64, question: &str) -> Result<Answer, DomainError> {
        let question = validate_question(question)?;
        let document = self
            .document_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Document not found: {}", document_id)))?;

        info!("Answering question about {}: {}", document.display_name(), question);

        let query = RetrievalQuery::new()
            .with_limit(self.top_k)
            .for_document(document_id);

        let mut context = self.retrieve(question, &query).await;
        if context.chunks.is_empty() {
            context = self.first_chunks(std::slice::from_ref(&document)).await?;
        }
        if context.chunks.is_empty() {
            return Err(DomainError::invalid_input(format!(
                "Document {} has no chunks to answer from",
                document_id
            )));
        }

        self.answer(question, Some(document_id), context).await
    }

    pub async fn ask_all(&self, question: &str) -> Result<Answer, DomainError> {
        let question = validate_question(question)?;

        let mut documents = self.document_repo.list().await?;
        if documents.is_empty() {
            return Err(DomainError::invalid_input(
                "No documents have been ingested yet",
            ));
        }

        info!("Answering question across {} documents: {}", documents.len(), question);

        let query = RetrievalQuery::new().with_limit(self.top_k);
        let mut context = self.retrieve(question, &query).await;
        if context.chunks.is_empty() {
            documents.sort_by_key(|d| d.id());
            context = self.first_chunks(&documents).await?;
        }
        if context.chunks.is_empty() {
            return Err(DomainError::invalid_input(
                "No document chunks are available to answer from",
            ));
        }

        self.answer(question, None, context).await
    }

    async fn retrieve(&self, question: &str, query: &RetrievalQuery) -> Context {
        let embedding = match self.embedding_service.embed_query(question).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to embed question, falling back to leading chunks: {}", e);
                return Context {
                    chunks: Vec::new(),
                    scored: false,
                };
            }
        };

        match self.vector_repo.search(&embedding, query).await {
            Ok(chunks) => {
                debug!("Retrieved {} chunks by similarity", chunks.len());
                Context {
                    chunks,
                    scored: true,
                }
            }
            Err(e) => {
                warn!("Similarity search failed, falling back to leading chunks: {}", e);
                Context {
                    chunks: Vec::new(),
                    scored: false,
                }
            }
        }
    }

    /// The first `top_k` chunks in document order, used when nothing can be scored.
    async fn first_chunks(&self, documents: &[Document]) -> Result<Context, DomainError> {
        let mut chunks = Vec::new();
        for document in documents {
            if chunks.len() >= self.top_k {
                break;
            }
            let remaining = self.top_k - chunks.len();
            let stored = self.document_repo.find_chunks(document.id()).await?;
            chunks.extend(
                stored
                    .into_iter()
                    .take(remaining)
                    .map(|chunk| RetrievedChunk::new(chunk, document.filename().to_string(), 0.0)),
            );
        }

        if !chunks.is_empty() {
            debug!("Using {} leading chunks as context", chunks.len());
        }

        Ok(Context {
            chunks,
            scored: false,
        })
    }

    async fn answer(
        &self,
        question: &str,
        document_id: Option<i64>,
        context: Context,
    ) -> Result<Answer, DomainError> {
        let start_time = Instant::now();
        let prompt = build_stuff_prompt(question, &context.chunks, document_id.is_none());

        let text = self.chat_client.complete(&prompt.system, &prompt.user).await?;

        info!(
            "Answer generated by {} in {:.2}s",
            self.chat_client.model_name(),
            start_time.elapsed().as_secs_f64()
        );

        if let Err(e) = self
            .query_log
            .save(NewQueryRecord::new(question, document_id, text.clone()))
            .await
        {
            warn!("Failed to log query: {}", e);
        }

        let sources = context
            .chunks
            .iter()
            .map(|retrieved| AnswerSource {
                document_id: retrieved.chunk().document_id(),
                document_name: retrieved.document_name().to_string(),
                chunk_index: retrieved.chunk().chunk_index(),
                score: context.scored.then(|| retrieved.score()),
                preview: retrieved.chunk().preview(SOURCE_PREVIEW_CHARS),
            })
            .collect();

        Ok(Answer {
            question: question.to_string(),
            text,
            document_id,
            sources,
        })
    }
}

fn validate_question(question: &str) -> Result<&str, DomainError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(DomainError::invalid_input("Question must not be empty"));
    }
    Ok(question)
}
