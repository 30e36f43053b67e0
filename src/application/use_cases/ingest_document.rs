use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::{DocumentLoader, DocumentRepository, EmbeddingService};
use crate::domain::{
    compute_content_hash, is_supported_extension, ChunkDraft, Document, DomainError, Embedding,
    FileMetadata, NewDocument, Passage, TextSplitter,
};

/// A loaded and split file that has not been stored yet.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub file: FileMetadata,
    pub passages: Vec<Passage>,
    pub chunks: Vec<ChunkDraft>,
    pub content_hash: String,
}

impl ProcessedDocument {
    /// Overrides the stored file name, e.g. for uploads written to a temp file.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file.file_name = name.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub document: Document,
    pub chunk_count: usize,
    pub embedded_count: usize,
}

pub struct IngestDocumentUseCase {
    document_repo: Arc<dyn DocumentRepository>,
    loader: Arc<dyn DocumentLoader>,
    embedding_service: Arc<dyn EmbeddingService>,
    splitter: TextSplitter,
}

impl IngestDocumentUseCase {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository>,
        loader: Arc<dyn DocumentLoader>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            document_repo,
            loader,
            embedding_service,
            splitter: TextSplitter::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Loads and splits a file without storing anything.
    pub async fn process(&self, path: &Path) -> Result<ProcessedDocument, DomainError> {
        let file = FileMetadata::from_path(path)?;
        debug!(
            "Processing {} ({}, {} bytes)",
            file.file_name,
            file.type_description(),
            file.file_size
        );

        let bytes = tokio::fs::read(path).await?;
        let content_hash = compute_content_hash(&bytes);

        let passages = self.loader.load(path).await?;
        if passages.is_empty() {
            return Err(no_content(&file.file_name));
        }

        let chunks = self.splitter.split_passages(&passages);
        if chunks.is_empty() {
            return Err(no_content(&file.file_name));
        }

        info!(
            "Split {} into {} chunks from {} passages",
            file.file_name,
            chunks.len(),
            passages.len()
        );

        Ok(ProcessedDocument {
            file,
            passages,
            chunks,
            content_hash,
        })
    }

    /// Embeds (best effort) and persists a processed document.
    pub async fn store(
        &self,
        processed: ProcessedDocument,
        source: &str,
    ) -> Result<IngestedDocument, DomainError> {
        let ProcessedDocument {
            file,
            passages,
            chunks,
            content_hash,
        } = processed;

        let chunks = self.embed_chunks(&file.file_name, chunks).await;
        let embedded_count = chunks.iter().filter(|c| c.embedding.is_some()).count();

        let mut new_document = NewDocument::new(
            file.file_name.clone(),
            file.format.mime_type(),
            file.file_size,
        )
        .with_metadata("source", source)
        .with_metadata("file_extension", file.file_extension.clone())
        .with_metadata("type", file.type_description())
        .with_metadata("content_hash", content_hash)
        .with_metadata("passage_count", passages.len() as u64);

        if embedded_count > 0 {
            new_document = new_document.with_metadata(
                "embedding_model",
                Value::from(self.embedding_service.config().model_name()),
            );
        }

        let document = self.document_repo.save_document(new_document).await?;
        let stored = self.document_repo.save_chunks(document.id(), &chunks).await?;

        info!(
            "Stored document {} with {} chunks ({} embedded)",
            document.display_name(),
            stored.len(),
            embedded_count
        );

        Ok(IngestedDocument {
            document,
            chunk_count: stored.len(),
            embedded_count,
        })
    }

    pub async fn execute(&self, path: &Path, source: &str) -> Result<IngestedDocument, DomainError> {
        let processed = self.process(path).await?;
        self.store(processed, source).await
    }

    /// Ingests every supported file under `dir`, skipping files that fail.
    pub async fn execute_dir(
        &self,
        dir: &Path,
        source: &str,
    ) -> Result<Vec<IngestedDocument>, DomainError> {
        if !dir.is_dir() {
            return Err(DomainError::invalid_input(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let start_time = Instant::now();

        let files: Vec<_> = WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| is_supported_extension(&ext.to_string_lossy()))
                    .unwrap_or(false)
            })
            .collect();

        info!("Found {} files to ingest in {}", files.len(), dir.display());

        let progress_bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            progress_bar.set_style(style.progress_chars("#>-"));
        }

        let mut ingested = Vec::new();
        for entry in files {
            let entry_path = entry.path();
            let relative_path = entry_path
                .strip_prefix(dir)
                .unwrap_or(entry_path)
                .to_string_lossy()
                .to_string();
            progress_bar.set_message(relative_path.clone());

            match self.execute(entry_path, source).await {
                Ok(document) => ingested.push(document),
                Err(e) => warn!("Failed to ingest {}: {}", relative_path, e),
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("done");

        info!(
            "Ingested {} documents in {:.2}s",
            ingested.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(ingested)
    }

    async fn embed_chunks(&self, file_name: &str, chunks: Vec<ChunkDraft>) -> Vec<ChunkDraft> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let model = self.embedding_service.config().model_name().to_string();

        match self.embedding_service.embed_documents(&texts).await {
            Ok(vectors) if vectors.len() == chunks.len() => chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| chunk.with_embedding(Embedding::new(vector, model.clone())))
                .collect(),
            Ok(vectors) => {
                warn!(
                    "Embedding count mismatch for {} ({} vectors for {} chunks), storing without embeddings",
                    file_name,
                    vectors.len(),
                    chunks.len()
                );
                chunks
            }
            Err(e) => {
                warn!(
                    "Failed to generate embeddings for {}, storing without embeddings: {}",
                    file_name, e
                );
                chunks
            }
        }
    }
}

fn no_content(file_name: &str) -> DomainError {
    warn!("No content extracted from {}", file_name);
    DomainError::invalid_input(format!(
        "no content could be extracted from {}",
        file_name
    ))
}
