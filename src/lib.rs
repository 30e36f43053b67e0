pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    ChatClient, DocumentLoader, DocumentRepository, EmbeddingService, QueryLogRepository,
    VectorRepository, DeleteDocumentUseCase, IngestDocumentUseCase, ListDocumentsUseCase,
    QueryDocumentsUseCase, QueryHistoryUseCase,
};

pub use connector::{
    Container, ContainerConfig, DuckdbDocumentRepository, DuckdbQueryLogRepository,
    DuckdbVectorRepository, FileDocumentLoader, GroqClient, InMemoryDocumentStore,
    MockChatClient, MockEmbedding, OrtEmbedding, Router,
};

pub use domain::{
    Answer, Document, DocumentChunk, DomainError, Embedding, EmbeddingConfig, Manifest,
    Passage, QueryRecord, RetrievalQuery, RetrievedChunk, TextSplitter,
};
