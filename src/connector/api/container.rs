use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::application::{
    ChatClient, DeleteDocumentUseCase, DocumentLoader, DocumentRepository, EmbeddingService,
    IngestDocumentUseCase, ListDocumentsUseCase, QueryDocumentsUseCase, QueryHistoryUseCase,
    QueryLogRepository, VectorRepository,
};
use crate::connector::adapter::{
    usable_api_key, DuckdbDocumentRepository, DuckdbQueryLogRepository, DuckdbVectorRepository,
    FileDocumentLoader, GroqClient, InMemoryDocumentStore, MockChatClient, MockEmbedding,
    OrtEmbedding, DATABASE_FILE_NAME, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use crate::domain::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

pub struct ContainerConfig {
    pub data_dir: String,
    pub memory_storage: bool,
    pub mock_embeddings: bool,
    pub mock_llm: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// `None`, empty or the `.env` placeholder selects development mode.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.docqa".to_string(),
            memory_storage: false,
            mock_embeddings: false,
            mock_llm: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            groq_api_key: None,
            groq_model: DEFAULT_MODEL.to_string(),
            groq_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Where documents are kept for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    DuckDb(PathBuf),
    InMemory,
}

impl StorageKind {
    pub fn describe(&self) -> String {
        match self {
            StorageKind::DuckDb(path) => format!("DuckDB ({})", path.display()),
            StorageKind::InMemory => "in-memory (not persisted)".to_string(),
        }
    }
}

pub struct Container {
    document_repo: Arc<dyn DocumentRepository>,
    vector_repo: Arc<dyn VectorRepository>,
    query_log: Arc<dyn QueryLogRepository>,
    loader: Arc<dyn DocumentLoader>,
    embedding_service: Arc<dyn EmbeddingService>,
    chat_client: Arc<dyn ChatClient>,
    splitter: TextSplitter,
    storage: StorageKind,
    development_mode: bool,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;

        let api_key = usable_api_key(config.groq_api_key.as_deref());
        let development_mode = api_key.is_none();
        if development_mode {
            info!("No Groq API key configured; running in development mode");
        }

        let chat_client: Arc<dyn ChatClient> = match api_key {
            Some(key) if !config.mock_llm => {
                debug!("Using Groq chat client with model {}", config.groq_model);
                Arc::new(GroqClient::new(
                    key,
                    config.groq_model.clone(),
                    config.groq_base_url.clone(),
                ))
            }
            _ => {
                debug!("Using mock chat client");
                Arc::new(MockChatClient::new())
            }
        };

        let embedding_service: Arc<dyn EmbeddingService> =
            if config.mock_embeddings || development_mode {
                debug!("Using mock embedding service");
                Arc::new(MockEmbedding::new())
            } else {
                debug!("Initializing ONNX embedding service...");
                match OrtEmbedding::new(None) {
                    Ok(service) => Arc::new(service),
                    Err(e) => {
                        warn!(
                            "Failed to initialize ONNX embeddings: {}. Falling back to mock embeddings.",
                            e
                        );
                        Arc::new(MockEmbedding::new())
                    }
                }
            };

        let (document_repo, vector_repo, query_log, storage) = Self::storage(&config);

        Ok(Self {
            document_repo,
            vector_repo,
            query_log,
            loader: Arc::new(FileDocumentLoader::new()),
            embedding_service,
            chat_client,
            splitter,
            storage,
            development_mode,
            config,
        })
    }

    #[allow(clippy::type_complexity)]
    fn storage(
        config: &ContainerConfig,
    ) -> (
        Arc<dyn DocumentRepository>,
        Arc<dyn VectorRepository>,
        Arc<dyn QueryLogRepository>,
        StorageKind,
    ) {
        if !config.memory_storage {
            let db_path = PathBuf::from(&config.data_dir).join(DATABASE_FILE_NAME);
            let opened = std::fs::create_dir_all(&config.data_dir)
                .map_err(|e| e.to_string())
                .and_then(|_| DuckdbDocumentRepository::new(&db_path).map_err(|e| e.to_string()));

            match opened {
                Ok(repo) => {
                    debug!("Using DuckDB storage at {:?}", db_path);
                    // Share the connection with the vector and query log repositories
                    let shared_conn = repo.shared_connection();
                    return (
                        Arc::new(repo),
                        Arc::new(DuckdbVectorRepository::with_connection(Arc::clone(
                            &shared_conn,
                        ))),
                        Arc::new(DuckdbQueryLogRepository::with_connection(shared_conn)),
                        StorageKind::DuckDb(db_path),
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to initialize DuckDB ({}): {}. Falling back to in-memory storage.",
                        db_path.display(),
                        e
                    );
                }
            }
        } else {
            debug!("Using in-memory storage");
        }

        let store = Arc::new(InMemoryDocumentStore::new());
        (
            store.clone(),
            store.clone(),
            store,
            StorageKind::InMemory,
        )
    }

    pub fn ingest_use_case(&self) -> IngestDocumentUseCase {
        IngestDocumentUseCase::new(
            self.document_repo.clone(),
            self.loader.clone(),
            self.embedding_service.clone(),
        )
        .with_splitter(self.splitter.clone())
    }

    pub fn list_use_case(&self) -> ListDocumentsUseCase {
        ListDocumentsUseCase::new(self.document_repo.clone())
    }

    pub fn delete_use_case(&self) -> DeleteDocumentUseCase {
        DeleteDocumentUseCase::new(self.document_repo.clone())
    }

    pub fn query_use_case(&self) -> QueryDocumentsUseCase {
        QueryDocumentsUseCase::new(
            self.document_repo.clone(),
            self.vector_repo.clone(),
            self.query_log.clone(),
            self.embedding_service.clone(),
            self.chat_client.clone(),
        )
    }

    pub fn history_use_case(&self) -> QueryHistoryUseCase {
        QueryHistoryUseCase::new(self.query_log.clone())
    }

    pub fn storage_kind(&self) -> &StorageKind {
        &self.storage
    }

    pub fn embedding_model(&self) -> &str {
        self.embedding_service.config().model_name()
    }

    pub fn chat_model(&self) -> &str {
        self.chat_client.model_name()
    }

    pub fn development_mode(&self) -> bool {
        self.development_mode
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }
}
