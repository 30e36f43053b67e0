mod duckdb_document_repository;
mod duckdb_query_log_repository;
mod duckdb_vector_repository;
mod groq_client;
mod in_memory_document_store;
pub mod loaders;
mod mock_chat_client;
mod mock_embedding;
mod ort_embedding;

pub use duckdb_document_repository::*;
pub use duckdb_query_log_repository::*;
pub use duckdb_vector_repository::*;
pub use groq_client::*;
pub use in_memory_document_store::*;
pub use loaders::FileDocumentLoader;
pub use mock_chat_client::*;
pub use mock_embedding::*;
pub use ort_embedding::*;
