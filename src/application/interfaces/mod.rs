mod chat_client;
mod document_loader;
mod document_repository;
mod embedding_service;
mod query_log_repository;
mod vector_repository;

pub use chat_client::*;
pub use document_loader::*;
pub use document_repository::*;
pub use embedding_service::*;
pub use query_log_repository::*;
pub use vector_repository::*;
