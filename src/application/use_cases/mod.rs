mod delete_document;
mod ingest_document;
mod list_documents;
mod query_documents;
mod query_history;

pub use delete_document::*;
pub use ingest_document::*;
pub use list_documents::*;
pub use query_documents::*;
pub use query_history::*;
