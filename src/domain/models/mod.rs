mod document;
mod document_chunk;
mod embedding;
mod file_format;
mod metadata;
mod query_record;
mod retrieval;

pub use document::*;
pub use document_chunk::*;
pub use embedding::*;
pub use file_format::*;
pub use metadata::*;
pub use query_record::*;
pub use retrieval::*;
