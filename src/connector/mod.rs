//! # Connector Layer
//!
//! External integrations implementing the application interfaces:
//! - Document loaders (PDF, OOXML, CSV, JSON, XML, HTML, e-mail, text)
//! - Storage (DuckDB, or in-memory)
//! - Embeddings (ONNX Runtime, or mock)
//! - Chat completions (Groq, or mock)
//!
//! plus the CLI controllers and the HTTP API.

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
pub use api::*;
