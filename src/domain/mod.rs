//! # Domain Layer
//!
//! Core models, the error type, and pure services (splitting, metadata
//! flattening, prompt building, manifest parsing).
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;
pub mod services;

pub use error::*;
pub use models::*;
pub use services::*;
