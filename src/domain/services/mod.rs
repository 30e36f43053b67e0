//! Pure domain services: splitting, prompting, similarity and manifests.

mod manifest;
mod prompt;
mod similarity;
mod text_splitter;

pub use manifest::*;
pub use prompt::*;
pub use similarity::*;
pub use text_splitter::*;
