//! File loaders turning supported formats into text passages.
//!
//! Every specific loader falls back to the generic loader when it fails, and
//! formats without a specific loader (`.xls`, `.doc`, `.msg`, unknown
//! extensions) go straight to it.

mod delimited;
mod email;
mod generic;
mod html;
mod json;
mod office;
mod pdf;
mod text;
mod xml;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::application::DocumentLoader;
use crate::domain::{DomainError, FileFormat, Passage};

type LoadFn = fn(&Path, &str) -> Result<Vec<Passage>, DomainError>;

/// Loads files by dispatching on their extension.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader;

impl FileDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    fn specific_loader(path: &Path) -> Option<LoadFn> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match FileFormat::from_path(path) {
            FileFormat::Text => Some(text::load),
            FileFormat::Csv => Some(delimited::load),
            FileFormat::Pdf => Some(pdf::load),
            FileFormat::Excel if extension == "xlsx" => Some(office::load_xlsx),
            FileFormat::Word if extension == "docx" => Some(office::load_docx),
            FileFormat::Json => Some(json::load),
            FileFormat::Html => Some(html::load),
            FileFormat::Xml => Some(xml::load),
            FileFormat::Email if extension == "eml" => Some(email::load),
            _ => None,
        }
    }

    fn load_blocking(path: &Path) -> Result<Vec<Passage>, DomainError> {
        let source = path.to_string_lossy().to_string();

        match Self::specific_loader(path) {
            Some(load) => match load(path, &source) {
                Ok(passages) => Ok(passages),
                Err(e) => {
                    warn!(
                        "Loader for {} failed, trying generic loader: {}",
                        path.display(),
                        e
                    );
                    generic::load(path, &source)
                }
            },
            None => {
                debug!("Using generic loader for {}", path.display());
                generic::load(path, &source)
            }
        }
    }
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Passage>, DomainError> {
        let owned: PathBuf = path.to_path_buf();
        let passages = tokio::task::spawn_blocking(move || Self::load_blocking(&owned))
            .await
            .map_err(|e| DomainError::internal(format!("Loader task failed: {}", e)))??;

        if passages.is_empty() {
            warn!("No content extracted from {}", path.display());
        } else {
            info!(
                "Loaded {} with {} elements",
                path.display(),
                passages.len()
            );
        }

        Ok(passages)
    }
}
