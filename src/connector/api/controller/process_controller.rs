use std::path::Path;

use anyhow::Result;

use crate::application::ProcessedDocument;

use super::super::Container;

const PREVIEW_CHUNKS: usize = 3;
const PREVIEW_CHARS: usize = 500;

/// Loads and splits a file without storing it.
pub struct ProcessController<'a> {
    container: &'a Container,
}

impl<'a> ProcessController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn process(&self, path: String) -> Result<String> {
        let processed = self
            .container
            .ingest_use_case()
            .process(Path::new(&path))
            .await?;
        Ok(self.format_processed(&processed))
    }

    fn format_processed(&self, processed: &ProcessedDocument) -> String {
        let file = &processed.file;
        let mut output = format!(
            "File:     {}\nType:     {} ({})\nSize:     {} bytes\nPassages: {}\nChunks:   {}\n",
            file.file_name,
            file.type_description(),
            file.format.mime_type(),
            file.file_size,
            processed.passages.len(),
            processed.chunks.len()
        );

        for chunk in processed.chunks.iter().take(PREVIEW_CHUNKS) {
            output.push_str(&format!(
                "\n--- Chunk {} ---\n{}\n",
                chunk.chunk_index + 1,
                chunk.preview(PREVIEW_CHARS)
            ));
        }

        if processed.chunks.len() > PREVIEW_CHUNKS {
            output.push_str(&format!(
                "\n... and {} more chunks\n",
                processed.chunks.len() - PREVIEW_CHUNKS
            ));
        }

        output
    }
}
