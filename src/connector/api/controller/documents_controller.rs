use anyhow::Result;

use crate::domain::{Document, DocumentChunk};

use super::super::Container;

pub struct DocumentsController<'a> {
    container: &'a Container,
}

impl<'a> DocumentsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let documents = self.container.list_use_case().execute().await?;
        Ok(self.format_document_list(&documents))
    }

    pub async fn show(&self, id: i64) -> Result<String> {
        let use_case = self.container.list_use_case();
        let document = use_case.get(id).await?;
        let chunks = use_case.chunks(id).await?;
        Ok(self.format_document(&document, &chunks))
    }

    fn format_document_list(&self, documents: &[Document]) -> String {
        if documents.is_empty() {
            return "No documents ingested.".to_string();
        }

        let mut output = format!(
            "{:>5}  {:<40}  {:<12}  {:>10}  {}\n",
            "ID", "NAME", "TYPE", "SIZE", "UPLOADED"
        );
        for document in documents {
            output.push_str(&format!(
                "{:>5}  {:<40}  {:<12}  {:>10}  {}\n",
                document.id(),
                truncate(&document.display_name(), 40),
                truncate(document.metadata_str("type").unwrap_or("-"), 12),
                document.file_size(),
                document.upload_date_display()
            ));
        }
        output
    }

    fn format_document(&self, document: &Document, chunks: &[DocumentChunk]) -> String {
        let mut output = format!(
            "Document #{}\n  Name:     {}\n  Type:     {}\n  Size:     {} bytes\n  Uploaded: {}\n",
            document.id(),
            document.display_name(),
            document.file_type(),
            document.file_size(),
            document.upload_date_display()
        );

        if !document.metadata().is_empty() {
            output.push_str("  Metadata:\n");
            for (key, value) in document.metadata() {
                let value = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                output.push_str(&format!("    {}: {}\n", key, value));
            }
        }

        output.push_str(&format!("\n{} chunks:\n", chunks.len()));
        for chunk in chunks {
            output.push_str(&format!(
                "\n--- Chunk {}{} ---\n{}\n",
                chunk.chunk_index(),
                if chunk.has_embedding() { "" } else { " (no embedding)" },
                chunk.chunk_text()
            ));
        }

        output
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
