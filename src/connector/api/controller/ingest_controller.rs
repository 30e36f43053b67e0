use std::path::Path;

use anyhow::Result;

use crate::application::IngestedDocument;

use super::super::Container;

pub const CLI_SOURCE: &str = "cli";

pub struct IngestController<'a> {
    container: &'a Container,
}

impl<'a> IngestController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Ingests a single file, or every supported file below a directory.
    pub async fn ingest(&self, path: String) -> Result<String> {
        let use_case = self.container.ingest_use_case();
        let path = Path::new(&path);

        let ingested = if path.is_dir() {
            use_case.execute_dir(path, CLI_SOURCE).await?
        } else {
            vec![use_case.execute(path, CLI_SOURCE).await?]
        };

        Ok(self.format_ingested(&ingested))
    }

    fn format_ingested(&self, ingested: &[IngestedDocument]) -> String {
        if ingested.is_empty() {
            return "No documents ingested.".to_string();
        }

        let mut output = format!("Ingested {} document(s):\n", ingested.len());
        for item in ingested {
            output.push_str(&format!(
                "  #{} {} ({} chunks, {} embedded)\n",
                item.document.id(),
                item.document.display_name(),
                item.chunk_count,
                item.embedded_count
            ));
        }
        output
    }
}
