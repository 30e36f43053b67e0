use anyhow::Result;

use super::super::Container;

pub struct StatsController<'a> {
    container: &'a Container,
}

impl<'a> StatsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn stats(&self) -> Result<String> {
        let documents = self.container.list_use_case().execute().await?.len();
        let chunks = self.container.list_use_case().count_chunks().await?;
        let queries = self.container.history_use_case().count().await?;
        Ok(self.format_stats(documents, chunks, queries))
    }

    fn format_stats(&self, documents: usize, chunks: u64, queries: u64) -> String {
        let mode = if self.container.development_mode() {
            " (development mode)"
        } else {
            ""
        };

        format!(
            "DocQA Statistics\n================\nDocuments:       {}\nChunks:          {}\nQueries:         {}\nStorage:         {}\nEmbedding model: {}\nLLM:             {}{}",
            documents,
            chunks,
            queries,
            self.container.storage_kind().describe(),
            self.container.embedding_model(),
            self.container.chat_model(),
            mode
        )
    }
}
