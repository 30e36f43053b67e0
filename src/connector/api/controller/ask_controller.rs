use anyhow::Result;

use crate::domain::Answer;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, question: String, document: Option<i64>) -> Result<String> {
        let use_case = self.container.query_use_case();
        let answer = match document {
            Some(id) => use_case.ask_document(id, &question).await?,
            None => use_case.ask_all(&question).await?,
        };
        Ok(self.format_answer(&answer))
    }

    fn format_answer(&self, answer: &Answer) -> String {
        let mut output = format!("{}\n", answer.text.trim());

        if !answer.sources.is_empty() {
            output.push_str("\nSources:\n");
            for (i, source) in answer.sources.iter().enumerate() {
                let score = source
                    .score
                    .map(|s| format!(" (score: {:.3})", s))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "{}. {} #{} chunk {}{}\n",
                    i + 1,
                    source.document_name,
                    source.document_id,
                    source.chunk_index,
                    score
                ));
            }
        }

        output
    }
}
