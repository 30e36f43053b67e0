use anyhow::Result;

use crate::domain::{preview_text, QueryRecord};

use super::super::Container;

const ANSWER_PREVIEW_CHARS: usize = 200;

pub struct HistoryController<'a> {
    container: &'a Container,
}

impl<'a> HistoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn history(&self, limit: usize) -> Result<String> {
        let records = self.container.history_use_case().execute(limit).await?;
        Ok(self.format_history(&records))
    }

    fn format_history(&self, records: &[QueryRecord]) -> String {
        if records.is_empty() {
            return "No queries recorded.".to_string();
        }

        let mut output = format!("Last {} queries:\n\n", records.len());
        for record in records {
            output.push_str(&format!(
                "  #{} [{}] {}\n",
                record.id(),
                record.query_date_display(),
                record.scope_display()
            ));
            output.push_str(&format!("    Q: {}\n", record.query_text()));
            output.push_str(&format!(
                "    A: {}\n\n",
                preview_text(record.result_text(), ANSWER_PREVIEW_CHARS).replace('\n', " ")
            ));
        }

        output
    }
}
