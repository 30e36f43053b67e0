use anyhow::Result;

use crate::domain::Document;

use super::super::Container;

pub struct DeleteController<'a> {
    container: &'a Container,
}

impl<'a> DeleteController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn delete(&self, id: i64) -> Result<String> {
        let use_case = self.container.delete_use_case();
        let document = use_case.execute(id).await?;
        Ok(self.format_delete_success(&document))
    }

    fn format_delete_success(&self, document: &Document) -> String {
        format!(
            "Deleted document {} ({}) with its chunks and query history.",
            document.id(),
            document.display_name()
        )
    }
}
