use serde::{Deserialize, Serialize};

use super::format_timestamp;

/// A logged question and its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    id: i64,
    query_text: String,
    /// `None` for a query over all documents.
    document_id: Option<i64>,
    result_text: String,
    query_date: i64,
}

impl QueryRecord {
    pub fn reconstitute(
        id: i64,
        query_text: String,
        document_id: Option<i64>,
        result_text: String,
        query_date: i64,
    ) -> Self {
        Self {
            id,
            query_text,
            document_id,
            result_text,
            query_date,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn document_id(&self) -> Option<i64> {
        self.document_id
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn query_date(&self) -> i64 {
        self.query_date
    }

    pub fn is_global(&self) -> bool {
        self.document_id.is_none()
    }

    pub fn scope_display(&self) -> String {
        match self.document_id {
            Some(id) => format!("document {}", id),
            None => "all documents".to_string(),
        }
    }

    pub fn query_date_display(&self) -> String {
        format_timestamp(self.query_date)
    }
}

#[derive(Debug, Clone)]
pub struct NewQueryRecord {
    pub query_text: String,
    pub document_id: Option<i64>,
    pub result_text: String,
}

impl NewQueryRecord {
    pub fn new(
        query_text: impl Into<String>,
        document_id: Option<i64>,
        result_text: impl Into<String>,
    ) -> Self {
        Self {
            query_text: query_text.into(),
            document_id,
            result_text: result_text.into(),
        }
    }
}
