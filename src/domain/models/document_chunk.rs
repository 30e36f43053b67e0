use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ChunkMetadata, Embedding};

/// One element produced by a document loader (a page, a row, a JSON item...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub metadata: Map<String, Value>,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A chunk produced by the splitter that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDraft {
    pub chunk_index: u32,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding: Option<Embedding>,
}

impl ChunkDraft {
    pub fn new(chunk_index: u32, text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            chunk_index,
            text: text.into(),
            metadata,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Shortened text for previews; appends `...` when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.text, max_chars)
    }
}

/// A stored chunk of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: i64,
    document_id: i64,
    chunk_text: String,
    chunk_index: u32,
    metadata: ChunkMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<Embedding>,
}

impl DocumentChunk {
    pub fn reconstitute(
        id: i64,
        document_id: i64,
        chunk_text: String,
        chunk_index: u32,
        metadata: ChunkMetadata,
        embedding: Option<Embedding>,
    ) -> Self {
        Self {
            id,
            document_id,
            chunk_text,
            chunk_index,
            metadata,
            embedding,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn chunk_text(&self) -> &str {
        &self.chunk_text
    }

    pub fn chunk_index(&self) -> u32 {
        self.chunk_index
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.metadata
    }

    pub fn embedding(&self) -> Option<&Embedding> {
        self.embedding.as_ref()
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    pub fn without_embedding(mut self) -> Self {
        self.embedding = None;
        self
    }

    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.chunk_text, max_chars)
    }
}

pub fn preview_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut preview: String = text.chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    } else {
        text.to_string()
    }
}
