use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document. Ids are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: i64,
    filename: String,
    file_type: String,
    file_size: u64,
    /// Unix seconds.
    upload_date: i64,
    metadata: Map<String, Value>,
}

impl Document {
    /// Reconstitutes from persisted data (used by adapters).
    pub fn reconstitute(
        id: i64,
        filename: String,
        file_type: String,
        file_size: u64,
        upload_date: i64,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            filename,
            file_type,
            file_size,
            upload_date,
            metadata,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn upload_date(&self) -> i64 {
        self.upload_date
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn display_name(&self) -> String {
        format!("ID: {} - {}", self.id, self.filename)
    }

    pub fn upload_date_display(&self) -> String {
        format_timestamp(self.upload_date)
    }
}

/// Data needed to create a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
    pub metadata: Map<String, Value>,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, file_type: impl Into<String>, file_size: u64) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
            file_size,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Computes SHA-256 hash of file content.
pub fn compute_content_hash(content: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(content);
    format!("{:x}", hash)
}
