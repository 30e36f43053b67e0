use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::DomainError;

/// Extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "txt", "csv", "pdf", "xlsx", "xls", "docx", "doc", "json", "html", "htm", "xml", "eml", "msg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Text,
    Csv,
    Pdf,
    Excel,
    Word,
    Json,
    Html,
    Xml,
    Email,
    Unknown,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => FileFormat::Text,
            "csv" => FileFormat::Csv,
            "pdf" => FileFormat::Pdf,
            "xlsx" | "xls" => FileFormat::Excel,
            "docx" | "doc" => FileFormat::Word,
            "json" => FileFormat::Json,
            "html" | "htm" => FileFormat::Html,
            "xml" => FileFormat::Xml,
            "eml" | "msg" => FileFormat::Email,
            _ => FileFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileFormat::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Text => "text",
            FileFormat::Csv => "csv",
            FileFormat::Pdf => "pdf",
            FileFormat::Excel => "excel",
            FileFormat::Word => "word",
            FileFormat::Json => "json",
            FileFormat::Html => "html",
            FileFormat::Xml => "xml",
            FileFormat::Email => "email",
            FileFormat::Unknown => "unknown",
        }
    }

    /// Human readable description of the format.
    pub fn description(&self) -> &'static str {
        match self {
            FileFormat::Text => "Text file",
            FileFormat::Csv => "CSV data",
            FileFormat::Pdf => "PDF document",
            FileFormat::Excel => "Excel spreadsheet",
            FileFormat::Word => "Word document",
            FileFormat::Json => "JSON data",
            FileFormat::Html => "HTML document",
            FileFormat::Xml => "XML document",
            FileFormat::Email => "Email message",
            FileFormat::Unknown => "Unknown format",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Text => "text/plain",
            FileFormat::Csv => "text/csv",
            FileFormat::Pdf => "application/pdf",
            FileFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            FileFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileFormat::Json => "application/json",
            FileFormat::Html => "text/html",
            FileFormat::Xml => "application/xml",
            FileFormat::Email => "message/rfc822",
            FileFormat::Unknown => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_supported_extension(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// File-level facts gathered before a file is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    /// Lowercase, with the leading dot (`.pdf`); empty when the file has none.
    pub file_extension: String,
    pub file_size: u64,
    pub file_path: String,
    pub format: FileFormat,
}

impl FileMetadata {
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let meta = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::not_found(format!("File not found: {}", path.display()))
            } else {
                DomainError::IoError(e)
            }
        })?;

        if !meta.is_file() {
            return Err(DomainError::invalid_input(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        Ok(Self {
            file_name,
            file_extension,
            file_size: meta.len(),
            file_path: path.to_string_lossy().to_string(),
            format: FileFormat::from_path(path),
        })
    }

    pub fn type_description(&self) -> &'static str {
        self.format.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("txt"), FileFormat::Text);
        assert_eq!(FileFormat::from_extension("XLSX"), FileFormat::Excel);
        assert_eq!(FileFormat::from_extension("xls"), FileFormat::Excel);
        assert_eq!(FileFormat::from_extension(".htm"), FileFormat::Html);
        assert_eq!(FileFormat::from_extension("msg"), FileFormat::Email);
        assert_eq!(FileFormat::from_extension("rs"), FileFormat::Unknown);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("reports/q1.PDF")),
            FileFormat::Pdf
        );
        assert_eq!(FileFormat::from_path(Path::new("README")), FileFormat::Unknown);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("docx"));
        assert!(is_supported_extension(".CSV"));
        assert!(!is_supported_extension("exe"));
    }

    #[test]
    fn test_file_metadata_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Notes.TXT");
        std::fs::write(&path, "hello").unwrap();

        let meta = FileMetadata::from_path(&path).unwrap();
        assert_eq!(meta.file_name, "Notes.TXT");
        assert_eq!(meta.file_extension, ".txt");
        assert_eq!(meta.file_size, 5);
        assert_eq!(meta.type_description(), "Text file");
    }

    #[test]
    fn test_file_metadata_missing_file() {
        let err = FileMetadata::from_path(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.is_not_found());
    }
}
