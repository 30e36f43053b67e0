use std::path::Path;

use crate::domain::{DomainError, Passage};

/// One passage per record, rendered as `header: value` lines.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DomainError::parse(format!("Failed to open CSV {}: {}", path.display(), e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DomainError::parse(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut passages = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| DomainError::parse(format!("Invalid CSV record {}: {}", row, e)))?;

        let content = record
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let header = headers
                    .get(i)
                    .filter(|h| !h.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("column_{}", i + 1));
                format!("{}: {}", header, value.trim())
            })
            .collect::<Vec<_>>()
            .join("\n");

        passages.push(
            Passage::new(content)
                .with_metadata("source", source)
                .with_metadata("row", row as u64),
        );
    }

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rows_become_passages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        fs::write(&path, "region,total\nnorth,120\nsouth,80,extra\n").unwrap();

        let passages = load(&path, "sales.csv").unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "region: north\ntotal: 120");
        assert_eq!(passages[0].metadata["row"], 0);
        assert_eq!(passages[1].content, "region: south\ntotal: 80\ncolumn_3: extra");
        assert_eq!(passages[1].metadata["row"], 1);
        assert_eq!(passages[1].metadata["source"], "sales.csv");
    }
}
