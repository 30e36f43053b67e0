use std::path::Path;

use tracing::debug;

use crate::domain::{DomainError, Passage};

/// One passage per page that has extractable text. Pages are numbered from 0.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| DomainError::parse(format!("Failed to read PDF {}: {}", path.display(), e)))?;

    let mut passages = Vec::new();
    for (page_number, _) in pdf.get_pages() {
        let text = match pdf.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!("No text extracted from page {}: {}", page_number, e);
                continue;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        passages.push(
            Passage::new(text)
                .with_metadata("source", source)
                .with_metadata("page", page_number.saturating_sub(1) as u64),
        );
    }

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    fn page_content(text: Option<&str>) -> Vec<u8> {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        Content { operations }.encode().unwrap()
    }

    /// Writes a PDF with one page per entry; `None` pages carry no text.
    fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(*text)));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_one_passage_per_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &[Some("Quarterly revenue"), Some("Operating costs")]);

        let passages = load(&path, "report.pdf").unwrap();

        assert_eq!(passages.len(), 2);
        assert!(passages[0].content.contains("Quarterly revenue"));
        assert!(passages[1].content.contains("Operating costs"));
        assert_eq!(passages[0].metadata["page"], 0);
        assert_eq!(passages[1].metadata["page"], 1);
        assert!(passages.iter().all(|p| p.metadata["source"] == "report.pdf"));
    }

    #[test]
    fn test_pages_without_text_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scanned.pdf");
        write_pdf(&path, &[Some("Cover letter"), None, Some("Appendix")]);

        let passages = load(&path, "scanned.pdf").unwrap();

        let pages: Vec<u64> = passages
            .iter()
            .map(|p| p.metadata["page"].as_u64().unwrap())
            .collect();
        assert_eq!(pages, vec![0, 2]);
        assert!(passages[1].content.contains("Appendix"));
    }

    #[test]
    fn test_invalid_pdf_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not a pdf").unwrap();

        let err = load(&path, "broken.pdf").unwrap_err();

        assert!(matches!(err, DomainError::ParseError(_)));
    }
}
