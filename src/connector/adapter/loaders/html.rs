use std::path::Path;

use scraper::{ElementRef, Html, Selector};

use crate::domain::{DomainError, Passage};

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Visible text of the page body plus its `<title>`.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let raw = std::fs::read_to_string(path)?;
    let (title, content) = extract(&raw)?;
    Ok(vec![Passage::new(content)
        .with_metadata("source", source)
        .with_metadata("title", title)])
}

fn selector(css: &str) -> Result<Selector, DomainError> {
    Selector::parse(css).map_err(|e| DomainError::internal(format!("Invalid selector {}: {}", css, e)))
}

fn extract(raw: &str) -> Result<(String, String), DomainError> {
    let document = Html::parse_document(raw);

    let title = document
        .select(&selector("title")?)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let root = document
        .select(&selector("body")?)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    collect_text(root, &mut lines);

    Ok((title, lines.join("\n")))
}

fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, lines);
            }
        } else if let Some(text) = child.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
            }
        }
    }
}
