//! Office Open XML (`.docx`, `.xlsx`) loaders reading the zipped XML parts.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::domain::{DomainError, Passage};

type Archive = ZipArchive<File>;

fn open_archive(path: &Path) -> Result<Archive, DomainError> {
    let file = File::open(path)?;
    ZipArchive::new(file)
        .map_err(|e| DomainError::parse(format!("Not an OOXML archive {}: {}", path.display(), e)))
}

fn read_entry(archive: &mut Archive, name: &str) -> Result<Option<String>, DomainError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DomainError::parse(format!("Failed to read {}: {}", name, e))),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| DomainError::parse(format!("Failed to read {}: {}", name, e)))?;
    Ok(Some(content))
}

fn xml_error(part: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::parse(format!("Invalid XML in {}: {}", part, e))
}

fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.local_name().as_ref() == local_name)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Paragraphs of `word/document.xml` joined by newlines.
pub(super) fn load_docx(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, "word/document.xml")?
        .ok_or_else(|| DomainError::parse("word/document.xml is missing"))?;

    let content = docx_paragraphs(&xml)?.join("\n");
    Ok(vec![Passage::new(content).with_metadata("source", source)])
}

fn docx_paragraphs(xml: &str) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| xml_error("word/document.xml", e))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("word/document.xml", e)),
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        paragraphs.push(tail.to_string());
    }

    Ok(paragraphs)
}

/// One passage per worksheet, rows rendered as tab-separated cell values.
pub(super) fn load_xlsx(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let mut archive = open_archive(path)?;

    let shared_strings = match read_entry(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let workbook = read_entry(&mut archive, "xl/workbook.xml")?
        .ok_or_else(|| DomainError::parse("xl/workbook.xml is missing"))?;
    let relationships = match read_entry(&mut archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let mut passages = Vec::new();
    for (index, (name, relationship_id)) in parse_sheets(&workbook)?.into_iter().enumerate() {
        let part = relationship_id
            .and_then(|id| relationships.get(&id).cloned())
            .map(|target| resolve_target(&target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));

        let Some(sheet_xml) = read_entry(&mut archive, &part)? else {
            continue;
        };

        let content = sheet_rows(&sheet_xml, &shared_strings)?.join("\n");
        if content.trim().is_empty() {
            continue;
        }

        passages.push(
            Passage::new(content)
                .with_metadata("source", source)
                .with_metadata("page_name", name)
                .with_metadata("page_number", (index + 1) as u64),
        );
    }

    Ok(passages)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = true;
                    current.clear();
                }
                b"t" => in_text = in_item,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = false;
                    strings.push(std::mem::take(&mut current));
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| xml_error("sharedStrings.xml", e))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("sharedStrings.xml", e)),
        }
    }

    Ok(strings)
}

/// Sheet names with their relationship ids, in workbook order.
fn parse_sheets(xml: &str) -> Result<Vec<(String, Option<String>)>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(&e, b"name").unwrap_or_else(|| format!("Sheet{}", sheets.len() + 1));
                sheets.push((name, attribute(&e, b"id")));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("workbook.xml", e)),
        }
    }

    Ok(sheets)
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id"), attribute(&e, b"Target")) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("workbook.xml.rels", e)),
        }
    }

    Ok(relationships)
}

#[derive(Default)]
struct Cell {
    kind: Option<String>,
    value: String,
}

impl Cell {
    fn render(self, shared_strings: &[String]) -> String {
        match self.kind.as_deref() {
            Some("s") => self
                .value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| shared_strings.get(i).cloned())
                .unwrap_or_default(),
            Some("b") => match self.value.trim() {
                "1" => "TRUE".to_string(),
                "0" => "FALSE".to_string(),
                other => other.to_string(),
            },
            _ => self.value,
        }
    }
}

fn sheet_rows(xml: &str, shared_strings: &[String]) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<Cell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell = Some(Cell {
                        kind: attribute(&e, b"t"),
                        value: String::new(),
                    })
                }
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(done) = cell.take() {
                        row.push(done.render(shared_strings));
                    }
                }
                b"row" => {
                    if row.iter().any(|value| !value.trim().is_empty()) {
                        rows.push(row.join("\t"));
                    }
                    row.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_value => {
                let text = e.unescape().map_err(|e| xml_error("worksheet", e))?;
                if let Some(current) = cell.as_mut() {
                    current.value.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error("worksheet", e)),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_docx_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.docx");
        write_zip(
            &path,
            &[(
                "word/document.xml",
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
                    <w:p><w:r><w:t>Quarterly</w:t></w:r><w:r><w:t xml:space="preserve"> report</w:t></w:r></w:p>
                    <w:p></w:p>
                    <w:p><w:r><w:t>Profit &amp; loss</w:t></w:r></w:p>
                </w:body></w:document>"#,
            )],
        );

        let passages = load_docx(&path, "memo.docx").unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, "Quarterly report\nProfit & loss");
    }

    #[test]
    fn test_xlsx_sheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("budget.xlsx");
        write_zip(
            &path,
            &[
                (
                    "xl/workbook.xml",
                    r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>
                        <sheet name="Summary" sheetId="1" r:id="rId1"/>
                        <sheet name="Empty" sheetId="2" r:id="rId2"/>
                    </sheets></workbook>"#,
                ),
                (
                    "xl/_rels/workbook.xml.rels",
                    r#"<Relationships>
                        <Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
                        <Relationship Id="rId2" Target="worksheets/sheet2.xml"/>
                    </Relationships>"#,
                ),
                (
                    "xl/sharedStrings.xml",
                    r#"<sst><si><t>Item</t></si><si><t>Cost</t></si><si><t>Rent</t></si></sst>"#,
                ),
                (
                    "xl/worksheets/sheet1.xml",
                    r#"<worksheet><sheetData>
                        <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
                        <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>1200</v></c><c r="C2" t="inlineStr"><is><t>monthly</t></is></c></row>
                    </sheetData></worksheet>"#,
                ),
                ("xl/worksheets/sheet2.xml", r#"<worksheet><sheetData/></worksheet>"#),
            ],
        );

        let passages = load_xlsx(&path, "budget.xlsx").unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, "Item\tCost\nRent\t1200\tmonthly");
        assert_eq!(passages[0].metadata["page_name"], "Summary");
        assert_eq!(passages[0].metadata["page_number"], 1);
    }

    #[test]
    fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text").unwrap();

        assert!(load_docx(&path, "fake.docx").is_err());
    }
}
