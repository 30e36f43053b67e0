use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::warn;

use crate::domain::{DomainError, Passage};

const METADATA_HEADERS: &[&str] = &["subject", "from", "to", "date"];

/// An RFC 822 message: selected headers as metadata, the text body as content.
pub(super) fn load(path: &Path, source: &str) -> Result<Vec<Passage>, DomainError> {
    let bytes = std::fs::read(path)?;
    let raw = String::from_utf8_lossy(&bytes);
    let message = parse_message(&raw);

    if message.headers.is_empty() {
        return Err(DomainError::parse(format!(
            "{} has no message headers",
            path.display()
        )));
    }

    let mut passage = Passage::new(message.text_body().trim()).with_metadata("source", source);
    for name in METADATA_HEADERS {
        if let Some(value) = message.header(name) {
            passage = passage.with_metadata(*name, decode_encoded_words(value));
        }
    }

    Ok(vec![passage])
}

struct Message {
    headers: Vec<(String, String)>,
    body: String,
}

impl Message {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn content_type(&self) -> String {
        self.header("content-type")
            .unwrap_or("text/plain")
            .to_ascii_lowercase()
    }

    /// The decoded body, or the first `text/plain` part of a multipart message.
    fn text_body(&self) -> String {
        let content_type = self.content_type();
        if !content_type.starts_with("multipart/") {
            return self.decoded_body();
        }

        let Some(boundary) = parameter(self.header("content-type").unwrap_or_default(), "boundary")
        else {
            return self.decoded_body();
        };

        let delimiter = format!("--{}", boundary);
        let parts: Vec<Message> = self
            .body
            .split(delimiter.as_str())
            .skip(1)
            .filter(|part| !part.starts_with("--"))
            .map(|part| parse_message(part.trim_start_matches(['\r', '\n'])))
            .collect();

        parts
            .iter()
            .find(|part| part.content_type().starts_with("text/plain"))
            .or_else(|| parts.first())
            .map(|part| part.text_body())
            .unwrap_or_else(|| self.decoded_body())
    }

    /// The body with its `Content-Transfer-Encoding` undone, in its declared charset.
    fn decoded_body(&self) -> String {
        let encoding = self
            .header("content-transfer-encoding")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let bytes = match encoding.as_str() {
            "base64" => {
                let compact: String = self.body.split_whitespace().collect();
                match BASE64.decode(compact.as_bytes()) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Keeping undecodable base64 body as is: {}", e);
                        self.body.clone().into_bytes()
                    }
                }
            }
            "quoted-printable" => decode_quoted_printable(&self.body),
            _ => return self.body.clone(),
        };

        let charset = parameter(self.header("content-type").unwrap_or_default(), "charset")
            .unwrap_or_default();
        decode_charset(&bytes, &charset)
    }
}

fn parameter(content_type: &str, name: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

fn decode_charset(bytes: &[u8], charset: &str) -> String {
    match charset.to_ascii_lowercase().as_str() {
        "iso-8859-1" | "latin1" | "latin-1" | "windows-1252" | "cp1252" => {
            bytes.iter().map(|&b| b as char).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// `=XX` escapes become bytes and `=` at a line end joins the lines.
fn decode_quoted_printable(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }

    out
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Decodes RFC 2047 `=?charset?B|Q?text?=` words; whitespace between two words is dropped.
fn decode_encoded_words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        match encoded_word(candidate) {
            Some((decoded, consumed)) => {
                if !(after_word && before.trim().is_empty()) {
                    out.push_str(before);
                }
                out.push_str(&decoded);
                rest = &candidate[consumed..];
                after_word = true;
            }
            None => {
                out.push_str(before);
                out.push_str("=?");
                rest = &candidate[2..];
                after_word = false;
            }
        }
    }

    out.push_str(rest);
    out
}

/// The decoded text of the encoded word at the start of `text`, and its length.
fn encoded_word(text: &str) -> Option<(String, usize)> {
    let inner = text.strip_prefix("=?")?;
    let (raw_charset, inner) = inner.split_once('?')?;
    let (encoding, inner) = inner.split_once('?')?;
    let end = inner.find("?=")?;
    let payload = &inner[..end];
    if payload.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => BASE64.decode(payload).ok()?,
        "Q" | "q" => decode_quoted_printable(&payload.replace('_', " ")),
        _ => return None,
    };

    // RFC 2231 language suffix: `utf-8*en`
    let charset = raw_charset.split('*').next().unwrap_or_default();
    let consumed = 2 + raw_charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((decode_charset(&bytes, charset), consumed))
}

fn parse_message(raw: &str) -> Message {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut lines = raw.split_inclusive('\n');
    let mut consumed = 0;

    for line in lines.by_ref() {
        consumed += line.len();
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }

        if trimmed.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(trimmed.trim());
                continue;
            }
        }

        match trimmed.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() && !name.contains(' ') => {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
            _ => {
                // Not a header line: the message has no header block.
                return Message {
                    headers: Vec::new(),
                    body: raw.to_string(),
                };
            }
        }
    }

    Message {
        headers,
        body: raw[consumed.min(raw.len())..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plain_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.eml");
        fs::write(
            &path,
            "From: Ana <ana@example.com>\r\nTo: team@example.com\r\nSubject: Budget\r\n  update\r\nDate: Mon, 1 Jan 2024 10:00:00 +0000\r\n\r\nThe budget was approved.\r\n",
        )
        .unwrap();

        let passages = load(&path, "note.eml").unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].content, "The budget was approved.");
        assert_eq!(passages[0].metadata["subject"], "Budget update");
        assert_eq!(passages[0].metadata["from"], "Ana <ana@example.com>");
        assert_eq!(passages[0].metadata["to"], "team@example.com");
    }

    #[test]
    fn test_multipart_prefers_plain_text() {
        let raw = "Subject: Hi\nContent-Type: multipart/alternative; boundary=\"XYZ\"\n\n\
            --XYZ\nContent-Type: text/html\n\n<p>html body</p>\n\
            --XYZ\nContent-Type: text/plain\n\nplain body\n\
            --XYZ--\n";

        let message = parse_message(raw);

        assert_eq!(message.text_body().trim(), "plain body");
    }

    #[test]
    fn test_base64_part_is_decoded() {
        let raw = "Subject: Minutes\nContent-Type: multipart/mixed; boundary=b1\n\n\
            --b1\nContent-Type: text/plain; charset=utf-8\nContent-Transfer-Encoding: base64\n\n\
            VGhlIGJ1ZGdldCB3YXMg\nYXBwcm92ZWQu\n\
            --b1--\n";

        let message = parse_message(raw);

        assert_eq!(message.text_body().trim(), "The budget was approved.");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        let raw = "Subject: Opening\nContent-Type: text/plain; charset=\"utf-8\"\n\
            Content-Transfer-Encoding: quoted-printable\n\n\
            Caf=C3=A9 opens at=\n nine.";

        let message = parse_message(raw);

        assert_eq!(message.text_body(), "Café opens at nine.");
    }

    #[test]
    fn test_latin1_quoted_printable() {
        let raw = "Content-Type: text/plain; charset=iso-8859-1\n\
            Content-Transfer-Encoding: quoted-printable\n\nna=EFve";

        assert_eq!(parse_message(raw).text_body(), "naïve");
    }

    #[test]
    fn test_encoded_word_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("encoded.eml");
        fs::write(
            &path,
            "From: =?ISO-8859-1?Q?Andr=E9?= <andre@example.com>\n\
             Subject: =?UTF-8?B?UXVhcnRlcmx5?= =?UTF-8?Q?_r=C3=A9sum=C3=A9?=\n\n\
             Numbers attached.\n",
        )
        .unwrap();

        let passages = load(&path, "encoded.eml").unwrap();

        assert_eq!(passages[0].metadata["subject"], "Quarterly résumé");
        assert_eq!(passages[0].metadata["from"], "André <andre@example.com>");
        assert_eq!(passages[0].content, "Numbers attached.");
    }

    #[test]
    fn test_malformed_encoded_word_is_kept() {
        assert_eq!(decode_encoded_words("=?utf-8?X?abc?= plain"), "=?utf-8?X?abc?= plain");
        assert_eq!(decode_encoded_words("no words here"), "no words here");
    }

    #[test]
    fn test_without_headers_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.eml");
        fs::write(&path, "just some words without headers").unwrap();

        assert!(load(&path, "broken.eml").is_err());
    }
}
