//! Recursive character text splitting.
//!
//! Text is split on the first separator that occurs in it, keeping the
//! separator at the start of the following piece. Small pieces are merged
//! greedily up to `chunk_size`, carrying up to `chunk_overlap` characters of
//! the previous chunk into the next one. Pieces that are still too long are
//! split again with the remaining separators. The empty separator splits into
//! single characters, so every chunk ends up within `chunk_size`.

use std::collections::VecDeque;

use crate::domain::{filter_metadata, ChunkDraft, DomainError, Passage};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::invalid_input("chunk size must be greater than 0"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::invalid_input(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    /// Splits every passage and numbers the chunks across all of them.
    ///
    /// Each chunk inherits the flattened metadata of its passage.
    pub fn split_passages(&self, passages: &[Passage]) -> Vec<ChunkDraft> {
        let mut drafts = Vec::new();
        let mut index: u32 = 0;

        for passage in passages {
            let metadata = filter_metadata(&passage.metadata);
            for text in self.split_text(&passage.content) {
                drafts.push(ChunkDraft::new(index, text, metadata.clone()));
                index += 1;
            }
        }

        drafts
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let pieces = split_keep_start(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_window(&window) {
                    chunks.push(chunk);
                }

                // Keep a tail of at most `chunk_overlap` chars that still
                // leaves room for the next piece.
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some(dropped) => total -= char_len(dropped),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_window(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn pick_separator<'a, 'b>(text: &str, separators: &'b [&'a str]) -> (&'a str, &'b [&'a str]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (*separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn split_keep_start<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
        }
        start = index;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetadataValue;

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(TextSplitter::new(0, 0).unwrap_err().is_invalid_input());
        assert!(TextSplitter::new(100, 100).unwrap_err().is_invalid_input());
        assert!(TextSplitter::new(100, 150).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_defaults() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.chunk_size(), 1000);
        assert_eq!(splitter.chunk_overlap(), 200);
    }

    #[test]
    fn test_splits_characters_without_separators() {
        let splitter = TextSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_character_overlap() {
        let splitter = TextSplitter::new(4, 2).unwrap();
        assert_eq!(
            splitter.split_text("abcdefghij"),
            vec!["abcd", "cdef", "efgh", "ghij"]
        );
    }

    #[test]
    fn test_splits_on_words() {
        let splitter = TextSplitter::new(10, 0).unwrap();
        assert_eq!(
            splitter.split_text("one two three four"),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn test_prefers_paragraphs() {
        let splitter = TextSplitter::new(12, 0).unwrap();
        assert_eq!(
            splitter.split_text("para one.\n\npara two."),
            vec!["para one.", "para two."]
        );
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split_text("  hello world  "), vec!["hello world"]);
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n ").is_empty());
    }

    #[test]
    fn test_chunk_length_bound_on_long_text() {
        let text = "Revenue grew in the third quarter.\nCosts were flat. ".repeat(200);
        let splitter = TextSplitter::new(120, 30).unwrap();
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 120, "chunk too long: {}", chunk);
            assert!(!chunk.is_empty());
        }
    }

    /// Length of the longest suffix of `prev` that starts `next`.
    fn shared_overlap(prev: &str, next: &str) -> usize {
        (0..=prev.len().min(next.len()))
            .rev()
            .find(|&k| prev.ends_with(&next[..k]))
            .unwrap_or(0)
    }

    #[test]
    fn test_length_and_overlap_bounds() {
        let words: Vec<String> = (0..400).map(|i| format!("w{:04}", i)).collect();
        let text = words
            .chunks(7)
            .map(|line| line.join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        for (size, overlap) in [(30, 0), (40, 10), (64, 20), (100, 35), (250, 80)] {
            let splitter = TextSplitter::new(size, overlap).unwrap();
            let chunks = splitter.split_text(&text);

            assert!(chunks.len() > 1, "size {} produced one chunk", size);
            for chunk in &chunks {
                assert!(chunk.chars().count() <= size, "chunk over {}: {}", size, chunk);
            }
            for pair in chunks.windows(2) {
                let shared = shared_overlap(&pair[0], &pair[1]);
                assert!(
                    shared <= overlap,
                    "({}, {}) shared {} chars between {:?} and {:?}",
                    size,
                    overlap,
                    shared,
                    pair[0],
                    pair[1]
                );
            }
            for word in &words {
                assert!(chunks.iter().any(|c| c.contains(word.as_str())), "{} lost", word);
            }
        }
    }

    #[test]
    fn test_length_is_measured_in_chars() {
        let splitter = TextSplitter::new(3, 0).unwrap();
        let chunks = splitter.split_text("ñáéíóú");
        assert_eq!(chunks, vec!["ñáé", "íóú"]);
    }

    #[test]
    fn test_split_passages_numbers_across_passages() {
        let splitter = TextSplitter::new(10, 0).unwrap();
        let passages = vec![
            Passage::new("one two three")
                .with_metadata("source", "a.pdf")
                .with_metadata("page", 0),
            Passage::new("four five")
                .with_metadata("source", "a.pdf")
                .with_metadata("page", 1),
        ];

        let drafts = splitter.split_passages(&passages);
        let indexes: Vec<u32> = drafts.iter().map(|d| d.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(drafts[0].text, "one two");
        assert_eq!(drafts[2].text, "four five");
        assert_eq!(drafts[2].metadata["page"], MetadataValue::Integer(1));
    }
}
