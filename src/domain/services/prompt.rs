use crate::domain::RetrievedChunk;

pub const SYSTEM_INSTRUCTIONS: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

const CONTEXT_SEPARATOR: &str = "----------------";

/// A prompt ready to be sent to a chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds a prompt that stuffs every retrieved chunk into the system message.
///
/// When `label_sources` is set each chunk is prefixed with its document name.
pub fn build_stuff_prompt(question: &str, chunks: &[RetrievedChunk], label_sources: bool) -> Prompt {
    let context = chunks
        .iter()
        .map(|retrieved| {
            if label_sources {
                format!("[{}]\n{}", retrieved.document_name(), retrieved.chunk().chunk_text())
            } else {
                retrieved.chunk().chunk_text().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Prompt {
        system: format!("{}\n{}\n{}", SYSTEM_INSTRUCTIONS, CONTEXT_SEPARATOR, context),
        user: question.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChunkMetadata, DocumentChunk};

    fn retrieved(text: &str, name: &str) -> RetrievedChunk {
        let chunk = DocumentChunk::reconstitute(
            1,
            1,
            text.to_string(),
            0,
            ChunkMetadata::new(),
            None,
        );
        RetrievedChunk::new(chunk, name.to_string(), 0.8)
    }

    #[test]
    fn test_document_prompt() {
        let chunks = vec![retrieved("Sales rose 10%.", "q3.pdf"), retrieved("Costs fell.", "q3.pdf")];
        let prompt = build_stuff_prompt(" How did sales do? ", &chunks, false);

        assert!(prompt.system.starts_with(SYSTEM_INSTRUCTIONS));
        assert!(prompt.system.ends_with("Sales rose 10%.\n\nCosts fell."));
        assert!(!prompt.system.contains("[q3.pdf]"));
        assert_eq!(prompt.user, "How did sales do?");
    }

    #[test]
    fn test_global_prompt_labels_sources() {
        let chunks = vec![retrieved("Alpha.", "a.txt"), retrieved("Beta.", "b.txt")];
        let prompt = build_stuff_prompt("q", &chunks, true);

        assert!(prompt.system.contains("[a.txt]\nAlpha.\n\n[b.txt]\nBeta."));
    }
}
