// Context block and prompt assembly for grounded answers
use serde::{Deserialize, Serialize};

use crate::rag::retrieval::RetrievedDocument;

/// Separator between retrieved documents in the context block
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Assembled context for prompt augmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Retrieved texts in ranking order, blank-line separated
    pub text: String,
    /// Number of documents included
    pub document_count: usize,
    /// Corpus indices included, in ranking order
    pub document_indices: Vec<usize>,
}

/// Join retrieved documents' `"{title} {body}"` in ranking order
pub fn build_context(documents: &[RetrievedDocument]) -> AssembledContext {
    let text = documents
        .iter()
        .map(|r| r.document.retrieval_text())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR);

    AssembledContext {
        text,
        document_count: documents.len(),
        document_indices: documents.iter().map(|r| r.index).collect(),
    }
}

/// Fill the news-assistant instruction template
pub fn render_prompt(query: &str, context: &AssembledContext) -> String {
    format!(
        "You're a news assistant. Based on the following news snippets, answer the question.\n\
         \n\
         News:\n\
         {}\n\
         \n\
         Question: {}\n\
         Answer:",
        context.text, query
    )
}
