//! Type definitions module
//!
//! Documents flowing through the clustering and question-answering paths,
//! and the JSON corpus files they are read from and written to.

pub mod document;
pub mod corpus;

// Re-export commonly used types
pub use document::{has_content_mask, Document};
pub use corpus::{load_corpus, parse_corpus, save_corpus, LoadedCorpus};
