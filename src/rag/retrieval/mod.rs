// Retrieval index over per-document embeddings
pub mod index;

pub use index::{RetrievalConfig, RetrievalIndex, RetrievedContext, RetrievedDocument, DEFAULT_TOP_K};
