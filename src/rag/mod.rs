// RAG (Retrieval-Augmented Generation) over the clustered corpus
//
// Components:
// - Retrieval Index: one embedding per document, exact top-k cosine search
// - Context: ranked documents joined into the prompt's news block
// - Synthesizer: single completion call with the grounded prompt
// - Pipeline: query -> retrieve -> synthesize

pub mod retrieval;
pub mod context;
pub mod synthesizer;
pub mod pipeline;

// Re-export key types
pub use context::{build_context, render_prompt, AssembledContext};
pub use pipeline::{Answer, RagPipeline};
pub use retrieval::{RetrievalConfig, RetrievalIndex, RetrievedContext, RetrievedDocument};
pub use synthesizer::AnswerSynthesizer;
