//! newsdesk - News story clustering and grounded question answering
//!
//! Groups articles that cover the same story by embedding similarity and
//! answers questions from the article corpus with retrieval-augmented
//! generation.
//!
//! # Architecture
//!
//! - **types**: article records and corpus I/O
//! - **embedding**: sentence encoders (candle transformer or feature hashing)
//! - **clustering**: similarity matrix, greedy seed clustering, summaries
//! - **rag**: retrieval index, prompt assembly, answer synthesis
//! - **generation**: completion providers (OpenAI, Ollama)

pub mod errors;
pub mod types;
pub mod embedding;
pub mod clustering;
pub mod generation;
pub mod rag;

// Re-export commonly used types
pub use errors::{NewsdeskError, Result};

// Interface layer
pub mod telemetry;
pub mod cli;
pub mod config;
