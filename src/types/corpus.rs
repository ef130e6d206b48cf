//! JSON corpus files
//!
//! Records that lack a usable title are dropped and logged rather than
//! failing the whole load. Bytes that are not valid UTF-8 abort the load,
//! since nothing downstream can embed them.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::{NewsdeskError, Result};
use crate::types::document::Document;

/// Result of loading a corpus: accepted documents plus the rejects
#[derive(Debug)]
pub struct LoadedCorpus {
    pub documents: Vec<Document>,
    /// One `FormatError` per dropped record, in input order
    pub rejected: Vec<NewsdeskError>,
}

/// Parse a JSON array of articles
pub fn parse_corpus(json: &str) -> Result<LoadedCorpus> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut documents = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        match parse_record(index, record) {
            Ok(doc) => documents.push(doc),
            Err(err) => {
                warn!(index, error = %err, "dropping malformed document");
                rejected.push(err);
            }
        }
    }

    Ok(LoadedCorpus { documents, rejected })
}

fn parse_record(index: usize, record: serde_json::Value) -> Result<Document> {
    let format_error = |reason: &str| NewsdeskError::FormatError {
        index,
        reason: reason.to_string(),
    };

    let object = record
        .as_object()
        .ok_or_else(|| format_error("record is not a JSON object"))?;

    match object.get("title") {
        None | Some(serde_json::Value::Null) => return Err(format_error("missing title")),
        Some(serde_json::Value::String(title)) if title.trim().is_empty() => {
            return Err(format_error("empty title"))
        }
        Some(serde_json::Value::String(_)) => {}
        Some(_) => return Err(format_error("title is not a string")),
    }

    serde_json::from_value(record).map_err(|e| format_error(&e.to_string()))
}

/// Load a corpus from a JSON file
pub fn load_corpus(path: &Path) -> Result<LoadedCorpus> {
    let bytes = fs::read(path)?;
    let json = String::from_utf8(bytes).map_err(|e| {
        NewsdeskError::EncodingError(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;

    let corpus = parse_corpus(&json)?;
    info!(
        path = %path.display(),
        loaded = corpus.documents.len(),
        dropped = corpus.rejected.len(),
        "corpus loaded"
    );
    Ok(corpus)
}

/// Write documents as pretty-printed JSON, creating parent directories
pub fn save_corpus(path: &Path, documents: &[Document]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(documents)?;
    fs::write(path, json)?;
    Ok(())
}
