//! News document record
//!
//! Field names follow the JSON written by the ingestion side (`text` holds the
//! article body). Fields this crate does not know about are carried through
//! untouched so the presentation layer still sees them.

use serde::{Deserialize, Deserializer, Serialize};

/// A single article in the corpus; its identifier is its position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub title: String,
    #[serde(default, rename = "text", alias = "body", deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    /// Assigned by the clustering pipeline, absent before it runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<usize>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Create a document with only a title and body
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            source: None,
            url: None,
            publish_date: None,
            category: None,
            authors: Vec::new(),
            cluster_id: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Builder-style source setter
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builder-style category setter
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True iff the trimmed body is non-empty
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Text embedded for retrieval: title and body joined by a space
    pub fn retrieval_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Per-document content flags, in corpus order
pub fn has_content_mask(documents: &[Document]) -> Vec<bool> {
    documents.iter().map(Document::has_content).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_content_ignores_whitespace() {
        assert!(Document::new("Title", "Body").has_content());
        assert!(!Document::new("Title", "   \n\t").has_content());
        assert!(!Document::new("Title", "").has_content());
    }

    #[test]
    fn test_retrieval_text_joins_title_and_body() {
        let doc = Document::new("Storm hits coast", "Heavy rain overnight.");
        assert_eq!(doc.retrieval_text(), "Storm hits coast Heavy rain overnight.");
    }

    #[test]
    fn test_deserialize_text_field_as_body() {
        let doc: Document = serde_json::from_value(json!({
            "title": "Budget released",
            "text": "The treasurer announced...",
            "source": "ABC",
            "authors": ["A. Writer"]
        }))
        .unwrap();
        assert_eq!(doc.body, "The treasurer announced...");
        assert_eq!(doc.source.as_deref(), Some("ABC"));
        assert_eq!(doc.authors, vec!["A. Writer".to_string()]);
        assert!(doc.cluster_id.is_none());
    }

    #[test]
    fn test_null_body_and_authors_default() {
        let doc: Document = serde_json::from_value(json!({
            "title": "Headline",
            "text": null,
            "authors": null
        }))
        .unwrap();
        assert!(doc.body.is_empty());
        assert!(doc.authors.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc: Document = serde_json::from_value(json!({
            "title": "Headline",
            "text": "Body",
            "image": "https://example.com/a.png"
        }))
        .unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["image"], "https://example.com/a.png");
        assert_eq!(value["text"], "Body");
        assert!(value.get("cluster_id").is_none());
    }

    #[test]
    fn test_mask_matches_documents() {
        let docs = vec![
            Document::new("a", "body"),
            Document::new("b", ""),
            Document::new("c", " x "),
        ];
        assert_eq!(has_content_mask(&docs), vec![true, false, true]);
    }
}
