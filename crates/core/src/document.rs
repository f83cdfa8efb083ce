//! Documents and search results
//!
//! A [`Document`] is one unit of indexed content (usually a code chunk).
//! On the wire it travels as a point payload: the five well-known fields
//! plus every metadata key spread at the top level.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Open string-keyed metadata map
pub type Metadata = Map<String, JsonValue>;

/// Payload keys that map onto [`Document`] fields.
pub const PAYLOAD_FIELDS: [&str; 5] = [
    "content",
    "relativePath",
    "startLine",
    "endLine",
    "fileExtension",
];

/// A unit of indexed content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Point id (see [`crate::IdentifierMapper`])
    pub id: String,
    /// Dense embedding; omitted from search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    /// Raw text content
    pub content: String,
    /// Path of the source file relative to the indexed root
    pub relative_path: String,
    /// First line covered by the content
    pub start_line: i64,
    /// Last line covered by the content
    pub end_line: i64,
    /// Extension of the source file, including the leading dot
    pub file_extension: String,
    /// Everything else carried in the payload
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document without a vector or metadata
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        relative_path: impl Into<String>,
        start_line: i64,
        end_line: i64,
        file_extension: impl Into<String>,
    ) -> Self {
        Document {
            id: id.into(),
            vector: None,
            content: content.into(),
            relative_path: relative_path.into(),
            start_line,
            end_line,
            file_extension: file_extension.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder: attach a dense vector
    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }

    /// Builder: add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the point payload.
    ///
    /// Metadata keys are written after the well-known fields, so a metadata
    /// key with the same name replaces the field value.
    pub fn to_payload(&self) -> Metadata {
        let [content, relative_path, start_line, end_line, file_extension] = PAYLOAD_FIELDS;
        let mut payload = Metadata::new();
        payload.insert(content.into(), self.content.clone().into());
        payload.insert(relative_path.into(), self.relative_path.clone().into());
        payload.insert(start_line.into(), self.start_line.into());
        payload.insert(end_line.into(), self.end_line.into());
        payload.insert(file_extension.into(), self.file_extension.clone().into());
        for (key, value) in &self.metadata {
            payload.insert(key.clone(), value.clone());
        }
        payload
    }

    /// Rebuild a document from a point id and payload.
    ///
    /// Missing well-known fields fall back to empty values; every other key
    /// lands in `metadata`. The vector is never restored from a payload.
    pub fn from_payload(id: impl Into<String>, mut payload: Metadata) -> Self {
        let [content, relative_path, start_line, end_line, file_extension] = PAYLOAD_FIELDS;
        let content = take_string(&mut payload, content);
        let relative_path = take_string(&mut payload, relative_path);
        let start_line = take_int(&mut payload, start_line);
        let end_line = take_int(&mut payload, end_line);
        let file_extension = take_string(&mut payload, file_extension);

        Document {
            id: id.into(),
            vector: None,
            content,
            relative_path,
            start_line,
            end_line,
            file_extension,
            metadata: payload,
        }
    }
}

fn take_string(payload: &mut Metadata, key: &str) -> String {
    match payload.remove(key) {
        Some(JsonValue::String(s)) => s,
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn take_int(payload: &mut Metadata, key: &str) -> i64 {
    match payload.remove(key) {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(JsonValue::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}

/// A scored document returned from a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched document (vector omitted)
    pub document: Document,
    /// Score reported by the engine (similarity or fused rank score)
    pub score: f32,
}
