//! Filter predicates for search and query
//!
//! Predicates use the remote engine's native filter grammar and are passed
//! through verbatim. The client never evaluates them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Opaque filter predicate
///
/// An empty filter (`{}`) means "no constraint".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(JsonValue);

impl Default for Filter {
    fn default() -> Self {
        Filter::none()
    }
}

impl Filter {
    /// The no-constraint predicate
    pub fn none() -> Self {
        Filter(JsonValue::Object(Default::default()))
    }

    /// Wrap a caller-built predicate without inspecting it
    pub fn raw(value: JsonValue) -> Self {
        Filter(value)
    }

    /// Check if this filter places no constraint
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Null => true,
            JsonValue::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Borrow the underlying predicate
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    /// Consume into the underlying predicate
    pub fn into_json(self) -> JsonValue {
        self.0
    }
}

/// Builds the predicates the indexing layer needs
pub struct FilterBuilder;

impl FilterBuilder {
    /// Set-membership on `fileExtension`; empty input means no constraint
    pub fn by_extensions<S: AsRef<str>>(extensions: &[S]) -> Filter {
        if extensions.is_empty() {
            return Filter::none();
        }
        let any: Vec<&str> = extensions.iter().map(AsRef::as_ref).collect();
        Filter(json!({
            "must": [{ "key": "fileExtension", "match": { "any": any } }]
        }))
    }

    /// Equality on `relativePath`; empty input means no constraint
    pub fn by_exact_path(path: &str) -> Filter {
        if path.is_empty() {
            return Filter::none();
        }
        Filter(json!({
            "must": [{ "key": "relativePath", "match": { "value": path } }]
        }))
    }
}
