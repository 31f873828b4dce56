use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata stored next to each chunk in the vector store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata {
    properties: Map<String, Value>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    // Common metadata helpers
    pub fn set_page(&mut self, page: u32) {
        self.set_property("page", Value::from(page));
    }

    pub fn page(&self) -> Option<u32> {
        self.get_property("page")
            .and_then(Value::as_u64)
            .map(|p| p as u32)
    }

    pub fn set_chunk(&mut self, chunk: usize, chunk_size: usize) {
        self.set_property("chunk", Value::from(chunk));
        self.set_property("chunk_size", Value::from(chunk_size));
    }

    pub fn set_source_url(&mut self, url: &str) {
        self.set_property("source_url", Value::String(url.to_string()));
    }

    pub fn source_url(&self) -> Option<&str> {
        self.get_property("source_url").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.properties.clone())
    }

    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(properties) => Self { properties },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        let mut metadata = DocumentMetadata::new();
        metadata.set_page(3);
        metadata.set_chunk(2, 480);
        metadata.set_source_url("https://example.com/a.pdf");

        assert_eq!(metadata.page(), Some(3));
        assert_eq!(metadata.get_property("chunk"), Some(&Value::from(2)));
        assert_eq!(metadata.source_url(), Some("https://example.com/a.pdf"));
        assert_eq!(metadata.get_property("chunk_size"), Some(&Value::from(480)));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        let metadata = DocumentMetadata::from_json(Value::String("oops".to_string()));
        assert_eq!(metadata, DocumentMetadata::default());
    }
}
