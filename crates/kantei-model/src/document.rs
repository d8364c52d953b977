//! Raw diagnostic text as handed over by the external fetch.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One fetched result page flattened to text.
///
/// Created once per fetch and consumed by a single parse. The engine never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    content: String,
}

impl RawDocument {
    /// Wrap already-decoded text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Decode raw bytes, rejecting anything that is not UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes)
            .map(Self::new)
            .map_err(|e| ModelError::malformed(format!("content is not UTF-8: {e}")))
    }

    /// Accept a value that may be missing (a null field in an upstream payload).
    pub fn from_optional(content: Option<String>) -> Result<Self> {
        content
            .map(Self::new)
            .ok_or_else(|| ModelError::malformed("content is missing"))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl From<&str> for RawDocument {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RawDocument {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_utf8() {
        let err = RawDocument::from_bytes(vec![0xe4, 0xba]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedInput { .. }));
    }

    #[test]
    fn rejects_missing_content() {
        let err = RawDocument::from_optional(None).unwrap_err();
        assert_eq!(err.to_string(), "malformed input: content is missing");
    }

    #[test]
    fn empty_text_is_valid() {
        let doc = RawDocument::from_bytes(Vec::new()).expect("empty is valid");
        assert_eq!(doc.content(), "");
    }
}
