//! JSON text encoding for stored documents.

use super::StoredDocument;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Encode a stored document as JSON text.
pub fn to_json(doc: &StoredDocument, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Json(format!("serialization error: {}", e)))
}

/// Parse JSON text into a stored document.
///
/// Only the JSON syntax is checked here; the tree itself is validated when
/// it is deserialized or rendered.
pub fn from_json(text: &str) -> Result<StoredDocument> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::serialize;
    use crate::model::DocumentNode;

    fn sample() -> StoredDocument {
        serialize(&DocumentNode::doc(vec![DocumentNode::paragraph(vec![
            DocumentNode::text("Hello"),
        ])]))
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"paragraph\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert_eq!(from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_from_json_syntax_error() {
        let err = from_json("{\"type\": ").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
