//! Stored-document JSON importer.

use super::DocumentImporter;
use crate::codec::{deserialize, from_json};
use crate::error::Result;
use crate::model::DocumentNode;

/// Import stored-document JSON files. Unlike rendering, importing is
/// strict: malformed trees are returned as errors.
#[derive(Debug, Clone, Default)]
pub struct JsonImporter;

impl JsonImporter {
    /// Create a JSON importer.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentImporter for JsonImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "json"
    }

    fn import_str(&self, text: &str) -> Result<DocumentNode> {
        deserialize(&from_json(text)?)
    }
}
