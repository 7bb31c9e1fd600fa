//! Importers turning source files into document trees.
//!
//! Posts are seeded from generated markdown and moved between sites as
//! stored JSON. Each format is a [`DocumentImporter`]; the
//! [`ImporterRegistry`] dispatches on file extension.
//!
//! # Example
//!
//! ```
//! use folio::import::ImporterRegistry;
//!
//! fn main() -> folio::Result<()> {
//!     let registry = ImporterRegistry::with_defaults();
//!     let doc = registry.import_str("md", "## Setup\n\nInstall **everything**.")?;
//!     assert_eq!(doc.content().len(), 2);
//!     Ok(())
//! }
//! ```

mod json;
mod markdown;

pub use json::JsonImporter;
pub use markdown::{MarkdownImporter, MarkdownOptions};

use crate::error::{Error, Result};
use crate::model::DocumentNode;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Trait for source formats that can be imported as documents.
pub trait DocumentImporter: Send + Sync {
    /// Lowercase extensions without the leading dot (e.g. `["md"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Name of this importer.
    fn name(&self) -> &str;

    /// Import source text.
    fn import_str(&self, text: &str) -> Result<DocumentNode>;

    /// Import raw bytes. The default decodes UTF-8, replacing invalid
    /// sequences.
    fn import_bytes(&self, bytes: &[u8]) -> Result<DocumentNode> {
        self.import_str(&String::from_utf8_lossy(bytes))
    }

    /// Import a file.
    fn import_file(&self, path: &Path) -> Result<DocumentNode> {
        let bytes = fs::read(path)?;
        self.import_bytes(&bytes)
    }

    /// Check if this importer handles the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of importers keyed by extension and by name.
pub struct ImporterRegistry {
    importers: HashMap<String, Arc<dyn DocumentImporter>>,
    by_name: HashMap<String, Arc<dyn DocumentImporter>>,
}

impl ImporterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            importers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the markdown and JSON importers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownImporter::default()));
        registry.register(Arc::new(JsonImporter::new()));
        registry
    }

    /// Register an importer for all of its extensions. A later importer
    /// replaces an earlier one for shared extensions.
    pub fn register(&mut self, importer: Arc<dyn DocumentImporter>) {
        for ext in importer.supported_extensions() {
            self.importers.insert(ext.to_lowercase(), importer.clone());
        }
        self.by_name.insert(importer.name().to_lowercase(), importer);
    }

    /// Get the importer for an extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentImporter>> {
        self.importers.get(&ext.to_lowercase()).cloned()
    }

    /// Get an importer by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentImporter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.importers.contains_key(&ext.to_lowercase())
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.importers.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    /// Import text with the importer registered for `ext`.
    pub fn import_str(&self, ext: &str, text: &str) -> Result<DocumentNode> {
        self.importer_for(ext)?.import_str(text)
    }

    /// Import a file, choosing the importer by its extension.
    pub fn import_file(&self, path: &Path) -> Result<DocumentNode> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(Error::UnknownFormat)?;
        log::debug!("Importing {} as {}", path.display(), ext);
        self.importer_for(ext)?.import_file(path)
    }

    fn importer_for(&self, ext: &str) -> Result<Arc<dyn DocumentImporter>> {
        self.get_by_extension(ext).ok_or(Error::UnknownFormat)
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
