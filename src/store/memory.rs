//! In-memory stores for tests and previews.

use super::{read_lock, upload_object_name, write_lock, DocumentStore, ImageStore, PostId};
use crate::codec::StoredDocument;
use crate::detect::resolve_upload_format;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Document and image store held in memory.
///
/// Uploaded images are kept by object name and served under
/// `url_prefix` (default `memory://images`).
pub struct MemoryStore {
    documents: RwLock<HashMap<PostId, StoredDocument>>,
    images: RwLock<HashMap<String, Vec<u8>>>,
    url_prefix: String,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            images: RwLock::new(HashMap::new()),
            url_prefix: "memory://images".to_string(),
        }
    }

    /// Set the prefix of returned image URLs.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// Number of stored posts.
    pub fn document_count(&self) -> usize {
        read_lock(&self.documents).len()
    }

    /// Ids of the stored posts, sorted.
    pub fn post_ids(&self) -> Vec<PostId> {
        let mut ids: Vec<PostId> = read_lock(&self.documents).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Bytes of an uploaded image by object name.
    pub fn image(&self, name: &str) -> Option<Vec<u8>> {
        read_lock(&self.images).get(name).cloned()
    }

    /// Number of uploaded images.
    pub fn image_count(&self) -> usize {
        read_lock(&self.images).len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn load_document(&self, id: &PostId) -> Result<StoredDocument> {
        read_lock(&self.documents)
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn save_document(&self, id: &PostId, doc: &StoredDocument) -> Result<()> {
        if id.as_str().is_empty() {
            return Err(Error::Write("empty post id".to_string()));
        }
        write_lock(&self.documents).insert(id.clone(), doc.clone());
        Ok(())
    }
}

impl ImageStore for MemoryStore {
    fn upload_image(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::Upload("empty upload".to_string()));
        }
        let format = resolve_upload_format(bytes, suggested_name)
            .map_err(|_| Error::Upload(format!("unsupported image: {}", suggested_name)))?;

        let name = upload_object_name(format);
        write_lock(&self.images).insert(name.clone(), bytes.to_vec());
        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), name))
    }
}
