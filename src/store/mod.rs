//! Collaborator contracts for persisting posts and uploading images.
//!
//! The pipeline itself never touches storage. These traits describe what
//! the surrounding site provides, and the two implementations cover tests
//! and previews ([`MemoryStore`]) and a file-backed content tree
//! ([`DirectoryStore`]).
//!
//! # Example
//!
//! ```
//! use folio::store::{load_rendered, save_session, MemoryStore, PostId};
//! use folio::{EditingSession, RenderOptions};
//!
//! fn main() -> folio::Result<()> {
//!     let store = MemoryStore::new();
//!     let id = PostId::new("hello-world");
//!
//!     let session = EditingSession::new();
//!     save_session(&store, &id, &session)?;
//!
//!     let rendered = load_rendered(&store, &id, &RenderOptions::default())?;
//!     assert_eq!(rendered.markup, "<p></p>");
//!     Ok(())
//! }
//! ```

mod directory;
mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::codec::StoredDocument;
use crate::detect::ImageFormat;
use crate::editor::EditingSession;
use crate::error::Result;
use crate::render::{render, RenderOptions, RenderedDocument};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identifier of a blog post in a document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(String);

impl PostId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the id can name a file: non-empty ASCII letters,
    /// digits, `-` and `_` only.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Persistence of stored documents, one per post.
pub trait DocumentStore: Send + Sync {
    /// Load a post. Fails with [`Error::NotFound`](crate::Error::NotFound)
    /// when the post does not exist.
    fn load_document(&self, id: &PostId) -> Result<StoredDocument>;

    /// Save a post, replacing any previous version. Fails with
    /// [`Error::Write`](crate::Error::Write).
    fn save_document(&self, id: &PostId, doc: &StoredDocument) -> Result<()>;
}

/// Upload of image bytes, returning a public URL.
pub trait ImageStore: Send + Sync {
    /// Store the bytes and return the URL they are served from. Fails with
    /// [`Error::Upload`](crate::Error::Upload).
    fn upload_image(&self, bytes: &[u8], suggested_name: &str) -> Result<String>;
}

/// Load a post and render it.
///
/// A missing post is an error; a post whose content is malformed renders
/// as the fallback markup.
pub fn load_rendered(
    store: &dyn DocumentStore,
    id: &PostId,
    options: &RenderOptions,
) -> Result<RenderedDocument> {
    let doc = store.load_document(id)?;
    Ok(render(&doc, options))
}

/// Serialize a session's tree and save it under `id`.
pub fn save_session(store: &dyn DocumentStore, id: &PostId, session: &EditingSession) -> Result<()> {
    log::debug!("Saving post {}", id);
    store.save_document(id, &session.to_stored())
}

/// Object name for an upload: millisecond timestamp, random suffix and the
/// format's extension, e.g. `1718000000000-3f2a9c1e.png`.
pub fn upload_object_name(format: ImageFormat) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", millis, &suffix[..8], format.extension())
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("Recovered from poisoned store lock");
        poisoned.into_inner()
    })
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        log::warn!("Recovered from poisoned store lock");
        poisoned.into_inner()
    })
}
