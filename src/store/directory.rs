//! File-backed store: `<root>/posts/<id>.json` and `<root>/images/<name>`.

use super::{upload_object_name, DocumentStore, ImageStore, PostId};
use crate::codec::{from_json, to_json, JsonFormat, StoredDocument};
use crate::detect::resolve_upload_format;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const POSTS_DIR: &str = "posts";
const IMAGES_DIR: &str = "images";

/// Store posts and images under a content directory.
///
/// Posts are written as pretty JSON so that content diffs stay readable.
/// Image URLs are `<public_prefix>/<object name>`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    public_prefix: String,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. Directories are created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: "/images".to_string(),
        }
    }

    /// Set the public URL prefix of uploaded images.
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    /// The content directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding post files.
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(POSTS_DIR)
    }

    /// Directory holding uploaded images.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Ids of all stored posts, sorted.
    pub fn post_ids(&self) -> Result<Vec<PostId>> {
        let entries = match fs::read_dir(self.posts_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let id = PostId::new(stem);
                if id.is_path_safe() {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn post_path(&self, id: &PostId) -> Option<PathBuf> {
        id.is_path_safe()
            .then(|| self.posts_dir().join(format!("{}.json", id.as_str())))
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), name)
    }
}

fn not_found(id: &PostId, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::NotFound(id.to_string())
    } else {
        Error::Io(err)
    }
}

impl DocumentStore for DirectoryStore {
    fn load_document(&self, id: &PostId) -> Result<StoredDocument> {
        let path = self
            .post_path(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        log::debug!("Loading post from {}", path.display());
        let text = fs::read_to_string(&path).map_err(|e| not_found(id, e))?;
        from_json(&text)
    }

    fn save_document(&self, id: &PostId, doc: &StoredDocument) -> Result<()> {
        let path = self
            .post_path(id)
            .ok_or_else(|| Error::Write(format!("invalid post id: {:?}", id.as_str())))?;
        let json = to_json(doc, JsonFormat::Pretty)?;

        fs::create_dir_all(self.posts_dir())
            .map_err(|e| Error::Write(format!("Failed to create posts directory: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &path)) {
            if fs::remove_file(&tmp).is_ok() {
                log::debug!("Removed {}", tmp.display());
            }
            return Err(Error::Write(format!("Failed to write {}: {}", path.display(), e)));
        }
        log::debug!("Saved post to {}", path.display());
        Ok(())
    }
}

impl ImageStore for DirectoryStore {
    fn upload_image(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::Upload("empty upload".to_string()));
        }
        let format = resolve_upload_format(bytes, suggested_name)
            .map_err(|_| Error::Upload(format!("unsupported image: {}", suggested_name)))?;

        let dir = self.images_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Upload(format!("Failed to create images directory: {}", e)))?;
        let name = upload_object_name(format);
        fs::write(dir.join(&name), bytes)
            .map_err(|e| Error::Upload(format!("Failed to write {}: {}", name, e)))?;
        log::debug!("Uploaded {} ({} bytes)", name, bytes.len());
        Ok(self.public_url(&name))
    }
}

#[cfg(feature = "async")]
impl DirectoryStore {
    /// Async variant of [`DocumentStore::load_document`].
    pub async fn load_document_async(&self, id: &PostId) -> Result<StoredDocument> {
        let path = self
            .post_path(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| not_found(id, e))?;
        from_json(&text)
    }

    /// Async variant of [`DocumentStore::save_document`].
    pub async fn save_document_async(&self, id: &PostId, doc: &StoredDocument) -> Result<()> {
        let path = self
            .post_path(id)
            .ok_or_else(|| Error::Write(format!("invalid post id: {:?}", id.as_str())))?;
        let json = to_json(doc, JsonFormat::Pretty)?;

        tokio::fs::create_dir_all(self.posts_dir())
            .await
            .map_err(|e| Error::Write(format!("Failed to create posts directory: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp, json).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if tokio::fs::remove_file(&tmp).await.is_ok() {
                log::debug!("Removed {}", tmp.display());
            }
            return Err(Error::Write(format!("Failed to write {}: {}", path.display(), e)));
        }
        Ok(())
    }

    /// Async variant of [`ImageStore::upload_image`].
    pub async fn upload_image_async(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::Upload("empty upload".to_string()));
        }
        let format = resolve_upload_format(bytes, suggested_name)
            .map_err(|_| Error::Upload(format!("unsupported image: {}", suggested_name)))?;

        let dir = self.images_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Upload(format!("Failed to create images directory: {}", e)))?;
        let name = upload_object_name(format);
        tokio::fs::write(dir.join(&name), bytes)
            .await
            .map_err(|e| Error::Upload(format!("Failed to write {}: {}", name, e)))?;
        Ok(self.public_url(&name))
    }
}
