//! Error types for the folio content pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding, rendering or storing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored content does not match the document schema.
    #[error("Malformed document at {path}: {reason}")]
    MalformedDocument {
        /// Location of the offending node, e.g. `content[2].content[0]`
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// An editing operation was requested on an incompatible node.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A stored document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document store rejected a write.
    #[error("Write error: {0}")]
    Write(String),

    /// The image store rejected an upload.
    #[error("Upload error: {0}")]
    Upload(String),

    /// The input bytes are not a recognized image or document format.
    #[error("Unknown file format")]
    UnknownFormat,

    /// JSON text could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::MalformedDocument`] from a node path and reason.
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check whether this error is a schema failure that callers should
    /// degrade instead of propagating.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedDocument { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
