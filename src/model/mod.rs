//! Document model types for structured rich-text content.
//!
//! This module defines the tree edited in the admin editor and rendered on
//! the blog. The set of node kinds and marks is closed, so every consumer
//! can match on it exhaustively.

mod mark;
mod node;
pub mod schema;

pub use mark::{Mark, MarkKind, MarkSet};
pub use node::{Descendants, DocumentNode, HeadingLevel, NodeKind};
