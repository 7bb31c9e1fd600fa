//! Rendering result with headings and statistics.

use serde::{Deserialize, Serialize};

/// One entry of a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Anchor id written on the heading element
    pub id: String,

    /// Flattened heading text with whitespace collapsed
    pub text: String,

    /// Heading level (1-3)
    pub level: u8,
}

/// Output of rendering one stored document.
///
/// Created fresh on every render call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Flat HTML markup
    pub markup: String,

    /// Headings in document order
    pub headings: Vec<HeadingEntry>,

    /// Estimated reading time, at least one minute
    pub estimated_read_minutes: u32,

    /// Counts collected during the render pass
    pub stats: ContentStats,
}

impl RenderedDocument {
    /// Check whether the document has a table of contents.
    pub fn has_headings(&self) -> bool {
        !self.headings.is_empty()
    }

    /// Get the content length in bytes.
    pub fn markup_len(&self) -> usize {
        self.markup.len()
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    /// Number of paragraphs rendered
    pub paragraph_count: u32,

    /// Number of headings rendered
    pub heading_count: u32,

    /// Number of list items rendered
    pub list_item_count: u32,

    /// Number of images rendered
    pub image_count: u32,

    /// Number of link elements emitted
    pub link_count: u32,

    /// Number of code blocks rendered
    pub code_block_count: u32,

    /// Whitespace-separated words in the rendered text
    pub word_count: u32,
}

impl ContentStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ContentStats) {
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.image_count += other.image_count;
        self.link_count += other.link_count;
        self.code_block_count += other.code_block_count;
        self.word_count += other.word_count;
    }
}
