//! # folio
//!
//! Structured rich-text content pipeline for a portfolio blog.
//!
//! Posts are edited as a tree of block and inline nodes, stored as a JSON
//! tree, and rendered to flat HTML with stable heading anchors, a table of
//! contents and a reading-time estimate.
//!
//! ## Quick Start
//!
//! ```
//! use folio::{render, serialize, DocumentNode, HeadingLevel, RenderOptions};
//!
//! let tree = DocumentNode::doc(vec![
//!     DocumentNode::heading(HeadingLevel::H2, vec![DocumentNode::text("Getting Started")]),
//!     DocumentNode::paragraph(vec![DocumentNode::text("Hello, blog.")]),
//! ]);
//!
//! let rendered = render(&serialize(&tree), &RenderOptions::default());
//! assert_eq!(
//!     rendered.markup,
//!     "<h2 id=\"getting-started\">Getting Started</h2><p>Hello, blog.</p>"
//! );
//! assert_eq!(rendered.headings[0].id, "getting-started");
//! assert_eq!(rendered.estimated_read_minutes, 1);
//! ```
//!
//! ## Features
//!
//! - **Closed document model**: exhaustively matchable node and mark enums
//! - **Lossless storage codec**: the JSON tree used by the admin editor
//! - **Graceful rendering**: corrupt posts degrade to fallback markup
//! - **Editing session**: marks, block kinds, links and images over ranges
//! - **Importers**: markdown and stored JSON
//! - **Parallel batch rendering**: uses Rayon for many posts

pub mod codec;
pub mod detect;
pub mod editor;
pub mod error;
pub mod import;
pub mod metadata;
pub mod model;
pub mod render;
pub mod slug;
pub mod store;

// Re-export commonly used types
pub use codec::{
    deserialize, deserialize_or_placeholder, from_json, serialize, to_json, JsonFormat,
    StoredDocument,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, ImageFormat};
pub use editor::{ActiveFormats, BlockKind, EditingSession, ListKind, Position, Range, SessionState};
pub use error::{Error, Result};
pub use import::{DocumentImporter, ImporterRegistry, MarkdownImporter, MarkdownOptions};
pub use metadata::{extract_metadata, extract_metadata_from_tree, DocumentMetadata, MetadataOptions};
pub use model::{DocumentNode, HeadingLevel, Mark, MarkKind, MarkSet, NodeKind};
pub use render::{
    render, render_batch, render_tree, ContentStats, HeadingEntry, HtmlRenderer, NodeVisitor,
    RenderOptions, RenderedDocument, VisitorAction,
};
pub use slug::{slugify, SlugPolicy};
pub use store::{DirectoryStore, DocumentStore, ImageStore, MemoryStore, PostId};

use std::path::Path;

/// Render a post straight from its JSON text.
///
/// Invalid JSON is an error; a well-formed but malformed tree renders as
/// the fallback markup.
///
/// # Example
///
/// ```
/// let rendered = folio::render_json(
///     r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"hi"}]}]}"#,
///     &folio::RenderOptions::default(),
/// )?;
/// assert_eq!(rendered.markup, "<p>hi</p>");
/// # Ok::<(), folio::Error>(())
/// ```
pub fn render_json(text: &str, options: &RenderOptions) -> Result<RenderedDocument> {
    let doc = from_json(text)?;
    Ok(render(&doc, options))
}

/// Render a stored-document file.
pub fn render_file<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<RenderedDocument> {
    let text = std::fs::read_to_string(path)?;
    render_json(&text, options)
}

/// Convert markdown into a stored document.
///
/// # Example
///
/// ```
/// let stored = folio::markdown_to_stored("## Intro\n\nText.");
/// let doc = folio::deserialize(&stored)?;
/// assert_eq!(doc.content().len(), 2);
/// # Ok::<(), folio::Error>(())
/// ```
pub fn markdown_to_stored(markdown: &str) -> StoredDocument {
    serialize(&MarkdownImporter::default().parse(markdown))
}

/// Builder bundling render, metadata and import options.
///
/// # Example
///
/// ```
/// use folio::{Folio, SlugPolicy};
///
/// let folio = Folio::new()
///     .with_words_per_minute(250)
///     .with_slug_policy(SlugPolicy::Preserve)
///     .sequential();
///
/// let rendered = folio.render_markdown("## Intro\n\n## Intro");
/// assert_eq!(rendered.headings[0].id, rendered.headings[1].id);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Folio {
    render_options: RenderOptions,
    markdown_options: MarkdownOptions,
}

impl Folio {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading slug collision policy.
    pub fn with_slug_policy(mut self, policy: SlugPolicy) -> Self {
        self.render_options = self.render_options.with_slug_policy(policy);
        self
    }

    /// Set the reading speed used for reading-time estimates.
    pub fn with_words_per_minute(mut self, wpm: u32) -> Self {
        self.render_options = self.render_options.with_words_per_minute(wpm);
        self
    }

    /// Disable parallel batch rendering.
    pub fn sequential(mut self) -> Self {
        self.render_options = self.render_options.sequential();
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Replace the markdown import options.
    pub fn with_markdown_options(mut self, options: MarkdownOptions) -> Self {
        self.markdown_options = options;
        self
    }

    /// The render options in use.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Render a stored post.
    pub fn render(&self, doc: &StoredDocument) -> RenderedDocument {
        render(doc, &self.render_options)
    }

    /// Render many stored posts.
    pub fn render_batch(&self, docs: &[StoredDocument]) -> Vec<RenderedDocument> {
        render_batch(docs, &self.render_options)
    }

    /// Import markdown and render it.
    pub fn render_markdown(&self, markdown: &str) -> RenderedDocument {
        render_tree(&self.import_markdown(markdown), &self.render_options)
    }

    /// Import markdown with the configured options.
    pub fn import_markdown(&self, markdown: &str) -> DocumentNode {
        MarkdownImporter::new(self.markdown_options.clone()).parse(markdown)
    }

    /// Headings and reading time of rendered markup.
    pub fn metadata(&self, markup: &str) -> DocumentMetadata {
        extract_metadata(markup, &self.render_options.metadata_options())
    }

    /// Load a post from a store and render it.
    pub fn render_post(&self, store: &dyn DocumentStore, id: &PostId) -> Result<RenderedDocument> {
        store::load_rendered(store, id, &self.render_options)
    }

    /// Open an editing session on a stored post.
    pub fn edit(&self, store: &dyn DocumentStore, id: &PostId) -> Result<EditingSession> {
        let doc = store.load_document(id)?;
        Ok(EditingSession::from_stored(&doc))
    }
}
