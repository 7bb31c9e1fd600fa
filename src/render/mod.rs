//! Rendering module for converting stored documents to markup and text.

pub(crate) mod escape;
mod html;
mod options;
mod result;
mod text;
pub mod visitor;

pub use escape::{decode_entities, escape_text};
pub use html::{render, render_batch, render_tree, HtmlRenderer};
pub use options::{RenderOptions, FALLBACK_MARKUP};
pub use result::{ContentStats, HeadingEntry, RenderedDocument};
pub use text::{excerpt, to_text};
pub use visitor::{
    CompositeVisitor, DefaultVisitor, NodeVisitor, PlainLinksVisitor, RewritePrefixVisitor,
    SkipImagesVisitor, VisitorAction,
};
