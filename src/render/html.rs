//! HTML rendering for stored documents.

use std::fmt::Write as _;

use rayon::prelude::*;

use crate::codec::{self, StoredDocument};
use crate::metadata::{collapse_whitespace, count_words, markup_to_text, reading_minutes};
use crate::model::{schema, DocumentNode, HeadingLevel, Mark};
use crate::slug::Slugger;

use super::escape::push_escaped;
use super::visitor::{NodeVisitor, VisitorAction};
use super::{ContentStats, HeadingEntry, RenderOptions, RenderedDocument};

/// Render a stored document to HTML.
///
/// Never fails: a document that cannot be decoded renders as
/// [`RenderOptions::fallback_markup`].
pub fn render(doc: &StoredDocument, options: &RenderOptions) -> RenderedDocument {
    HtmlRenderer::new(options.clone()).render(doc)
}

/// Render a live document tree to HTML.
pub fn render_tree(root: &DocumentNode, options: &RenderOptions) -> RenderedDocument {
    HtmlRenderer::new(options.clone()).render_tree(root)
}

/// Render many stored documents, in parallel unless disabled in the options.
///
/// Results are returned in input order; a corrupt document only affects its
/// own entry.
pub fn render_batch(docs: &[StoredDocument], options: &RenderOptions) -> Vec<RenderedDocument> {
    if options.parallel {
        docs.par_iter().map(|doc| render(doc, options)).collect()
    } else {
        docs.iter().map(|doc| render(doc, options)).collect()
    }
}

/// A mark whose element is currently open, with the tag that closes it.
/// Suppressed links have an empty close tag.
struct OpenMark<'a> {
    mark: &'a Mark,
    close: &'static str,
}

/// HTML renderer.
pub struct HtmlRenderer {
    options: RenderOptions,
    slugger: Slugger,
    headings: Vec<HeadingEntry>,
    stats: ContentStats,
    visitor: Option<Box<dyn NodeVisitor>>,
}

impl HtmlRenderer {
    /// Create a new HTML renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            slugger: Slugger::new(options.slug_policy),
            options,
            headings: Vec::new(),
            stats: ContentStats::new(),
            visitor: None,
        }
    }

    /// Attach a visitor consulted for headings, images, code blocks and links.
    pub fn with_visitor<V: NodeVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitor = Some(Box::new(visitor));
        self
    }

    /// Render a stored document.
    pub fn render(self, doc: &StoredDocument) -> RenderedDocument {
        match codec::deserialize(doc) {
            Ok(root) => self.render_valid(&root),
            Err(e) => {
                log::warn!("Rendering fallback content: {}", e);
                self.fallback()
            }
        }
    }

    /// Render a live document tree. Trees violating the schema render as
    /// the fallback markup, like undecodable stored documents.
    pub fn render_tree(self, root: &DocumentNode) -> RenderedDocument {
        match schema::validate(root) {
            Ok(()) => self.render_valid(root),
            Err(e) => {
                log::warn!("Rendering fallback content: {}", e);
                self.fallback()
            }
        }
    }

    fn render_valid(mut self, root: &DocumentNode) -> RenderedDocument {
        let mut markup = String::new();
        self.render_blocks(&mut markup, root.content());
        self.finish(markup)
    }

    fn fallback(self) -> RenderedDocument {
        let markup = self.options.fallback_markup.clone();
        self.finish(markup)
    }

    fn finish(mut self, markup: String) -> RenderedDocument {
        let words = count_words(&markup_to_text(&markup));
        self.stats.word_count = words;
        RenderedDocument {
            estimated_read_minutes: reading_minutes(words, self.options.words_per_minute),
            markup,
            headings: self.headings,
            stats: self.stats,
        }
    }

    fn render_blocks(&mut self, out: &mut String, blocks: &[DocumentNode]) {
        for block in blocks {
            self.render_block(out, block);
        }
    }

    fn render_block(&mut self, out: &mut String, node: &DocumentNode) {
        match node {
            DocumentNode::Document { content } => self.render_blocks(out, content),
            DocumentNode::Paragraph { content } => {
                self.stats.paragraph_count += 1;
                out.push_str("<p>");
                self.render_inline(out, content);
                out.push_str("</p>");
            }
            DocumentNode::Heading { level, content } => self.render_heading(out, *level, node, content),
            DocumentNode::BulletList { content } => {
                out.push_str("<ul>");
                self.render_blocks(out, content);
                out.push_str("</ul>");
            }
            DocumentNode::OrderedList { start, content } => {
                if *start == 1 {
                    out.push_str("<ol>");
                } else {
                    let _ = write!(out, "<ol start=\"{}\">", start);
                }
                self.render_blocks(out, content);
                out.push_str("</ol>");
            }
            DocumentNode::ListItem { content } => {
                self.stats.list_item_count += 1;
                out.push_str("<li>");
                self.render_blocks(out, content);
                out.push_str("</li>");
            }
            DocumentNode::Blockquote { content } => {
                out.push_str("<blockquote>");
                self.render_blocks(out, content);
                out.push_str("</blockquote>");
            }
            DocumentNode::CodeBlock { language, .. } => {
                self.render_code_block(out, language.as_deref(), &node.text_content())
            }
            DocumentNode::Image { src, alt, title } => {
                self.render_image(out, src, alt.as_deref(), title.as_deref())
            }
            DocumentNode::Text { .. } | DocumentNode::HardBreak => {
                self.render_inline(out, std::slice::from_ref(node))
            }
        }
    }

    fn render_heading(
        &mut self,
        out: &mut String,
        level: HeadingLevel,
        node: &DocumentNode,
        content: &[DocumentNode],
    ) {
        let text = collapse_whitespace(&node.text_content());
        let level = level.get();

        match self.visit(|v| v.visit_heading(&text, level)) {
            VisitorAction::Continue => {}
            VisitorAction::Replace(markup) => {
                out.push_str(&markup);
                return;
            }
            VisitorAction::Skip => return,
        }

        let id = self.slugger.anchor_for(&text);
        self.stats.heading_count += 1;

        let _ = write!(out, "<h{} id=\"{}\">", level, id);
        self.render_inline(out, content);
        let _ = write!(out, "</h{}>", level);

        self.headings.push(HeadingEntry { id, text, level });
    }

    fn render_code_block(&mut self, out: &mut String, language: Option<&str>, code: &str) {
        match self.visit(|v| v.visit_code_block(language, code)) {
            VisitorAction::Continue => {}
            VisitorAction::Replace(markup) => {
                out.push_str(&markup);
                return;
            }
            VisitorAction::Skip => return,
        }

        self.stats.code_block_count += 1;
        out.push_str("<pre><code");
        if let Some(language) = language {
            out.push_str(" class=\"language-");
            push_escaped(out, language);
            out.push('"');
        }
        out.push('>');
        push_escaped(out, code);
        out.push_str("</code></pre>");
    }

    fn render_image(&mut self, out: &mut String, src: &str, alt: Option<&str>, title: Option<&str>) {
        match self.visit(|v| v.visit_image(src, alt, title)) {
            VisitorAction::Continue => {}
            VisitorAction::Replace(markup) => {
                self.stats.image_count += 1;
                out.push_str(&markup);
                return;
            }
            VisitorAction::Skip => return,
        }

        self.stats.image_count += 1;
        out.push_str("<img src=\"");
        push_escaped(out, src);
        out.push('"');
        if let Some(alt) = alt {
            out.push_str(" alt=\"");
            push_escaped(out, alt);
            out.push('"');
        }
        if let Some(title) = title {
            out.push_str(" title=\"");
            push_escaped(out, title);
            out.push('"');
        }
        out.push('>');
    }

    /// Render inline content. Marks are opened in insertion order, so the
    /// first-applied mark is the outermost element; consecutive runs keep
    /// the elements of their common leading marks open.
    fn render_inline(&mut self, out: &mut String, content: &[DocumentNode]) {
        let mut open: Vec<OpenMark<'_>> = Vec::new();

        for node in content {
            match node {
                DocumentNode::Text { text, marks } => {
                    let shared = open
                        .iter()
                        .zip(marks.iter())
                        .take_while(|(open, mark)| open.mark == *mark)
                        .count();
                    close_marks(out, &mut open, shared);

                    for mark in marks.iter().skip(shared) {
                        let close = self.open_mark(out, mark);
                        open.push(OpenMark { mark, close });
                    }
                    push_escaped(out, text);
                }
                DocumentNode::HardBreak => {
                    close_marks(out, &mut open, 0);
                    out.push_str("<br>");
                }
                other => log::debug!("Ignoring {} in inline content", other.kind().as_str()),
            }
        }

        close_marks(out, &mut open, 0);
    }

    fn open_mark(&mut self, out: &mut String, mark: &Mark) -> &'static str {
        match mark {
            Mark::Bold => {
                out.push_str("<strong>");
                "</strong>"
            }
            Mark::Italic => {
                out.push_str("<em>");
                "</em>"
            }
            Mark::Code => {
                out.push_str("<code>");
                "</code>"
            }
            Mark::Link { href, target } => self.open_link(out, href, target.as_deref()),
        }
    }

    fn open_link(&mut self, out: &mut String, href: &str, target: Option<&str>) -> &'static str {
        let href = match self.visit(|v| v.visit_link(href)) {
            VisitorAction::Continue => href.to_string(),
            VisitorAction::Replace(replacement) => replacement,
            VisitorAction::Skip => return "",
        };

        if !self.options.is_allowed_href(&href) {
            log::warn!("Rendering link with disallowed scheme as text: {}", href);
            return "";
        }

        self.stats.link_count += 1;
        out.push_str("<a");
        if let Some(target) = target.or(self.options.link_target.as_deref()) {
            out.push_str(" target=\"");
            push_escaped(out, target);
            out.push('"');
        }
        if let Some(rel) = &self.options.link_rel {
            out.push_str(" rel=\"");
            push_escaped(out, rel);
            out.push('"');
        }
        out.push_str(" href=\"");
        push_escaped(out, &href);
        out.push_str("\">");
        "</a>"
    }

    fn visit(&mut self, f: impl FnOnce(&mut dyn NodeVisitor) -> VisitorAction) -> VisitorAction {
        match self.visitor.as_mut() {
            Some(visitor) => f(visitor.as_mut()),
            None => VisitorAction::Continue,
        }
    }
}

fn close_marks(out: &mut String, open: &mut Vec<OpenMark<'_>>, keep: usize) {
    while open.len() > keep {
        if let Some(mark) = open.pop() {
            out.push_str(mark.close);
        }
    }
}
