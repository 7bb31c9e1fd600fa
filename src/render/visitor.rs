//! Visitor hooks for customizing HTML rendering.
//!
//! A visitor is consulted before the renderer emits headings, images, code
//! blocks and links, and may keep, replace or drop them without touching
//! the core rendering logic.
//!
//! # Example
//!
//! ```
//! use folio::render::visitor::{NodeVisitor, VisitorAction};
//!
//! struct NoCodeVisitor;
//!
//! impl NodeVisitor for NoCodeVisitor {
//!     fn visit_code_block(&mut self, _language: Option<&str>, _code: &str) -> VisitorAction {
//!         VisitorAction::Replace("<p>(code omitted)</p>".to_string())
//!     }
//! }
//! ```

/// Action returned by visitor methods to control rendering behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Continue with default rendering.
    #[default]
    Continue,

    /// Replace the element. For headings, images and code blocks this is
    /// the replacement markup; for links it is the replacement `href`.
    Replace(String),

    /// Skip the element. Links still render their text, unlinked.
    Skip,
}

impl VisitorAction {
    /// Check if this action indicates the element should be skipped.
    pub fn should_skip(&self) -> bool {
        matches!(self, VisitorAction::Skip)
    }

    /// Check if this action provides replacement content.
    pub fn is_replace(&self) -> bool {
        matches!(self, VisitorAction::Replace(_))
    }

    /// Get replacement content if available.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            VisitorAction::Replace(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for visiting document elements during rendering.
///
/// All methods return `VisitorAction::Continue` by default. A heading that
/// is replaced or skipped does not appear in the rendered heading list.
pub trait NodeVisitor: Send + Sync {
    /// Called before rendering a heading.
    ///
    /// # Arguments
    /// * `text` - Flattened heading text
    /// * `level` - Heading level (1-3)
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        let _ = (text, level);
        VisitorAction::Continue
    }

    /// Called before rendering an image.
    ///
    /// # Arguments
    /// * `src` - Image URL
    /// * `alt` - Optional alt text
    /// * `title` - Optional title
    fn visit_image(&mut self, src: &str, alt: Option<&str>, title: Option<&str>) -> VisitorAction {
        let _ = (src, alt, title);
        VisitorAction::Continue
    }

    /// Called before rendering a code block.
    ///
    /// # Arguments
    /// * `language` - Optional language hint
    /// * `code` - Raw code text
    fn visit_code_block(&mut self, language: Option<&str>, code: &str) -> VisitorAction {
        let _ = (language, code);
        VisitorAction::Continue
    }

    /// Called before opening a link element.
    ///
    /// # Arguments
    /// * `href` - Link target as stored
    fn visit_link(&mut self, href: &str) -> VisitorAction {
        let _ = href;
        VisitorAction::Continue
    }
}

/// Default visitor that performs no customization.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    /// Create a new default visitor.
    pub fn new() -> Self {
        Self
    }
}

impl NodeVisitor for DefaultVisitor {}

/// Visitor that skips all images.
#[derive(Debug, Clone, Default)]
pub struct SkipImagesVisitor;

impl NodeVisitor for SkipImagesVisitor {
    fn visit_image(&mut self, _src: &str, _alt: Option<&str>, _title: Option<&str>) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that renders every link as plain text (feeds, excerpts).
#[derive(Debug, Clone, Default)]
pub struct PlainLinksVisitor;

impl NodeVisitor for PlainLinksVisitor {
    fn visit_link(&mut self, _href: &str) -> VisitorAction {
        VisitorAction::Skip
    }
}

/// Visitor that moves links and images from one URL prefix to another,
/// e.g. from a storage bucket host to a CDN host.
#[derive(Debug, Clone)]
pub struct RewritePrefixVisitor {
    from: String,
    to: String,
}

impl RewritePrefixVisitor {
    /// Create a visitor rewriting URLs starting with `from` to start with `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    fn rewrite(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{}", self.to, rest))
    }
}

impl NodeVisitor for RewritePrefixVisitor {
    fn visit_image(&mut self, src: &str, alt: Option<&str>, title: Option<&str>) -> VisitorAction {
        match self.rewrite(src) {
            Some(url) => {
                let mut markup = String::from("<img src=\"");
                super::escape::push_escaped(&mut markup, &url);
                markup.push('"');
                for (name, value) in [("alt", alt), ("title", title)] {
                    if let Some(value) = value {
                        markup.push(' ');
                        markup.push_str(name);
                        markup.push_str("=\"");
                        super::escape::push_escaped(&mut markup, value);
                        markup.push('"');
                    }
                }
                markup.push('>');
                VisitorAction::Replace(markup)
            }
            None => VisitorAction::Continue,
        }
    }

    fn visit_link(&mut self, href: &str) -> VisitorAction {
        match self.rewrite(href) {
            Some(url) => VisitorAction::Replace(url),
            None => VisitorAction::Continue,
        }
    }
}

/// Composite visitor that chains multiple visitors.
///
/// Visitors are called in order. The first visitor that returns
/// a non-Continue action determines the result.
pub struct CompositeVisitor {
    visitors: Vec<Box<dyn NodeVisitor>>,
}

impl CompositeVisitor {
    /// Create a new composite visitor.
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    /// Add a visitor to the chain.
    pub fn with_visitor<V: NodeVisitor + 'static>(mut self, visitor: V) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    fn first_action(
        &mut self,
        mut visit: impl FnMut(&mut dyn NodeVisitor) -> VisitorAction,
    ) -> VisitorAction {
        for visitor in &mut self.visitors {
            let action = visit(visitor.as_mut());
            if !matches!(action, VisitorAction::Continue) {
                return action;
            }
        }
        VisitorAction::Continue
    }
}

impl Default for CompositeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeVisitor for CompositeVisitor {
    fn visit_heading(&mut self, text: &str, level: u8) -> VisitorAction {
        self.first_action(|v| v.visit_heading(text, level))
    }

    fn visit_image(&mut self, src: &str, alt: Option<&str>, title: Option<&str>) -> VisitorAction {
        self.first_action(|v| v.visit_image(src, alt, title))
    }

    fn visit_code_block(&mut self, language: Option<&str>, code: &str) -> VisitorAction {
        self.first_action(|v| v.visit_code_block(language, code))
    }

    fn visit_link(&mut self, href: &str) -> VisitorAction {
        self.first_action(|v| v.visit_link(href))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_action_default() {
        assert_eq!(VisitorAction::default(), VisitorAction::Continue);
    }

    #[test]
    fn test_visitor_action_helpers() {
        assert!(!VisitorAction::Continue.should_skip());
        assert!(VisitorAction::Skip.should_skip());
        assert!(VisitorAction::Replace("x".into()).is_replace());
        assert_eq!(
            VisitorAction::Replace("hello".into()).replacement(),
            Some("hello")
        );
        assert!(VisitorAction::Skip.replacement().is_none());
    }

    #[test]
    fn test_rewrite_prefix_visitor() {
        let mut visitor = RewritePrefixVisitor::new(
            "https://bucket.storage.test/blog-images/",
            "https://cdn.test/img/",
        );
        let action = visitor.visit_image(
            "https://bucket.storage.test/blog-images/a.png",
            Some("A \"quoted\" alt"),
            None,
        );
        assert_eq!(
            action.replacement(),
            Some("<img src=\"https://cdn.test/img/a.png\" alt=\"A &quot;quoted&quot; alt\">")
        );
        assert_eq!(
            visitor.visit_link("https://elsewhere.test/"),
            VisitorAction::Continue
        );
    }

    #[test]
    fn test_rewrite_prefix_keeps_title() {
        let mut visitor = RewritePrefixVisitor::new("https://bucket.test/", "https://cdn.test/");
        let action = visitor.visit_image("https://bucket.test/a.png", None, Some("Fig. 1 <draft>"));
        assert_eq!(
            action.replacement(),
            Some("<img src=\"https://cdn.test/a.png\" title=\"Fig. 1 &lt;draft&gt;\">")
        );
    }

    #[test]
    fn test_composite_visitor() {
        let mut composite = CompositeVisitor::new()
            .with_visitor(SkipImagesVisitor)
            .with_visitor(DefaultVisitor::new());

        assert!(composite.visit_image("a.png", None, None).should_skip());
        assert_eq!(
            composite.visit_heading("Intro", 1),
            VisitorAction::Continue
        );
    }
}
