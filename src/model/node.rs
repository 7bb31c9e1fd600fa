//! Document tree nodes.

use super::{Mark, MarkSet};

/// Heading level. Only levels 1 to 3 exist in the document schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Top-level heading
    pub const H1: HeadingLevel = HeadingLevel(1);
    /// Section heading
    pub const H2: HeadingLevel = HeadingLevel(2);
    /// Subsection heading
    pub const H3: HeadingLevel = HeadingLevel(3);

    /// Create a heading level, rejecting values outside 1..=3.
    pub fn new(level: u8) -> Option<Self> {
        (1..=3).contains(&level).then_some(Self(level))
    }

    /// Get the numeric level.
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Node kind tags, matching the stored `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root node (`doc`)
    Document,
    /// `paragraph`
    Paragraph,
    /// `heading`
    Heading,
    /// `bulletList`
    BulletList,
    /// `orderedList`
    OrderedList,
    /// `listItem`
    ListItem,
    /// `blockquote`
    Blockquote,
    /// `codeBlock`
    CodeBlock,
    /// `image`
    Image,
    /// `text`
    Text,
    /// `hardBreak`
    HardBreak,
}

impl NodeKind {
    /// The stored type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Document => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::BulletList => "bulletList",
            NodeKind::OrderedList => "orderedList",
            NodeKind::ListItem => "listItem",
            NodeKind::Blockquote => "blockquote",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::Image => "image",
            NodeKind::Text => "text",
            NodeKind::HardBreak => "hardBreak",
        }
    }

    /// Parse a stored type tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "doc" => NodeKind::Document,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList,
            "listItem" => NodeKind::ListItem,
            "blockquote" => NodeKind::Blockquote,
            "codeBlock" => NodeKind::CodeBlock,
            "image" => NodeKind::Image,
            "text" => NodeKind::Text,
            "hardBreak" => NodeKind::HardBreak,
            _ => return None,
        })
    }

    /// Block-level kinds may appear in the document, blockquotes and list items.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::BulletList
                | NodeKind::OrderedList
                | NodeKind::Blockquote
                | NodeKind::CodeBlock
                | NodeKind::Image
        )
    }

    /// Inline kinds live inside textblocks.
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::HardBreak)
    }

    /// Textblocks hold inline content directly.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Heading | NodeKind::CodeBlock
        )
    }

    /// List kinds.
    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::BulletList | NodeKind::OrderedList)
    }

    /// Leaf kinds never have children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::Text | NodeKind::HardBreak)
    }
}

/// One node of the structured document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// The root node
    Document {
        /// Top-level blocks
        content: Vec<DocumentNode>,
    },
    /// A paragraph of inline content
    Paragraph {
        /// Inline content
        content: Vec<DocumentNode>,
    },
    /// A section heading
    Heading {
        /// Heading level (1-3)
        level: HeadingLevel,
        /// Inline content
        content: Vec<DocumentNode>,
    },
    /// An unordered list
    BulletList {
        /// List items
        content: Vec<DocumentNode>,
    },
    /// A numbered list
    OrderedList {
        /// First item number
        start: u32,
        /// List items
        content: Vec<DocumentNode>,
    },
    /// One list item
    ListItem {
        /// Blocks of the item
        content: Vec<DocumentNode>,
    },
    /// A quotation
    Blockquote {
        /// Quoted blocks
        content: Vec<DocumentNode>,
    },
    /// Preformatted code
    CodeBlock {
        /// Language hint
        language: Option<String>,
        /// Unmarked text content
        content: Vec<DocumentNode>,
    },
    /// A block image
    Image {
        /// Resolvable image URL
        src: String,
        /// Alternative text
        alt: Option<String>,
        /// Tooltip
        title: Option<String>,
    },
    /// A text run
    Text {
        /// The text content
        text: String,
        /// Active marks in insertion order
        marks: MarkSet,
    },
    /// A line break inside a textblock
    HardBreak,
}

impl DocumentNode {
    /// Create a document root.
    pub fn doc(content: Vec<DocumentNode>) -> Self {
        DocumentNode::Document { content }
    }

    /// Create the initial content of a new post: one empty paragraph.
    pub fn empty_document() -> Self {
        DocumentNode::doc(vec![DocumentNode::paragraph(Vec::new())])
    }

    /// Create a document holding a single paragraph with the given message.
    pub fn placeholder(message: &str) -> Self {
        let content = if message.is_empty() {
            Vec::new()
        } else {
            vec![DocumentNode::text(message)]
        };
        DocumentNode::doc(vec![DocumentNode::paragraph(content)])
    }

    /// Create a paragraph.
    pub fn paragraph(content: Vec<DocumentNode>) -> Self {
        DocumentNode::Paragraph { content }
    }

    /// Create a heading.
    pub fn heading(level: HeadingLevel, content: Vec<DocumentNode>) -> Self {
        DocumentNode::Heading { level, content }
    }

    /// Create a bullet list from items.
    pub fn bullet_list(items: Vec<DocumentNode>) -> Self {
        DocumentNode::BulletList { content: items }
    }

    /// Create an ordered list starting at 1.
    pub fn ordered_list(items: Vec<DocumentNode>) -> Self {
        DocumentNode::OrderedList {
            start: 1,
            content: items,
        }
    }

    /// Create a list item.
    pub fn list_item(content: Vec<DocumentNode>) -> Self {
        DocumentNode::ListItem { content }
    }

    /// Create a blockquote.
    pub fn blockquote(content: Vec<DocumentNode>) -> Self {
        DocumentNode::Blockquote { content }
    }

    /// Create a code block holding `code` as a single text run.
    pub fn code_block(language: Option<&str>, code: &str) -> Self {
        let content = if code.is_empty() {
            Vec::new()
        } else {
            vec![DocumentNode::text(code)]
        };
        DocumentNode::CodeBlock {
            language: language.map(str::to_string),
            content,
        }
    }

    /// Create an image.
    pub fn image(src: impl Into<String>, alt: Option<&str>) -> Self {
        DocumentNode::Image {
            src: src.into(),
            alt: alt.map(str::to_string),
            title: None,
        }
    }

    /// Create an unmarked text run.
    pub fn text(text: impl Into<String>) -> Self {
        DocumentNode::Text {
            text: text.into(),
            marks: MarkSet::new(),
        }
    }

    /// Create a text run with marks in the given order. Later marks of an
    /// already present kind are ignored.
    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut set = MarkSet::new();
        for mark in marks {
            set.insert(mark);
        }
        DocumentNode::Text {
            text: text.into(),
            marks: set,
        }
    }

    /// Get the kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            DocumentNode::Document { .. } => NodeKind::Document,
            DocumentNode::Paragraph { .. } => NodeKind::Paragraph,
            DocumentNode::Heading { .. } => NodeKind::Heading,
            DocumentNode::BulletList { .. } => NodeKind::BulletList,
            DocumentNode::OrderedList { .. } => NodeKind::OrderedList,
            DocumentNode::ListItem { .. } => NodeKind::ListItem,
            DocumentNode::Blockquote { .. } => NodeKind::Blockquote,
            DocumentNode::CodeBlock { .. } => NodeKind::CodeBlock,
            DocumentNode::Image { .. } => NodeKind::Image,
            DocumentNode::Text { .. } => NodeKind::Text,
            DocumentNode::HardBreak => NodeKind::HardBreak,
        }
    }

    /// Child nodes; empty for leaves.
    pub fn content(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Document { content }
            | DocumentNode::Paragraph { content }
            | DocumentNode::Heading { content, .. }
            | DocumentNode::BulletList { content }
            | DocumentNode::OrderedList { content, .. }
            | DocumentNode::ListItem { content }
            | DocumentNode::Blockquote { content }
            | DocumentNode::CodeBlock { content, .. } => content,
            DocumentNode::Image { .. } | DocumentNode::Text { .. } | DocumentNode::HardBreak => {
                &[]
            }
        }
    }

    /// Mutable child list; `None` for leaves.
    pub fn content_mut(&mut self) -> Option<&mut Vec<DocumentNode>> {
        match self {
            DocumentNode::Document { content }
            | DocumentNode::Paragraph { content }
            | DocumentNode::Heading { content, .. }
            | DocumentNode::BulletList { content }
            | DocumentNode::OrderedList { content, .. }
            | DocumentNode::ListItem { content }
            | DocumentNode::Blockquote { content }
            | DocumentNode::CodeBlock { content, .. } => Some(content),
            DocumentNode::Image { .. } | DocumentNode::Text { .. } | DocumentNode::HardBreak => {
                None
            }
        }
    }

    /// Take the child list out of the node, leaving it empty.
    pub fn take_content(&mut self) -> Vec<DocumentNode> {
        self.content_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Get the node at a child-index path (empty path is this node).
    pub fn node_at(&self, path: &[usize]) -> Option<&DocumentNode> {
        path.iter()
            .try_fold(self, |node, &index| node.content().get(index))
    }

    /// Get the node at a child-index path mutably.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut DocumentNode> {
        let mut node = self;
        for &index in path {
            node = node.content_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Concatenated text content. Hard breaks contribute a newline.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            DocumentNode::Text { text, .. } => out.push_str(text),
            DocumentNode::HardBreak => out.push('\n'),
            _ => {
                for child in self.content() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Length of inline content in editor offsets: one per character, one
    /// per hard break.
    pub fn inline_len(&self) -> usize {
        self.content()
            .iter()
            .map(|child| match child {
                DocumentNode::Text { text, .. } => text.chars().count(),
                DocumentNode::HardBreak => 1,
                _ => 0,
            })
            .sum()
    }

    /// Check whether a document has no visible content.
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentNode::Image { .. } => false,
            DocumentNode::Text { text, .. } => text.is_empty(),
            DocumentNode::HardBreak => true,
            _ => self.content().iter().all(DocumentNode::is_empty),
        }
    }

    /// Iterate this node and all descendants in document (pre-)order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a node and its descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a DocumentNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DocumentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.content().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentNode {
        DocumentNode::doc(vec![
            DocumentNode::heading(HeadingLevel::H1, vec![DocumentNode::text("Title")]),
            DocumentNode::paragraph(vec![
                DocumentNode::text("Hello "),
                DocumentNode::marked("world", [Mark::Bold]),
                DocumentNode::HardBreak,
                DocumentNode::text("!"),
            ]),
            DocumentNode::bullet_list(vec![DocumentNode::list_item(vec![
                DocumentNode::paragraph(vec![DocumentNode::text("item")]),
            ])]),
        ])
    }

    #[test]
    fn test_heading_level_bounds() {
        assert!(HeadingLevel::new(0).is_none());
        assert_eq!(HeadingLevel::new(2), Some(HeadingLevel::H2));
        assert!(HeadingLevel::new(4).is_none());
    }

    #[test]
    fn test_kind_tags_round_trip() {
        for node in sample().descendants() {
            let kind = node.kind();
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::parse("table"), None);
    }

    #[test]
    fn test_text_content_and_inline_len() {
        let doc = sample();
        let para = doc.node_at(&[1]).unwrap();
        assert_eq!(para.text_content(), "Hello world\n!");
        assert_eq!(para.inline_len(), 13);
    }

    #[test]
    fn test_node_at_paths() {
        let doc = sample();
        let item_para = doc.node_at(&[2, 0, 0]).unwrap();
        assert_eq!(item_para.kind(), NodeKind::Paragraph);
        assert!(doc.node_at(&[5]).is_none());
        assert!(doc.node_at(&[0, 0, 0]).is_none());
    }

    #[test]
    fn test_descendants_preorder() {
        let kinds: Vec<_> = sample().descendants().map(|n| n.kind()).take(4).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Document,
                NodeKind::Heading,
                NodeKind::Text,
                NodeKind::Paragraph
            ]
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(DocumentNode::empty_document().is_empty());
        assert!(!sample().is_empty());
        assert!(!DocumentNode::doc(vec![DocumentNode::image("a.png", None)]).is_empty());
    }
}
