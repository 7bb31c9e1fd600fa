//! Block kinds and the typed "what is active here" query result.

use crate::model::{DocumentNode, HeadingLevel, MarkKind, NodeKind};

/// Block kinds the toolbar can apply to a range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Plain paragraph
    Paragraph,
    /// Heading of the given level
    Heading(HeadingLevel),
    /// Code block with an optional language
    CodeBlock(Option<String>),
    /// Unordered list
    BulletList,
    /// Numbered list
    OrderedList,
    /// Quotation
    Blockquote,
}

impl BlockKind {
    /// Check whether this kind retypes textblocks in place.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::CodeBlock(_)
        )
    }

    /// The list kind, for list block kinds.
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            BlockKind::BulletList => Some(ListKind::Bullet),
            BlockKind::OrderedList => Some(ListKind::Ordered),
            _ => None,
        }
    }

    /// Kind of an existing textblock.
    pub(crate) fn of_textblock(node: &DocumentNode) -> Option<BlockKind> {
        match node {
            DocumentNode::Paragraph { .. } => Some(BlockKind::Paragraph),
            DocumentNode::Heading { level, .. } => Some(BlockKind::Heading(*level)),
            DocumentNode::CodeBlock { language, .. } => Some(BlockKind::CodeBlock(language.clone())),
            _ => None,
        }
    }

    /// Textblock kinds match loosely on code blocks: any language counts.
    pub(crate) fn matches_textblock(&self, node: &DocumentNode) -> bool {
        match (self, node) {
            (BlockKind::CodeBlock(_), DocumentNode::CodeBlock { .. }) => true,
            _ => BlockKind::of_textblock(node).as_ref() == Some(self),
        }
    }
}

/// List flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// `bulletList`
    Bullet,
    /// `orderedList`
    Ordered,
}

impl ListKind {
    pub(crate) fn of(kind: NodeKind) -> Option<ListKind> {
        match kind {
            NodeKind::BulletList => Some(ListKind::Bullet),
            NodeKind::OrderedList => Some(ListKind::Ordered),
            _ => None,
        }
    }

    pub(crate) fn build(self, items: Vec<DocumentNode>) -> DocumentNode {
        match self {
            ListKind::Bullet => DocumentNode::bullet_list(items),
            ListKind::Ordered => DocumentNode::ordered_list(items),
        }
    }
}

/// Formatting state of a range, as a toolbar would display it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFormats {
    /// Marks carried by every character of the range (for a cursor: the
    /// marks typing would inherit)
    pub marks: Vec<MarkKind>,

    /// Target of the active link, if any
    pub link_href: Option<String>,

    /// Kind shared by every covered textblock
    pub block: Option<BlockKind>,

    /// Kind of the nearest list enclosing the range
    pub list: Option<ListKind>,

    /// Whether the range sits inside a blockquote
    pub in_blockquote: bool,

    /// Whether marks can be applied (some covered textblock is not code)
    pub can_mark: bool,

    /// Whether list kinds can be applied (no code block is touched)
    pub can_list: bool,
}

impl ActiveFormats {
    /// Check whether a mark is active.
    pub fn has_mark(&self, kind: MarkKind) -> bool {
        self.marks.contains(&kind)
    }

    /// Check whether a toolbar block kind is active.
    pub fn is_active(&self, kind: &BlockKind) -> bool {
        match kind {
            BlockKind::BulletList => self.list == Some(ListKind::Bullet),
            BlockKind::OrderedList => self.list == Some(ListKind::Ordered),
            BlockKind::Blockquote => self.in_blockquote,
            BlockKind::CodeBlock(_) => matches!(self.block, Some(BlockKind::CodeBlock(_))),
            other => self.block.as_ref() == Some(other),
        }
    }
}

/// Coarse state of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No visible content yet
    Empty,
    /// Content without an active selection
    HasContent,
    /// Content with a non-collapsed selection
    Selecting,
}
