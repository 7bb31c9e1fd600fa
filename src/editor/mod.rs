//! Editing session over a live document tree.
//!
//! [`EditingSession`] owns one tree and an optional selection and exposes
//! the toolbar operations of the post editor. Operations never fail: a
//! request that does not apply to its range (a list inside a code block, a
//! link without a target, a stale position) leaves the tree untouched and
//! returns `false`.
//!
//! # Example
//!
//! ```
//! use folio::editor::{BlockKind, EditingSession, Position, Range};
//! use folio::model::{HeadingLevel, MarkKind};
//!
//! let mut session = EditingSession::new();
//! session.insert_text(&Position::new([0], 0), "Hello world");
//!
//! let word = Range::within([0], 6, 11);
//! assert!(session.toggle_mark(&word, MarkKind::Bold));
//! assert!(session.set_block_kind(&word, BlockKind::Heading(HeadingLevel::H2)));
//! assert!(session.active(&word).has_mark(MarkKind::Bold));
//! ```

mod formats;
mod inline;
mod position;
mod structure;

pub use formats::{ActiveFormats, BlockKind, ListKind, SessionState};
pub use position::{Position, Range};

use crate::codec::{self, StoredDocument};
use crate::error::{Error, Result};
use crate::metadata::{extract_metadata_from_tree, DocumentMetadata, MetadataOptions};
use crate::model::{schema, DocumentNode, Mark, MarkKind, MarkSet, NodeKind};
use crate::render::{render_tree, RenderOptions, RenderedDocument};
use crate::store::ImageStore;

use structure::Span;

/// Target stored on links created in the editor.
pub const LINK_TARGET: &str = "_blank";

/// A live document being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSession {
    root: DocumentNode,
    selection: Option<Range>,
}

impl EditingSession {
    /// Start a session on a new post: a single empty paragraph.
    pub fn new() -> Self {
        Self {
            root: DocumentNode::empty_document(),
            selection: None,
        }
    }

    /// Start a session on an existing tree. Trees that violate the schema
    /// are replaced by a placeholder document.
    pub fn from_document(root: DocumentNode) -> Self {
        let root = match schema::validate(&root) {
            Ok(()) => root,
            Err(e) => {
                log::warn!("Editing placeholder instead of invalid tree: {}", e);
                DocumentNode::placeholder(codec::PLACEHOLDER_TEXT)
            }
        };
        Self {
            root,
            selection: None,
        }
    }

    /// Start a session on a stored post, degrading to a placeholder.
    pub fn from_stored(doc: &StoredDocument) -> Self {
        Self::from_document(codec::deserialize_or_placeholder(doc))
    }

    /// Serialize the current tree for saving.
    pub fn to_stored(&self) -> StoredDocument {
        codec::serialize(&self.root)
    }

    /// Borrow the live tree.
    pub fn document(&self) -> &DocumentNode {
        &self.root
    }

    /// Discard the session, keeping the tree.
    pub fn into_document(self) -> DocumentNode {
        self.root
    }

    /// The current selection.
    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    /// Set the selection. Returns `false` (keeping the old selection) if the
    /// range does not address textblocks of this document.
    pub fn select(&mut self, range: Range) -> bool {
        if structure::resolve(&self.root, &range).is_none() {
            return self.reject("select", "range does not address a textblock");
        }
        self.selection = Some(range);
        true
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Coarse session state.
    pub fn state(&self) -> SessionState {
        if self.root.is_empty() {
            SessionState::Empty
        } else if self.selection.as_ref().is_some_and(|range| !range.is_collapsed()) {
            SessionState::Selecting
        } else {
            SessionState::HasContent
        }
    }

    /// Headings and reading time of the live tree.
    pub fn metadata(&self, options: &MetadataOptions) -> DocumentMetadata {
        extract_metadata_from_tree(&self.root, options)
    }

    /// Render the live tree for preview.
    pub fn render(&self, options: &RenderOptions) -> RenderedDocument {
        render_tree(&self.root, options)
    }

    /// Formatting active over a range.
    pub fn active(&self, range: &Range) -> ActiveFormats {
        let Some(spans) = structure::resolve(&self.root, range) else {
            return ActiveFormats::default();
        };

        let blocks: Vec<&DocumentNode> = spans
            .iter()
            .filter_map(|span| self.root.node_at(&span.path))
            .collect();
        let touches_code = blocks.iter().any(|b| b.kind() == NodeKind::CodeBlock);
        let block = blocks
            .first()
            .and_then(|first| BlockKind::of_textblock(first))
            .filter(|kind| blocks.iter().all(|b| BlockKind::of_textblock(b).as_ref() == Some(kind)));

        let (marks, link_href) = if range.is_collapsed() {
            self.marks_at_cursor(range.start())
        } else {
            self.marks_over(&spans)
        };

        let container = structure::common_container(&range.start().path, &range.end().path);
        let list = structure::nearest_ancestor(&self.root, &container, |k| k.is_list())
            .and_then(|path| self.root.node_at(&path))
            .and_then(|node| ListKind::of(node.kind()));
        let in_blockquote =
            structure::nearest_ancestor(&self.root, &container, |k| k == NodeKind::Blockquote)
                .is_some();

        ActiveFormats {
            marks,
            link_href,
            block,
            list,
            in_blockquote,
            can_mark: blocks.iter().any(|b| b.kind() != NodeKind::CodeBlock),
            can_list: !touches_code,
        }
    }

    /// Toggle a mark over a range: removed if every covered character
    /// carries it, added otherwise. Links can only be toggled off.
    pub fn toggle_mark(&mut self, range: &Range, kind: MarkKind) -> bool {
        let Some(spans) = self.mark_spans(range) else {
            return self.reject("toggle_mark", "range does not address a textblock");
        };
        let Some(all_marked) = self.all_marked(&spans, kind) else {
            return self.reject("toggle_mark", "no markable text in range");
        };

        let changed = match (kind, all_marked) {
            (MarkKind::Link, _) | (_, true) => self.update_spans(&spans, |marks| {
                marks.remove(kind);
            }),
            (_, false) => {
                let mark = match kind {
                    MarkKind::Bold => Mark::Bold,
                    MarkKind::Italic => Mark::Italic,
                    _ => Mark::Code,
                };
                self.update_spans(&spans, |marks| {
                    marks.insert(mark.clone());
                })
            }
        };
        self.commit(changed)
    }

    /// Apply a block kind to the range.
    pub fn set_block_kind(&mut self, range: &Range, kind: BlockKind) -> bool {
        let Some(spans) = structure::resolve(&self.root, range) else {
            return self.reject("set_block_kind", "range does not address a textblock");
        };

        let changed = match &kind {
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::CodeBlock(_) => {
                self.retype_textblocks(&spans, &kind)
            }
            BlockKind::BulletList | BlockKind::OrderedList => match kind.list_kind() {
                Some(list) => self.set_list(range, &spans, list),
                None => false,
            },
            BlockKind::Blockquote => self.wrap_blockquote(range),
        };
        self.commit(changed)
    }

    /// Toolbar toggle: applying a kind that is already active reverts it.
    pub fn toggle_block_kind(&mut self, range: &Range, kind: BlockKind) -> bool {
        let Some(spans) = structure::resolve(&self.root, range) else {
            return self.reject("toggle_block_kind", "range does not address a textblock");
        };
        let container = structure::common_container(&range.start().path, &range.end().path);

        let changed = match &kind {
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::CodeBlock(_) => {
                let all_active = spans.iter().all(|span| {
                    self.root
                        .node_at(&span.path)
                        .is_some_and(|node| kind.matches_textblock(node))
                });
                let target = if all_active { BlockKind::Paragraph } else { kind.clone() };
                self.retype_textblocks(&spans, &target)
            }
            BlockKind::BulletList | BlockKind::OrderedList => {
                let Some(list) = kind.list_kind() else {
                    return false;
                };
                let enclosing = structure::nearest_ancestor(&self.root, &container, |k| k.is_list());
                let enclosing_kind = enclosing
                    .as_ref()
                    .and_then(|path| self.root.node_at(path))
                    .and_then(|node| ListKind::of(node.kind()));
                match enclosing {
                    Some(path) if enclosing_kind == Some(list) => self.unwrap_list(&path),
                    _ => self.set_list(range, &spans, list),
                }
            }
            BlockKind::Blockquote => {
                match structure::nearest_ancestor(&self.root, &container, |k| {
                    k == NodeKind::Blockquote
                }) {
                    Some(path) => self.lift_blockquote(&path),
                    None => self.wrap_blockquote(range),
                }
            }
        };
        self.commit(changed)
    }

    /// Insert a block image at the cursor (the end of the selection).
    ///
    /// A cursor inside a paragraph or heading splits it, an empty paragraph
    /// is replaced, a cursor in a code block inserts after the block and
    /// without a selection the image is appended.
    pub fn insert_image(&mut self, src: &str, alt: Option<&str>) -> bool {
        if src.trim().is_empty() {
            return self.reject("insert_image", "empty image source");
        }
        let image = DocumentNode::image(src, alt.filter(|alt| !alt.is_empty()));

        let target = self
            .selection
            .as_ref()
            .map(|range| range.end().clone())
            .filter(|position| structure::textblock_len(&self.root, position).is_some());

        let Some(position) = target else {
            if let Some(content) = self.root.content_mut() {
                content.push(image);
            }
            self.selection = None;
            return self.commit(true);
        };

        let Some((&index, parent)) = position.path.split_last() else {
            return false;
        };
        let parent = parent.to_vec();
        let Some(content) = self.root.node_at_mut(&parent).and_then(|n| n.content_mut()) else {
            return false;
        };

        let block = &mut content[index];
        let len = block.inline_len();
        let image_at = if block.kind() == NodeKind::CodeBlock || (len > 0 && position.offset >= len) {
            content.insert(index + 1, image);
            index + 1
        } else if len == 0 && block.kind() == NodeKind::Paragraph {
            content[index] = image;
            index
        } else if position.offset == 0 {
            content.insert(index, image);
            index
        } else {
            let tail = split_textblock(block, position.offset);
            content.insert(index + 1, image);
            content.insert(index + 2, tail);
            index + 1
        };

        let mut after = parent;
        after.push(image_at + 1);
        self.selection = self
            .root
            .node_at(&after)
            .filter(|node| node.kind().is_textblock())
            .map(|_| Range::cursor(Position::new(after, 0)));
        self.commit(true)
    }

    /// Link the covered text to `href`, replacing existing links.
    pub fn insert_link(&mut self, range: &Range, href: &str) -> bool {
        let href = href.trim();
        if range.is_collapsed() || href.is_empty() {
            return self.reject("insert_link", "needs a selection and a target");
        }
        let Some(spans) = self.mark_spans(range) else {
            return self.reject("insert_link", "range does not address a textblock");
        };

        let link = Mark::Link {
            href: href.to_string(),
            target: Some(LINK_TARGET.to_string()),
        };
        let changed = self.update_spans(&spans, |marks| {
            if marks.get(MarkKind::Link) != Some(&link) {
                marks.replace(link.clone());
            }
        });
        self.commit(changed)
    }

    /// Remove links from the range. A cursor removes the whole link run
    /// it sits in.
    pub fn remove_link(&mut self, range: &Range) -> bool {
        let spans = if range.is_collapsed() {
            self.link_run_at(range.start()).map(|span| vec![span])
        } else {
            self.mark_spans(range)
        };
        let Some(spans) = spans else {
            return self.reject("remove_link", "no link at range");
        };

        let changed = self.update_spans(&spans, |marks| {
            marks.remove(MarkKind::Link);
        });
        self.commit(changed)
    }

    /// Insert text at a position, inheriting the marks typing there would
    /// use. Newlines become hard breaks outside code blocks. The selection
    /// becomes a cursor after the inserted text.
    pub fn insert_text(&mut self, position: &Position, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        if structure::textblock_len(&self.root, position).is_none() {
            return self.reject("insert_text", "position does not address a textblock");
        }
        let Some(block) = self.root.node_at_mut(&position.path) else {
            return false;
        };

        let is_code = block.kind() == NodeKind::CodeBlock;
        let Some(content) = block.content_mut() else {
            return false;
        };
        let nodes = if is_code {
            vec![DocumentNode::text(text)]
        } else {
            let marks = inline::marks_at_cursor(content, position.offset)
                .cloned()
                .unwrap_or_default();
            inline::text_to_inline(text, &marks)
        };

        let index = inline::split_at(content, position.offset);
        content.splice(index..index, nodes);

        let offset = position.offset + text.chars().count();
        self.selection = Some(Range::cursor(Position::new(position.path.clone(), offset)));
        self.commit(true)
    }

    /// Upload image bytes and insert the resulting URL at the cursor.
    ///
    /// Upload failures are returned and leave the session unchanged.
    pub fn upload_image(
        &mut self,
        store: &dyn ImageStore,
        bytes: &[u8],
        suggested_name: &str,
        alt: Option<&str>,
    ) -> Result<bool> {
        let url = store.upload_image(bytes, suggested_name)?;
        Ok(self.insert_image(&url, alt))
    }

    // ---- helpers ----

    fn reject(&self, operation: &str, reason: &str) -> bool {
        log::debug!(
            "{}",
            Error::UnsupportedOperation(format!("{}: {}", operation, reason))
        );
        false
    }

    fn commit(&mut self, changed: bool) -> bool {
        if changed {
            inline::normalize_tree(&mut self.root);
            let stale = self
                .selection
                .as_ref()
                .is_some_and(|range| structure::resolve(&self.root, range).is_none());
            if stale {
                self.selection = None;
            }
        }
        changed
    }

    fn remap_selection(&mut self, f: impl Fn(&[usize]) -> Vec<usize>) {
        if let Some(range) = &self.selection {
            self.selection = Some(range.map_paths(f));
        }
    }

    /// Spans that can carry marks: non-empty and outside code blocks.
    fn mark_spans(&self, range: &Range) -> Option<Vec<Span>> {
        let spans = structure::resolve(&self.root, range)?;
        Some(
            spans
                .into_iter()
                .filter(|span| span.from < span.to)
                .filter(|span| {
                    self.root
                        .node_at(&span.path)
                        .is_some_and(|node| node.kind() != NodeKind::CodeBlock)
                })
                .collect(),
        )
    }

    fn inline_content(&self, path: &[usize]) -> &[DocumentNode] {
        self.root.node_at(path).map(DocumentNode::content).unwrap_or_default()
    }

    /// `None` when the spans hold no text at all.
    fn all_marked(&self, spans: &[Span], kind: MarkKind) -> Option<bool> {
        let mut any = false;
        for span in spans {
            for marks in inline::marks_in(self.inline_content(&span.path), span.from, span.to) {
                any = true;
                if !marks.contains(kind) {
                    return Some(false);
                }
            }
        }
        any.then_some(true)
    }

    fn marks_over(&self, spans: &[Span]) -> (Vec<MarkKind>, Option<String>) {
        let spans: Vec<Span> = spans
            .iter()
            .filter(|span| span.from < span.to)
            .filter(|span| {
                self.root
                    .node_at(&span.path)
                    .is_some_and(|node| node.kind() != NodeKind::CodeBlock)
            })
            .cloned()
            .collect();
        let marks: Vec<MarkKind> = MarkKind::ALL
            .into_iter()
            .filter(|&kind| self.all_marked(&spans, kind) == Some(true))
            .collect();

        let link_href = if marks.contains(&MarkKind::Link) {
            spans.first().and_then(|span| {
                inline::marks_in(self.inline_content(&span.path), span.from, span.to)
                    .first()
                    .and_then(|marks| marks.get(MarkKind::Link))
                    .and_then(|mark| mark.href())
                    .map(str::to_string)
            })
        } else {
            None
        };
        (marks, link_href)
    }

    fn marks_at_cursor(&self, position: &Position) -> (Vec<MarkKind>, Option<String>) {
        let Some(block) = self.root.node_at(&position.path) else {
            return (Vec::new(), None);
        };
        if block.kind() == NodeKind::CodeBlock {
            return (Vec::new(), None);
        }
        match inline::marks_at_cursor(block.content(), position.offset) {
            Some(marks) => (
                marks.iter().map(Mark::kind).collect(),
                marks
                    .get(MarkKind::Link)
                    .and_then(Mark::href)
                    .map(str::to_string),
            ),
            None => (Vec::new(), None),
        }
    }

    /// The contiguous run of text sharing the link at a cursor.
    fn link_run_at(&self, position: &Position) -> Option<Span> {
        structure::textblock_len(&self.root, position)?;
        let content = self.inline_content(&position.path);

        let linked = |offset: usize| {
            inline::run_at(content, offset).and_then(|(index, marks)| {
                marks.get(MarkKind::Link).cloned().map(|link| (index, link))
            })
        };
        let (index, link) = position
            .offset
            .checked_sub(1)
            .and_then(linked)
            .or_else(|| linked(position.offset))?;

        let has_link = |node: &DocumentNode| match node {
            DocumentNode::Text { marks, .. } => marks.get(MarkKind::Link) == Some(&link),
            _ => false,
        };
        let mut first = index;
        while first > 0 && has_link(&content[first - 1]) {
            first -= 1;
        }
        let mut last = index;
        while last + 1 < content.len() && has_link(&content[last + 1]) {
            last += 1;
        }

        Some(Span {
            path: position.path.clone(),
            from: inline::offset_of(content, first),
            to: inline::offset_of(content, last + 1),
        })
    }

    fn update_spans(&mut self, spans: &[Span], mut f: impl FnMut(&mut MarkSet)) -> bool {
        let mut changed = false;
        for span in spans {
            let Some(content) = self
                .root
                .node_at_mut(&span.path)
                .and_then(|node| node.content_mut())
            else {
                continue;
            };
            let before = content.clone();
            inline::update_marks(content, span.from, span.to, &mut f);
            inline::normalize(content);
            changed |= *content != before;
        }
        changed
    }

    fn retype_textblocks(&mut self, spans: &[Span], kind: &BlockKind) -> bool {
        let mut changed = false;
        for span in spans {
            let Some(node) = self.root.node_at_mut(&span.path) else {
                continue;
            };
            let retyped = retype(node, kind);
            if retyped != *node {
                *node = retyped;
                changed = true;
            }
        }
        changed
    }

    fn set_list(&mut self, range: &Range, spans: &[Span], list: ListKind) -> bool {
        let touches_code = spans.iter().any(|span| {
            self.root
                .node_at(&span.path)
                .is_some_and(|node| node.kind() == NodeKind::CodeBlock)
        });
        if touches_code {
            return self.reject("set_block_kind", "lists cannot hold code blocks");
        }

        let (start, end) = (&range.start().path, &range.end().path);
        let container = structure::common_container(start, end);

        if let Some(path) = structure::nearest_ancestor(&self.root, &container, |k| k.is_list()) {
            let Some(node) = self.root.node_at_mut(&path) else {
                return false;
            };
            if ListKind::of(node.kind()) == Some(list) {
                return false;
            }
            let items = node.take_content();
            *node = list.build(items);
            return true;
        }

        let depth = container.len();
        let (from, to) = (start[depth], end[depth]);
        let wrapped = structure::wrap_children(&mut self.root, &container, from, to, |blocks| {
            list.build(
                blocks
                    .into_iter()
                    .map(|block| DocumentNode::list_item(vec![block]))
                    .collect(),
            )
        });
        if wrapped {
            self.remap_selection(|path| structure::remap_wrap(path, &container, from, to, true));
        }
        wrapped
    }

    fn wrap_blockquote(&mut self, range: &Range) -> bool {
        let (start, end) = (&range.start().path, &range.end().path);
        let container = structure::common_container(start, end);

        let (parent, from, to) =
            match structure::nearest_ancestor(&self.root, &container, |k| k.is_list()) {
                Some(list) => match list.split_last() {
                    Some((&index, parent)) => (parent.to_vec(), index, index),
                    None => return false,
                },
                None => {
                    let depth = container.len();
                    (container, start[depth], end[depth])
                }
            };

        let already_quoted = self
            .root
            .node_at(&parent)
            .is_some_and(|node| node.kind() == NodeKind::Blockquote);
        if already_quoted {
            return false;
        }

        let wrapped =
            structure::wrap_children(&mut self.root, &parent, from, to, DocumentNode::blockquote);
        if wrapped {
            self.remap_selection(|path| structure::remap_wrap(path, &parent, from, to, false));
        }
        wrapped
    }

    fn unwrap_list(&mut self, path: &[usize]) -> bool {
        let lens: Vec<usize> = self
            .root
            .node_at(path)
            .map(|list| list.content().iter().map(|item| item.content().len()).collect())
            .unwrap_or_default();

        let unwrapped = structure::replace_with_children(&mut self.root, path, |mut list| {
            list.take_content()
                .into_iter()
                .flat_map(|mut item| item.take_content())
                .collect()
        });
        if unwrapped {
            self.remap_selection(|p| structure::remap_unwrap_list(p, path, &lens));
        }
        unwrapped
    }

    fn lift_blockquote(&mut self, path: &[usize]) -> bool {
        let count = self.root.node_at(path).map_or(0, |quote| quote.content().len());
        let lifted =
            structure::replace_with_children(&mut self.root, path, |mut quote| quote.take_content());
        if lifted {
            self.remap_selection(|p| structure::remap_lift(p, path, count));
        }
        lifted
    }
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Retype a textblock, converting its inline content as needed.
fn retype(node: &DocumentNode, kind: &BlockKind) -> DocumentNode {
    let inline = || {
        if node.kind() == NodeKind::CodeBlock {
            inline::text_to_inline(&node.text_content(), &MarkSet::new())
        } else {
            node.content().to_vec()
        }
    };
    match kind {
        BlockKind::Paragraph => DocumentNode::paragraph(inline()),
        BlockKind::Heading(level) => DocumentNode::heading(*level, inline()),
        BlockKind::CodeBlock(language) => {
            DocumentNode::code_block(language.as_deref(), &node.text_content())
        }
        _ => node.clone(),
    }
}

/// Split a paragraph or heading at `offset`, returning the tail block.
fn split_textblock(block: &mut DocumentNode, offset: usize) -> DocumentNode {
    let tail = match block.content_mut() {
        Some(content) => {
            let index = inline::split_at(content, offset);
            content.split_off(index)
        }
        None => Vec::new(),
    };
    match block {
        DocumentNode::Heading { level, .. } => DocumentNode::heading(*level, tail),
        _ => DocumentNode::paragraph(tail),
    }
}
