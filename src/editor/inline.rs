//! Offset-based helpers over inline content.

use crate::model::{DocumentNode, MarkSet};

/// Editor length of one inline node.
pub(crate) fn node_len(node: &DocumentNode) -> usize {
    match node {
        DocumentNode::Text { text, .. } => text.chars().count(),
        DocumentNode::HardBreak => 1,
        _ => 0,
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}

/// Make sure a node boundary falls at `offset` and return the index of the
/// first node at or after it.
pub(crate) fn split_at(content: &mut Vec<DocumentNode>, offset: usize) -> usize {
    let mut pos = 0;
    for index in 0..content.len() {
        if pos == offset {
            return index;
        }
        let len = node_len(&content[index]);
        if offset < pos + len {
            if let DocumentNode::Text { text, marks } = &mut content[index] {
                let split = byte_index(text, offset - pos);
                let tail = DocumentNode::Text {
                    text: text.split_off(split),
                    marks: marks.clone(),
                };
                content.insert(index + 1, tail);
                return index + 1;
            }
        }
        pos += len;
    }
    content.len()
}

/// Apply `f` to the marks of every text run in `from..to`.
pub(crate) fn update_marks(
    content: &mut Vec<DocumentNode>,
    from: usize,
    to: usize,
    mut f: impl FnMut(&mut MarkSet),
) {
    if from >= to {
        return;
    }
    let first = split_at(content, from);
    let last = split_at(content, to);
    for node in &mut content[first..last] {
        if let DocumentNode::Text { marks, .. } = node {
            f(marks);
        }
    }
}

/// Marks of the text runs overlapping `from..to`.
pub(crate) fn marks_in(content: &[DocumentNode], from: usize, to: usize) -> Vec<&MarkSet> {
    let mut found = Vec::new();
    let mut pos = 0;
    for node in content {
        let len = node_len(node);
        if let DocumentNode::Text { marks, .. } = node {
            if pos < to && from < pos + len {
                found.push(marks);
            }
        }
        pos += len;
    }
    found
}

/// Index and marks of the text run holding the character at `offset`.
pub(crate) fn run_at(content: &[DocumentNode], offset: usize) -> Option<(usize, &MarkSet)> {
    let mut pos = 0;
    for (index, node) in content.iter().enumerate() {
        let len = node_len(node);
        if offset < pos + len {
            return match node {
                DocumentNode::Text { marks, .. } => Some((index, marks)),
                _ => None,
            };
        }
        pos += len;
    }
    None
}

/// Marks a cursor at `offset` would type with: those of the character
/// before it, or of the first character at the start of a block.
pub(crate) fn marks_at_cursor(content: &[DocumentNode], offset: usize) -> Option<&MarkSet> {
    let lookup = offset.saturating_sub(1);
    run_at(content, lookup).map(|(_, marks)| marks)
}

/// Offset at which the node at `index` starts.
pub(crate) fn offset_of(content: &[DocumentNode], index: usize) -> usize {
    content[..index.min(content.len())].iter().map(node_len).sum()
}

/// Drop empty text runs and merge neighbours with identical marks.
pub(crate) fn normalize(content: &mut Vec<DocumentNode>) {
    let mut merged: Vec<DocumentNode> = Vec::with_capacity(content.len());
    for node in content.drain(..) {
        if let DocumentNode::Text { text, marks } = &node {
            if text.is_empty() {
                continue;
            }
            if let Some(DocumentNode::Text {
                text: previous,
                marks: previous_marks,
            }) = merged.last_mut()
            {
                if previous_marks == marks {
                    previous.push_str(text);
                    continue;
                }
            }
        }
        merged.push(node);
    }
    *content = merged;
}

/// Normalize the inline content of every textblock in a tree.
pub(crate) fn normalize_tree(node: &mut DocumentNode) {
    let is_textblock = node.kind().is_textblock();
    if let Some(content) = node.content_mut() {
        if is_textblock {
            normalize(content);
        } else {
            content.iter_mut().for_each(normalize_tree);
        }
    }
}

/// Turn text into inline nodes, mapping newlines to hard breaks.
pub(crate) fn text_to_inline(text: &str, marks: &MarkSet) -> Vec<DocumentNode> {
    let mut nodes = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(DocumentNode::HardBreak);
        }
        if !line.is_empty() {
            nodes.push(DocumentNode::Text {
                text: line.to_string(),
                marks: marks.clone(),
            });
        }
    }
    nodes
}
