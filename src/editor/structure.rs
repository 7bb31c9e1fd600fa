//! Block-structure helpers: range resolution, containers and path remapping.

use super::position::{Position, Range};
use crate::model::{DocumentNode, NodeKind};

/// The covered part of one textblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub path: Vec<usize>,
    pub from: usize,
    pub to: usize,
}

/// Length of the textblock a position points into, if the position is valid.
pub(crate) fn textblock_len(root: &DocumentNode, position: &Position) -> Option<usize> {
    let node = root.node_at(&position.path)?;
    if position.path.is_empty() || !node.kind().is_textblock() {
        return None;
    }
    let len = node.inline_len();
    (position.offset <= len).then_some(len)
}

/// Child-index paths of every textblock, in document order.
pub(crate) fn textblock_paths(root: &DocumentNode) -> Vec<Vec<usize>> {
    let mut paths = Vec::new();
    collect_textblocks(root, &mut Vec::new(), &mut paths);
    paths
}

fn collect_textblocks(node: &DocumentNode, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    if node.kind().is_textblock() {
        out.push(path.clone());
        return;
    }
    for (index, child) in node.content().iter().enumerate() {
        path.push(index);
        collect_textblocks(child, path, out);
        path.pop();
    }
}

/// Resolve a range to the textblocks it covers, or `None` if either
/// endpoint is invalid.
pub(crate) fn resolve(root: &DocumentNode, range: &Range) -> Option<Vec<Span>> {
    let (start, end) = (range.start(), range.end());
    textblock_len(root, start)?;
    textblock_len(root, end)?;

    let spans = textblock_paths(root)
        .into_iter()
        .filter(|path| *path >= start.path && *path <= end.path)
        .filter_map(|path| {
            let len = root.node_at(&path)?.inline_len();
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path { end.offset } else { len };
            Some(Span { path, from, to })
        })
        .collect();
    Some(spans)
}

/// Deepest node containing both endpoints' textblocks (never a textblock).
pub(crate) fn common_container(start: &[usize], end: &[usize]) -> Vec<usize> {
    let limit = start.len().min(end.len()).saturating_sub(1);
    let shared = start
        .iter()
        .zip(end)
        .take_while(|(a, b)| a == b)
        .count()
        .min(limit);
    start[..shared].to_vec()
}

/// Nearest node at `path` or above whose kind satisfies `pred`.
pub(crate) fn nearest_ancestor(
    root: &DocumentNode,
    path: &[usize],
    pred: impl Fn(NodeKind) -> bool,
) -> Option<Vec<usize>> {
    (0..=path.len())
        .rev()
        .find(|&depth| root.node_at(&path[..depth]).is_some_and(|n| pred(n.kind())))
        .map(|depth| path[..depth].to_vec())
}

/// Replace children `from..=to` of the node at `parent` with `wrap(children)`.
pub(crate) fn wrap_children(
    root: &mut DocumentNode,
    parent: &[usize],
    from: usize,
    to: usize,
    wrap: impl FnOnce(Vec<DocumentNode>) -> DocumentNode,
) -> bool {
    let Some(content) = root.node_at_mut(parent).and_then(|n| n.content_mut()) else {
        return false;
    };
    if from > to || to >= content.len() {
        return false;
    }
    let wrapped: Vec<_> = content.drain(from..=to).collect();
    content.insert(from, wrap(wrapped));
    true
}

/// Replace the node at `path` with the blocks `flatten` produces from it.
pub(crate) fn replace_with_children(
    root: &mut DocumentNode,
    path: &[usize],
    flatten: impl FnOnce(DocumentNode) -> Vec<DocumentNode>,
) -> bool {
    let Some((&index, parent)) = path.split_last() else {
        return false;
    };
    let Some(content) = root.node_at_mut(parent).and_then(|n| n.content_mut()) else {
        return false;
    };
    if index >= content.len() {
        return false;
    }
    let node = content.remove(index);
    let blocks = flatten(node);
    content.splice(index..index, blocks);
    true
}

/// Path of a node after children `from..=to` of `parent` were wrapped.
/// `as_items` adds the list item level a list wrap introduces.
pub(crate) fn remap_wrap(
    path: &[usize],
    parent: &[usize],
    from: usize,
    to: usize,
    as_items: bool,
) -> Vec<usize> {
    if path.len() <= parent.len() || !path.starts_with(parent) {
        return path.to_vec();
    }
    let depth = parent.len();
    let index = path[depth];
    let mut mapped = parent.to_vec();
    if index < from {
        return path.to_vec();
    } else if index <= to {
        mapped.push(from);
        mapped.push(index - from);
        if as_items {
            mapped.push(0);
        }
    } else {
        mapped.push(index - (to - from));
    }
    mapped.extend_from_slice(&path[depth + 1..]);
    mapped
}

/// Path of a node after the node at `at` was replaced by its `count`
/// children (lifting a blockquote).
pub(crate) fn remap_lift(path: &[usize], at: &[usize], count: usize) -> Vec<usize> {
    remap_flatten(path, at, count, |rest| rest.split_first().map(|(&child, tail)| (child, tail)))
}

/// Path of a node after the list at `at` was replaced by the blocks of its
/// items; `lens[i]` is the number of blocks item `i` held.
pub(crate) fn remap_unwrap_list(path: &[usize], at: &[usize], lens: &[usize]) -> Vec<usize> {
    remap_flatten(path, at, lens.iter().sum(), |rest| {
        let (&item, rest) = rest.split_first()?;
        let (&block, tail) = rest.split_first()?;
        let before: usize = lens[..item.min(lens.len())].iter().sum();
        Some((before + block, tail))
    })
}

fn remap_flatten(
    path: &[usize],
    at: &[usize],
    total: usize,
    inner: impl Fn(&[usize]) -> Option<(usize, &[usize])>,
) -> Vec<usize> {
    let Some((&index, parent)) = at.split_last() else {
        return path.to_vec();
    };
    if path.len() <= parent.len() || !path.starts_with(parent) {
        return path.to_vec();
    }

    let depth = parent.len();
    let mut mapped = parent.to_vec();
    if path[depth] == index {
        let Some((moved, tail)) = inner(&path[depth + 1..]) else {
            return path.to_vec();
        };
        mapped.push(index + moved);
        mapped.extend_from_slice(tail);
    } else if path[depth] > index {
        mapped.push(path[depth] + total - 1);
        mapped.extend_from_slice(&path[depth + 1..]);
    } else {
        return path.to_vec();
    }
    mapped
}
