//! Plain text rendering for document trees.

use crate::metadata::{collapse_whitespace, tree_to_text};
use crate::model::DocumentNode;

/// Convert a document to plain text.
///
/// Blocks are separated by blank lines, list items get `- ` or `N. `
/// markers, quoted lines are prefixed with `> ` and images are shown by
/// their alt text.
pub fn to_text(root: &DocumentNode) -> String {
    block_text(root).trim().to_string()
}

/// Short single-line summary of a document, cut at a word boundary.
///
/// Returns the whole text when it fits in `max_chars` characters; otherwise
/// the cut text ends with `…`.
pub fn excerpt(root: &DocumentNode, max_chars: usize) -> String {
    let text = collapse_whitespace(&tree_to_text(root));
    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars).collect();
    let ends_on_word = text
        .chars()
        .nth(max_chars)
        .map_or(true, |c| !c.is_alphanumeric());
    let kept = match cut.rfind(' ') {
        Some(space) if !ends_on_word => &cut[..space],
        _ => cut.as_str(),
    };

    let kept = kept.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '.'));
    format!("{}…", kept)
}

fn blocks_text(blocks: &[DocumentNode]) -> String {
    blocks
        .iter()
        .map(block_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_text(node: &DocumentNode) -> String {
    match node {
        DocumentNode::Document { content } | DocumentNode::ListItem { content } => {
            blocks_text(content)
        }
        DocumentNode::Paragraph { .. }
        | DocumentNode::Heading { .. }
        | DocumentNode::CodeBlock { .. }
        | DocumentNode::Text { .. }
        | DocumentNode::HardBreak => node.text_content(),
        DocumentNode::BulletList { content } => list_text(content, |_| "- ".to_string()),
        DocumentNode::OrderedList { start, content } => {
            list_text(content, |i| format!("{}. ", start.saturating_add(i as u32)))
        }
        DocumentNode::Blockquote { content } => blocks_text(content)
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        DocumentNode::Image { alt, .. } => alt
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .map(|alt| format!("[{}]", alt))
            .unwrap_or_default(),
    }
}

fn list_text(items: &[DocumentNode], marker: impl Fn(usize) -> String) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = marker(i);
            let indent = " ".repeat(marker.chars().count());
            let body = blocks_text(item.content());

            let mut out = marker;
            for (n, line) in body.lines().enumerate() {
                if n > 0 {
                    out.push('\n');
                    if !line.is_empty() {
                        out.push_str(&indent);
                    }
                }
                out.push_str(line);
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}
