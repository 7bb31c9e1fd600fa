//! Content rules of the document schema.
//!
//! The node enum already rules out children on leaves and untyped
//! attributes. The remaining invariants (which kinds may nest where, the
//! root appearing only once, non-empty text and link targets) are checked
//! here.

use super::{DocumentNode, Mark, NodeKind};
use crate::error::{Error, Result};

/// Check whether `parent` accepts a direct child of kind `child`.
pub fn accepts(parent: NodeKind, child: NodeKind) -> bool {
    match parent {
        NodeKind::Document | NodeKind::Blockquote | NodeKind::ListItem => child.is_block(),
        NodeKind::BulletList | NodeKind::OrderedList => child == NodeKind::ListItem,
        NodeKind::Paragraph | NodeKind::Heading => child.is_inline(),
        NodeKind::CodeBlock => child == NodeKind::Text,
        NodeKind::Image | NodeKind::Text | NodeKind::HardBreak => false,
    }
}

/// Validate a whole tree. The root must be a document node.
pub fn validate(root: &DocumentNode) -> Result<()> {
    if root.kind() != NodeKind::Document {
        return Err(Error::malformed(
            "$",
            format!("root must be \"doc\", found \"{}\"", root.kind().as_str()),
        ));
    }
    validate_children(root, "$")
}

fn validate_children(node: &DocumentNode, path: &str) -> Result<()> {
    let parent = node.kind();
    for (i, child) in node.content().iter().enumerate() {
        let child_path = format!("{}.content[{}]", path, i);
        if !accepts(parent, child.kind()) {
            return Err(Error::malformed(
                child_path,
                format!(
                    "\"{}\" is not allowed inside \"{}\"",
                    child.kind().as_str(),
                    parent.as_str()
                ),
            ));
        }
        validate_node(parent, child, &child_path)?;
        validate_children(child, &child_path)?;
    }
    Ok(())
}

fn validate_node(parent: NodeKind, node: &DocumentNode, path: &str) -> Result<()> {
    match node {
        DocumentNode::Text { text, marks } => {
            if text.is_empty() {
                return Err(Error::malformed(path, "text nodes must not be empty"));
            }
            if parent == NodeKind::CodeBlock && !marks.is_empty() {
                return Err(Error::malformed(path, "code block text cannot carry marks"));
            }
            for (i, mark) in marks.iter().enumerate() {
                if let Mark::Link { href, .. } = mark {
                    if href.trim().is_empty() {
                        return Err(Error::malformed(
                            format!("{}.marks[{}]", path, i),
                            "link requires \"href\"",
                        ));
                    }
                }
            }
        }
        DocumentNode::Image { src, .. } if src.trim().is_empty() => {
            return Err(Error::malformed(path, "image requires a non-empty \"src\""));
        }
        DocumentNode::OrderedList { start: 0, .. } => {
            return Err(Error::malformed(path, "ordered list \"start\" must be positive"));
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    #[test]
    fn test_valid_document() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(HeadingLevel::H2, vec![DocumentNode::text("Intro")]),
            DocumentNode::blockquote(vec![DocumentNode::paragraph(vec![
                DocumentNode::marked("quoted", [Mark::Italic]),
            ])]),
            DocumentNode::ordered_list(vec![DocumentNode::list_item(vec![
                DocumentNode::paragraph(vec![DocumentNode::text("one")]),
                DocumentNode::image("https://cdn.test/a.png", None),
            ])]),
            DocumentNode::code_block(Some("rust"), "fn main() {}"),
        ]);
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn test_root_must_be_document() {
        let err = validate(&DocumentNode::paragraph(Vec::new())).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_nested_document_rejected() {
        let doc = DocumentNode::doc(vec![DocumentNode::empty_document()]);
        let err = validate(&doc).unwrap_err();
        assert!(err.to_string().contains("$.content[0]"));
    }

    #[test]
    fn test_list_children_must_be_items() {
        let doc = DocumentNode::doc(vec![DocumentNode::bullet_list(vec![
            DocumentNode::paragraph(vec![DocumentNode::text("loose")]),
        ])]);
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_list_item_children_must_be_blocks() {
        let doc = DocumentNode::doc(vec![DocumentNode::bullet_list(vec![
            DocumentNode::list_item(vec![DocumentNode::text("inline")]),
        ])]);
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_marked_code_rejected() {
        let doc = DocumentNode::doc(vec![DocumentNode::CodeBlock {
            language: None,
            content: vec![DocumentNode::marked("x", [Mark::Bold])],
        }]);
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_empty_text_rejected() {
        let doc = DocumentNode::doc(vec![DocumentNode::paragraph(vec![DocumentNode::text("")])]);
        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_blank_link_href_rejected() {
        for href in ["", "   ", "\t"] {
            let doc = DocumentNode::doc(vec![DocumentNode::paragraph(vec![
                DocumentNode::text("see "),
                DocumentNode::marked("x", [Mark::Bold, Mark::link(href)]),
            ])]);
            let err = validate(&doc).unwrap_err();
            assert!(err.to_string().contains("$.content[0].content[1].marks[1]"));
            assert!(err.to_string().contains("link requires"));
        }
    }
}
