//! Derived metadata: table of contents and reading time.
//!
//! Metadata can be computed from rendered markup or directly from a live
//! document tree. Both paths flatten text the same way and share the
//! renderer's [`Slugger`], so for any document
//! `extract_metadata(&render(d).markup).headings == render(d).headings`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::DocumentNode;
use crate::render::escape::decode_entities;
use crate::render::HeadingEntry;
use crate::slug::{SlugPolicy, Slugger};

/// Reading speed assumed for the read-time estimate.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Options for metadata extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataOptions {
    /// Reading speed in words per minute (values below 1 are treated as 1)
    pub words_per_minute: u32,

    /// Heading anchor collision policy; must match the renderer's
    pub slug_policy: SlugPolicy,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            slug_policy: SlugPolicy::default(),
        }
    }
}

/// Metadata derived from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Headings in document order
    pub headings: Vec<HeadingEntry>,

    /// Whitespace-separated words of visible text
    pub word_count: u32,

    /// Estimated reading time, at least one minute
    pub estimated_read_minutes: u32,
}

struct MarkupScanner {
    heading: Regex,
    line_break: Regex,
    block_tag: Regex,
    any_tag: Regex,
}

impl MarkupScanner {
    fn new() -> Self {
        Self {
            heading: Regex::new(r"(?is)<h([1-3])\b[^>]*>(.*?)</h[1-3]\s*>").unwrap(),
            line_break: Regex::new(r"(?i)<br\b[^>]*>").unwrap(),
            block_tag: Regex::new(
                r"(?i)</?(?:p|h[1-6]|ul|ol|li|blockquote|pre|br|img|div|hr)\b[^>]*>",
            )
            .unwrap(),
            any_tag: Regex::new(r"<[^>]*>").unwrap(),
        }
    }
}

fn scanner() -> &'static MarkupScanner {
    static SCANNER: OnceLock<MarkupScanner> = OnceLock::new();
    SCANNER.get_or_init(MarkupScanner::new)
}

/// Extract headings and reading time from rendered markup.
pub fn extract_metadata(markup: &str, options: &MetadataOptions) -> DocumentMetadata {
    let scanner = scanner();
    let mut slugger = Slugger::new(options.slug_policy);

    let headings = scanner
        .heading
        .captures_iter(markup)
        .map(|caps| {
            let level = caps[1].parse::<u8>().unwrap_or(1);
            let inner = scanner.line_break.replace_all(&caps[2], " ");
            let inner = scanner.any_tag.replace_all(&inner, "");
            let text = collapse_whitespace(&decode_entities(&inner));
            HeadingEntry {
                id: slugger.anchor_for(&text),
                text,
                level,
            }
        })
        .collect();

    let word_count = count_words(&markup_to_text(markup));
    DocumentMetadata {
        headings,
        word_count,
        estimated_read_minutes: reading_minutes(word_count, options.words_per_minute),
    }
}

/// Compute the same metadata directly from a live document tree.
pub fn extract_metadata_from_tree(root: &DocumentNode, options: &MetadataOptions) -> DocumentMetadata {
    let mut slugger = Slugger::new(options.slug_policy);

    let headings = root
        .descendants()
        .filter_map(|node| match node {
            DocumentNode::Heading { level, .. } => {
                let text = collapse_whitespace(&node.text_content());
                Some(HeadingEntry {
                    id: slugger.anchor_for(&text),
                    text,
                    level: level.get(),
                })
            }
            _ => None,
        })
        .collect();

    let word_count = count_words(&tree_to_text(root));
    DocumentMetadata {
        headings,
        word_count,
        estimated_read_minutes: reading_minutes(word_count, options.words_per_minute),
    }
}

/// Visible text of markup: block-level tags become whitespace, other tags
/// are removed and entities are decoded.
pub fn markup_to_text(markup: &str) -> String {
    let scanner = scanner();
    let spaced = scanner.block_tag.replace_all(markup, " ");
    let stripped = scanner.any_tag.replace_all(&spaced, "");
    decode_entities(&stripped)
}

/// Count whitespace-separated tokens.
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Reading time in whole minutes, rounded to nearest, never below one.
pub fn reading_minutes(words: u32, words_per_minute: u32) -> u32 {
    let wpm = u64::from(words_per_minute.max(1));
    let minutes = (u64::from(words) * 2 + wpm) / (wpm * 2);
    (minutes as u32).max(1)
}

/// Visible text of a tree, with blocks and hard breaks separated by spaces.
pub(crate) fn tree_to_text(root: &DocumentNode) -> String {
    let mut out = String::new();
    collect_words(root, &mut out);
    out
}

fn collect_words(node: &DocumentNode, out: &mut String) {
    match node {
        DocumentNode::Text { text, .. } => out.push_str(text),
        DocumentNode::HardBreak | DocumentNode::Image { .. } => out.push(' '),
        _ => {
            out.push(' ');
            for child in node.content() {
                collect_words(child, out);
            }
            out.push(' ');
        }
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, Mark};

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(0, 200), 1);
        assert_eq!(reading_minutes(99, 200), 1);
        assert_eq!(reading_minutes(300, 200), 2);
        assert_eq!(reading_minutes(400, 200), 2);
        assert_eq!(reading_minutes(499, 200), 2);
        assert_eq!(reading_minutes(500, 200), 3);
        assert_eq!(reading_minutes(10, 0), 10);
    }

    #[test]
    fn test_markup_to_text() {
        let text = markup_to_text("<p>one<strong>two</strong></p><p>three&amp;four<br>five</p>");
        assert_eq!(count_words(&text), 3);
        assert!(text.contains("onetwo"));
        assert!(text.contains("three&four five"));
    }

    #[test]
    fn test_extract_headings_from_markup() {
        let markup = "<h1 id=\"introduction\">Introduction</h1><p>x</p>\
                      <h2 id=\"setup\">Setup</h2><h2 id=\"usage\">Usage</h2>";
        let meta = extract_metadata(markup, &MetadataOptions::default());
        let ids: Vec<_> = meta.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["introduction", "setup", "usage"]);
        assert_eq!(meta.headings[0].level, 1);
        assert_eq!(meta.headings[2].level, 2);
    }

    #[test]
    fn test_extract_heading_with_inline_markup() {
        let markup = "<h3 id=\"x\">Tom &amp; <em>Jerry</em><br>again</h3>";
        let meta = extract_metadata(markup, &MetadataOptions::default());
        assert_eq!(meta.headings[0].text, "Tom & Jerry again");
        assert_eq!(meta.headings[0].id, "tom-jerry-again");
    }

    #[test]
    fn test_h4_is_not_a_heading() {
        let meta = extract_metadata("<h4>Deep</h4><h2>Top</h2>", &MetadataOptions::default());
        assert_eq!(meta.headings.len(), 1);
        assert_eq!(meta.headings[0].text, "Top");
    }

    #[test]
    fn test_tree_variant() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(HeadingLevel::H2, vec![DocumentNode::text("Notes")]),
            DocumentNode::paragraph(vec![
                DocumentNode::text("alpha"),
                DocumentNode::marked("beta", [Mark::Bold]),
                DocumentNode::HardBreak,
                DocumentNode::text("gamma"),
            ]),
            DocumentNode::heading(HeadingLevel::H2, vec![DocumentNode::text("Notes")]),
        ]);
        let meta = extract_metadata_from_tree(&doc, &MetadataOptions::default());
        assert_eq!(meta.word_count, 4);
        assert_eq!(meta.estimated_read_minutes, 1);
        assert_eq!(meta.headings[0].id, "notes");
        assert_eq!(meta.headings[1].id, "notes-2");
    }

    #[test]
    fn test_preserve_policy_keeps_duplicates() {
        let options = MetadataOptions {
            slug_policy: SlugPolicy::Preserve,
            ..Default::default()
        };
        let meta = extract_metadata("<h2>FAQ</h2><h2>FAQ</h2>", &options);
        assert_eq!(meta.headings[0].id, meta.headings[1].id);
    }
}
