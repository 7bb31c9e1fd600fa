//! Markdown importer for generated and hand-written posts.
//!
//! Covers the subset posts are written in: fenced code blocks, ATX
//! headings, `> ` quotes, `-`/`*` and numbered lists, standalone images,
//! and inline links, code, bold and italic. Anything else is a paragraph.

use super::DocumentImporter;
use crate::error::Result;
use crate::model::{DocumentNode, HeadingLevel, Mark};
use regex::Regex;
use std::sync::OnceLock;

/// Markdown import options.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Fewest `#` accepted as a heading
    pub min_heading_hashes: u8,

    /// Most `#` accepted as a heading; deeper headings stay paragraphs
    pub max_heading_hashes: u8,

    /// Shift accepted headings so the shallowest maps to level 1
    pub normalize_levels: bool,

    /// Target stored on imported links
    pub link_target: Option<String>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            min_heading_hashes: 2,
            max_heading_hashes: 3,
            normalize_levels: false,
            link_target: Some("_blank".to_string()),
        }
    }
}

impl MarkdownOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `min..=max` hashes as headings.
    pub fn with_heading_hashes(mut self, min: u8, max: u8) -> Self {
        self.min_heading_hashes = min.max(1);
        self.max_heading_hashes = max.max(self.min_heading_hashes);
        self
    }

    /// Map the shallowest accepted heading to level 1.
    pub fn with_normalized_levels(mut self, normalize: bool) -> Self {
        self.normalize_levels = normalize;
        self
    }

    /// Set the target stored on imported links.
    pub fn with_link_target(mut self, target: Option<&str>) -> Self {
        self.link_target = target.map(str::to_string);
        self
    }

    fn heading_level(&self, hashes: usize) -> Option<HeadingLevel> {
        let hashes = u8::try_from(hashes).ok()?;
        if hashes < self.min_heading_hashes || hashes > self.max_heading_hashes {
            return None;
        }
        let level = if self.normalize_levels {
            hashes - self.min_heading_hashes + 1
        } else {
            hashes
        };
        HeadingLevel::new(level)
    }
}

struct Patterns {
    heading: Regex,
    bullet: Regex,
    ordered: Regex,
    image: Regex,
    link: Regex,
    code: Regex,
    bold: Regex,
    italic: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            heading: Regex::new(r"^(#{1,6})\s+(.+?)(?:\s+#+)?\s*$").unwrap(),
            bullet: Regex::new(r"^\s*[-*]\s+").unwrap(),
            ordered: Regex::new(r"^\s*(\d+)\.\s+").unwrap(),
            image: Regex::new(r#"^!\[([^\]]*)\]\(([^)\s]+)(?:\s+"([^"]*)")?\)$"#).unwrap(),
            link: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap(),
            code: Regex::new(r"`([^`]+)`").unwrap(),
            bold: Regex::new(r"\*\*([^*]+)\*\*").unwrap(),
            italic: Regex::new(r"\*([^*]+)\*").unwrap(),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

/// Markdown importer.
#[derive(Debug, Clone, Default)]
pub struct MarkdownImporter {
    options: MarkdownOptions,
}

impl MarkdownImporter {
    /// Create an importer with the given options.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Parse markdown into a document tree.
    pub fn parse(&self, text: &str) -> DocumentNode {
        let p = patterns();
        let lines: Vec<&str> = text.trim().lines().collect();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if let Some(fence) = trimmed.strip_prefix("```") {
                let language = fence.trim_start_matches('`').trim();
                let start = i + 1;
                let mut end = start;
                while end < lines.len() && !lines[end].trim().starts_with("```") {
                    end += 1;
                }
                let code = lines[start..end].join("\n");
                blocks.push(DocumentNode::code_block(
                    (!language.is_empty()).then_some(language),
                    &code,
                ));
                i = end + 1;
                continue;
            }

            if trimmed.is_empty() {
                i += 1;
                continue;
            }

            if let Some(caps) = p.heading.captures(line) {
                if let Some(level) = self.options.heading_level(caps[1].len()) {
                    blocks.push(DocumentNode::heading(level, self.parse_inline(&caps[2])));
                    i += 1;
                    continue;
                }
            }

            if let Some(caps) = p.image.captures(trimmed) {
                let alt = caps.get(1).map(|m| m.as_str()).filter(|alt| !alt.is_empty());
                blocks.push(DocumentNode::Image {
                    src: caps[2].to_string(),
                    alt: alt.map(str::to_string),
                    title: caps.get(3).map(|m| m.as_str().to_string()),
                });
                i += 1;
                continue;
            }

            if trimmed.starts_with("> ") || trimmed == ">" {
                let mut paragraphs = Vec::new();
                while i < lines.len() {
                    let quoted = lines[i].trim();
                    let Some(rest) = quoted.strip_prefix('>') else {
                        break;
                    };
                    let rest = rest.trim();
                    if !rest.is_empty() {
                        paragraphs.push(DocumentNode::paragraph(self.parse_inline(rest)));
                    }
                    i += 1;
                }
                if !paragraphs.is_empty() {
                    blocks.push(DocumentNode::blockquote(paragraphs));
                }
                continue;
            }

            if p.bullet.is_match(line) {
                let mut items = Vec::new();
                while i < lines.len() && p.bullet.is_match(lines[i]) {
                    let item = p.bullet.replace(lines[i], "");
                    items.push(self.list_item(&item));
                    i += 1;
                }
                blocks.push(DocumentNode::bullet_list(items));
                continue;
            }

            if let Some(caps) = p.ordered.captures(line) {
                let start = caps[1].parse::<u32>().unwrap_or(1).max(1);
                let mut items = Vec::new();
                while i < lines.len() && p.ordered.is_match(lines[i]) {
                    let item = p.ordered.replace(lines[i], "");
                    items.push(self.list_item(&item));
                    i += 1;
                }
                blocks.push(DocumentNode::OrderedList {
                    start,
                    content: items,
                });
                continue;
            }

            blocks.push(DocumentNode::paragraph(self.parse_inline(trimmed)));
            i += 1;
        }

        if blocks.is_empty() {
            return DocumentNode::empty_document();
        }
        DocumentNode::doc(blocks)
    }

    fn list_item(&self, text: &str) -> DocumentNode {
        DocumentNode::list_item(vec![DocumentNode::paragraph(self.parse_inline(text.trim()))])
    }

    /// Parse inline markup: links first, then code, bold and italic inside
    /// the remaining plain segments.
    fn parse_inline(&self, text: &str) -> Vec<DocumentNode> {
        let p = patterns();
        let mut nodes = Vec::new();
        let mut last = 0;

        for caps in p.link.captures_iter(text) {
            let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            push_emphasis(&mut nodes, &text[last..whole.start()]);
            let href = href.as_str().trim();
            if href.is_empty() {
                // `[label]( )` has no target; keep the label as text.
                push_emphasis(&mut nodes, label.as_str());
            } else {
                let link = Mark::Link {
                    href: href.to_string(),
                    target: self.options.link_target.clone(),
                };
                nodes.push(DocumentNode::marked(label.as_str(), [link]));
            }
            last = whole.end();
        }
        push_emphasis(&mut nodes, &text[last..]);
        nodes
    }
}

fn push_emphasis(nodes: &mut Vec<DocumentNode>, text: &str) {
    let p = patterns();
    push_marked(
        nodes,
        text,
        &[(&p.code, Mark::Code), (&p.bold, Mark::Bold), (&p.italic, Mark::Italic)],
    );
}

fn push_marked(nodes: &mut Vec<DocumentNode>, text: &str, rules: &[(&Regex, Mark)]) {
    if text.is_empty() {
        return;
    }
    let Some(((pattern, mark), rest)) = rules.split_first() else {
        nodes.push(DocumentNode::text(text));
        return;
    };

    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_marked(nodes, &text[last..whole.start()], rest);
        nodes.push(DocumentNode::marked(inner.as_str(), [mark.clone()]));
        last = whole.end();
    }
    push_marked(nodes, &text[last..], rest);
}

impl DocumentImporter for MarkdownImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn import_str(&self, text: &str) -> Result<DocumentNode> {
        Ok(self.parse(text))
    }
}
