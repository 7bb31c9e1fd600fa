//! Conversion between the live document tree and its stored form.
//!
//! The stored form is the JSON tree the editor persists for each post:
//! every node is an object with a `type` tag, optional `attrs`, optional
//! `content` and, for text, `text` plus optional `marks`. Empty arrays and
//! absent optional attributes are omitted on output and accepted as absent
//! on input.

mod json;

pub use json::{from_json, to_json, JsonFormat};

use crate::error::{Error, Result};
use crate::model::{schema, DocumentNode, HeadingLevel, Mark, MarkKind, MarkSet, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Text shown when stored content cannot be decoded.
pub const PLACEHOLDER_TEXT: &str = "This content could not be loaded.";

/// The serialized, storage-safe form of a document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredDocument(Value);

impl StoredDocument {
    /// Wrap a raw JSON value. The value is not validated until it is
    /// deserialized or rendered.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The stored form of a new, empty post.
    pub fn empty() -> Self {
        serialize(&DocumentNode::empty_document())
    }

    /// Borrow the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for StoredDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Serialize a document tree into its stored form.
///
/// Output is deterministic: object keys are emitted in sorted order and
/// children keep their order.
pub fn serialize(node: &DocumentNode) -> StoredDocument {
    StoredDocument(node_to_value(node))
}

/// Deserialize a stored document into a validated tree.
///
/// Fails with [`Error::MalformedDocument`] on unknown node or mark types,
/// missing or invalid required attributes, and schema violations.
pub fn deserialize(doc: &StoredDocument) -> Result<DocumentNode> {
    let root = value_to_node(&doc.0, "$")?;
    schema::validate(&root)?;
    Ok(root)
}

/// Deserialize, substituting a single placeholder paragraph for content
/// that cannot be decoded.
pub fn deserialize_or_placeholder(doc: &StoredDocument) -> DocumentNode {
    match deserialize(doc) {
        Ok(node) => node,
        Err(e) => {
            log::warn!("Substituting placeholder for undecodable document: {}", e);
            DocumentNode::placeholder(PLACEHOLDER_TEXT)
        }
    }
}

fn node_to_value(node: &DocumentNode) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), Value::from(node.kind().as_str()));

    let mut attrs = Map::new();
    match node {
        DocumentNode::Heading { level, .. } => {
            attrs.insert("level".into(), Value::from(level.get()));
        }
        DocumentNode::OrderedList { start, .. } => {
            attrs.insert("start".into(), Value::from(*start));
        }
        DocumentNode::CodeBlock {
            language: Some(language),
            ..
        } => {
            attrs.insert("language".into(), Value::from(language.as_str()));
        }
        DocumentNode::Image { src, alt, title } => {
            attrs.insert("src".into(), Value::from(src.as_str()));
            if let Some(alt) = alt {
                attrs.insert("alt".into(), Value::from(alt.as_str()));
            }
            if let Some(title) = title {
                attrs.insert("title".into(), Value::from(title.as_str()));
            }
        }
        DocumentNode::Text { text, marks } => {
            obj.insert("text".into(), Value::from(text.as_str()));
            if !marks.is_empty() {
                let marks = marks.iter().map(mark_to_value).collect();
                obj.insert("marks".into(), Value::Array(marks));
            }
        }
        _ => {}
    }
    if !attrs.is_empty() {
        obj.insert("attrs".into(), Value::Object(attrs));
    }

    let content = node.content();
    if !content.is_empty() {
        let children = content.iter().map(node_to_value).collect();
        obj.insert("content".into(), Value::Array(children));
    }

    Value::Object(obj)
}

fn mark_to_value(mark: &Mark) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), Value::from(mark.kind().as_str()));
    if let Mark::Link { href, target } = mark {
        let mut attrs = Map::new();
        attrs.insert("href".into(), Value::from(href.as_str()));
        if let Some(target) = target {
            attrs.insert("target".into(), Value::from(target.as_str()));
        }
        obj.insert("attrs".into(), Value::Object(attrs));
    }
    Value::Object(obj)
}

fn value_to_node(value: &Value, path: &str) -> Result<DocumentNode> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::malformed(path, "expected a node object"))?;

    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed(path, "missing node \"type\""))?;
    let kind = NodeKind::parse(tag)
        .ok_or_else(|| Error::malformed(path, format!("unknown node type \"{}\"", tag)))?;

    let empty = Map::new();
    let attrs = object_field(obj, "attrs", path)?.unwrap_or(&empty);

    let content = match obj.get("content") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            if kind.is_leaf() && !items.is_empty() {
                return Err(Error::malformed(
                    path,
                    format!("\"{}\" cannot have content", tag),
                ));
            }
            items
                .iter()
                .enumerate()
                .map(|(i, item)| value_to_node(item, &format!("{}.content[{}]", path, i)))
                .collect::<Result<Vec<_>>>()?
        }
        Some(_) => return Err(Error::malformed(path, "\"content\" must be an array")),
    };

    let node = match kind {
        NodeKind::Document => DocumentNode::Document { content },
        NodeKind::Paragraph => DocumentNode::Paragraph { content },
        NodeKind::Heading => {
            let level = attrs
                .get("level")
                .and_then(Value::as_u64)
                .and_then(|l| u8::try_from(l).ok())
                .and_then(HeadingLevel::new)
                .ok_or_else(|| {
                    Error::malformed(path, "heading requires \"level\" between 1 and 3")
                })?;
            DocumentNode::Heading { level, content }
        }
        NodeKind::BulletList => DocumentNode::BulletList { content },
        NodeKind::OrderedList => {
            let start = match attrs.get("start") {
                None | Some(Value::Null) => 1,
                Some(v) => v
                    .as_u64()
                    .and_then(|s| u32::try_from(s).ok())
                    .ok_or_else(|| {
                        Error::malformed(path, "ordered list \"start\" must be an integer")
                    })?,
            };
            DocumentNode::OrderedList { start, content }
        }
        NodeKind::ListItem => DocumentNode::ListItem { content },
        NodeKind::Blockquote => DocumentNode::Blockquote { content },
        NodeKind::CodeBlock => DocumentNode::CodeBlock {
            language: optional_string(attrs, "language", path)?,
            content,
        },
        NodeKind::Image => {
            let src = optional_string(attrs, "src", path)?
                .ok_or_else(|| Error::malformed(path, "image requires \"src\""))?;
            DocumentNode::Image {
                src,
                alt: optional_string(attrs, "alt", path)?,
                title: optional_string(attrs, "title", path)?,
            }
        }
        NodeKind::Text => {
            let text = obj
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::malformed(path, "text node requires \"text\""))?;
            DocumentNode::Text {
                text: text.to_string(),
                marks: marks_from_value(obj.get("marks"), path)?,
            }
        }
        NodeKind::HardBreak => DocumentNode::HardBreak,
    };

    Ok(node)
}

fn marks_from_value(value: Option<&Value>, path: &str) -> Result<MarkSet> {
    let items = match value {
        None | Some(Value::Null) => return Ok(MarkSet::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::malformed(path, "\"marks\" must be an array")),
    };

    let mut marks = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let mark_path = format!("{}.marks[{}]", path, i);
        let obj = item
            .as_object()
            .ok_or_else(|| Error::malformed(&mark_path, "expected a mark object"))?;
        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed(&mark_path, "missing mark \"type\""))?;
        let kind = MarkKind::parse(tag).ok_or_else(|| {
            Error::malformed(&mark_path, format!("unknown mark type \"{}\"", tag))
        })?;

        let mark = match kind {
            MarkKind::Bold => Mark::Bold,
            MarkKind::Italic => Mark::Italic,
            MarkKind::Code => Mark::Code,
            MarkKind::Link => {
                let empty = Map::new();
                let attrs = object_field(obj, "attrs", &mark_path)?.unwrap_or(&empty);
                let href = optional_string(attrs, "href", &mark_path)?
                    .filter(|h| !h.trim().is_empty())
                    .ok_or_else(|| Error::malformed(&mark_path, "link requires \"href\""))?;
                Mark::Link {
                    href,
                    target: optional_string(attrs, "target", &mark_path)?,
                }
            }
        };
        marks.push(mark);
    }

    MarkSet::try_from_marks(marks).map_err(|kind| {
        Error::malformed(
            path,
            format!("duplicate \"{}\" mark on one text node", kind.as_str()),
        )
    })
}

fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(Error::malformed(
            path,
            format!("\"{}\" must be an object", key),
        )),
    }
}

fn optional_string(attrs: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::malformed(
            path,
            format!("attribute \"{}\" must be a string", key),
        )),
    }
}
