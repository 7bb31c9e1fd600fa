//! Inline formatting marks.

/// An inline formatting attribute attached to a text run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Strong emphasis
    Bold,
    /// Emphasis
    Italic,
    /// Inline code
    Code,
    /// Hyperlink
    Link {
        /// Link target URL
        href: String,
        /// Browsing context (the editor stores `_blank`)
        target: Option<String>,
    },
}

impl Mark {
    /// Create a link mark without an explicit target.
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            href: href.into(),
            target: None,
        }
    }

    /// Get the kind of this mark.
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Code => MarkKind::Code,
            Mark::Link { .. } => MarkKind::Link,
        }
    }

    /// Get the link href if this is a link mark.
    pub fn href(&self) -> Option<&str> {
        match self {
            Mark::Link { href, .. } => Some(href),
            _ => None,
        }
    }
}

/// The kind of a mark, without its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkKind {
    /// `bold`
    Bold,
    /// `italic`
    Italic,
    /// `code`
    Code,
    /// `link`
    Link,
}

impl MarkKind {
    /// All mark kinds, in schema order.
    pub const ALL: [MarkKind; 4] = [
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Code,
        MarkKind::Link,
    ];

    /// The stored type tag of this mark kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Code => "code",
            MarkKind::Link => "link",
        }
    }

    /// Parse a stored type tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "bold" => Some(MarkKind::Bold),
            "italic" => Some(MarkKind::Italic),
            "code" => Some(MarkKind::Code),
            "link" => Some(MarkKind::Link),
            _ => None,
        }
    }
}

/// Insertion-ordered set of marks with at most one mark per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    /// Create an empty mark set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a mark set from marks in insertion order.
    ///
    /// Returns the offending kind if two marks share a kind.
    pub fn try_from_marks(marks: Vec<Mark>) -> std::result::Result<Self, MarkKind> {
        let mut set = Self::new();
        for mark in marks {
            let kind = mark.kind();
            if !set.insert(mark) {
                return Err(kind);
            }
        }
        Ok(set)
    }

    /// Append a mark. Returns `false` (and leaves the set unchanged) if a
    /// mark of the same kind is already present.
    pub fn insert(&mut self, mark: Mark) -> bool {
        if self.contains(mark.kind()) {
            return false;
        }
        self.0.push(mark);
        true
    }

    /// Replace any mark of the same kind, moving the new mark to the end.
    pub fn replace(&mut self, mark: Mark) {
        self.remove(mark.kind());
        self.0.push(mark);
    }

    /// Remove the mark of the given kind. Returns whether one was removed.
    pub fn remove(&mut self, kind: MarkKind) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m.kind() != kind);
        self.0.len() != before
    }

    /// Check whether a mark of the given kind is present.
    pub fn contains(&self, kind: MarkKind) -> bool {
        self.0.iter().any(|m| m.kind() == kind)
    }

    /// Get the mark of the given kind.
    pub fn get(&self, kind: MarkKind) -> Option<&Mark> {
        self.0.iter().find(|m| m.kind() == kind)
    }

    /// Iterate marks in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.0.iter()
    }

    /// Marks as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Mark] {
        &self.0
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set has no marks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
