//! Editor addressing.

/// A point inside a textblock.
///
/// `path` holds child indices from the document root to a paragraph,
/// heading or code block; `offset` counts characters of its inline content,
/// with a hard break counting as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Child-index path to the textblock
    pub path: Vec<usize>,
    /// Character offset into the textblock
    pub offset: usize,
}

impl Position {
    /// Create a position.
    pub fn new(path: impl Into<Vec<usize>>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// An ordered pair of positions. A collapsed range is a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    start: Position,
    end: Position,
}

impl Range {
    /// Create a range between two positions, in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// Create a collapsed range.
    pub fn cursor(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    /// Range covering `from..to` within a single textblock.
    pub fn within(path: impl Into<Vec<usize>>, from: usize, to: usize) -> Self {
        let path = path.into();
        Self::new(Position::new(path.clone(), from), Position::new(path, to))
    }

    /// The earlier endpoint.
    pub fn start(&self) -> &Position {
        &self.start
    }

    /// The later endpoint.
    pub fn end(&self) -> &Position {
        &self.end
    }

    /// Check whether the range is a cursor.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn map_paths(&self, f: impl Fn(&[usize]) -> Vec<usize>) -> Self {
        Self {
            start: Position::new(f(&self.start.path), self.start.offset),
            end: Position::new(f(&self.end.path), self.end.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        assert!(Position::new([0], 5) < Position::new([1], 0));
        assert!(Position::new([2, 0, 0], 0) < Position::new([2, 1, 0], 0));
        assert!(Position::new([1], 2) < Position::new([1], 3));
    }

    #[test]
    fn test_range_orders_endpoints() {
        let range = Range::new(Position::new([3], 1), Position::new([0], 4));
        assert_eq!(range.start().path, vec![0]);
        assert_eq!(range.end().offset, 1);
        assert!(!range.is_collapsed());
        assert!(Range::cursor(Position::new([0], 0)).is_collapsed());
    }
}
