//! Character-offset spans.
//!
//! Every position handled by `endtag-core` is a character offset (Unicode scalar values) from the
//! start of the snapshot it was computed against. Spans are half-open: `start..end`.

use std::fmt;
use std::ops::Range;

/// A half-open character-offset range (`start..end`) in a text snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextSpan {
    /// Range start offset (inclusive).
    pub start: usize,
    /// Range end offset (exclusive).
    pub end: usize,
}

impl TextSpan {
    /// Create a new span. `end` is clamped so that `start <= end` always holds.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Create a span from a start offset and a length.
    pub fn with_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    /// Number of characters covered by the span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if the span contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if `other` lies entirely inside this span.
    pub fn contains_span(&self, other: TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if two spans overlap.
    ///
    /// An empty span overlaps a span that strictly contains its position.
    pub fn overlaps(&self, other: TextSpan) -> bool {
        if other.is_empty() {
            return self.start < other.start && other.start < self.end;
        }
        self.start < other.end && other.start < self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(&self, other: TextSpan) -> TextSpan {
        TextSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The smallest span covering every span in `spans`, or `None` if there are none.
    pub fn cover_all<I>(spans: I) -> Option<TextSpan>
    where
        I: IntoIterator<Item = TextSpan>,
    {
        spans.into_iter().reduce(|acc, span| acc.cover(span))
    }

    /// Convert into a standard range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
