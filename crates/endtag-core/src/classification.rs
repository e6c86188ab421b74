//! Syntax classification spans.
//!
//! The host's syntax classifier labels lexical tokens (punctuation, keywords, operators, ...).
//! The end-tag engine only reads these labels; it never produces them.
//!
//! [`ClassificationIndex`] is the bundled [`ClassificationStream`]: a sorted vector with a
//! prefix-maximum of end offsets, so range queries stay at O(log n + k) even for files with
//! hundreds of thousands of tokens.

use crate::span::TextSpan;

/// Coarse classification label of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassificationKind {
    /// Braces, parentheses, separators.
    Punctuation,
    /// Language keywords (`if`, `class`, `public`, ...).
    Keyword,
    /// Operators (`=>`, `+`, `==`, ...).
    Operator,
    /// Identifiers.
    Identifier,
    /// Comments.
    Comment,
    /// String and character literals.
    String,
    /// Numeric literals.
    Number,
    /// Any other host-defined classification.
    Other(String),
}

impl ClassificationKind {
    /// Parse a host classification name (case-insensitive).
    ///
    /// Hosts commonly use names like `"punctuation"`, `"keyword"`, `"operator"`, or more specific
    /// ones such as `"comment - xml doc"`. A name with the word `comment` anywhere
    /// (`"XML Doc Comment - Text"`) is a comment; otherwise the leading word decides the kind.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let words: Vec<&str> = lower.split(|c: char| !c.is_ascii_alphanumeric()).collect();
        if words.contains(&"comment") {
            return Self::Comment;
        }
        match words.first().copied().unwrap_or_default() {
            "punctuation" => Self::Punctuation,
            "keyword" => Self::Keyword,
            "operator" => Self::Operator,
            "identifier" => Self::Identifier,
            "comment" => Self::Comment,
            "string" => Self::String,
            "number" => Self::Number,
            _ => Self::Other(lower),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &str {
        match self {
            Self::Punctuation => "punctuation",
            Self::Keyword => "keyword",
            Self::Operator => "operator",
            Self::Identifier => "identifier",
            Self::Comment => "comment",
            Self::String => "string",
            Self::Number => "number",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for punctuation tokens.
    pub fn is_punctuation(&self) -> bool {
        matches!(self, Self::Punctuation)
    }
}

/// A labelled token range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationSpan {
    /// Token range.
    pub span: TextSpan,
    /// Token classification.
    pub kind: ClassificationKind,
}

impl ClassificationSpan {
    /// Create a classification span from a start offset, a length and a kind.
    pub fn new(start: usize, len: usize, kind: ClassificationKind) -> Self {
        Self {
            span: TextSpan::with_len(start, len),
            kind,
        }
    }
}

/// Ordered classification spans over the current snapshot.
///
/// Implementations must be re-queryable for arbitrary sub-spans: the scan queries the whole
/// document once, and then queries small header ranges while resolving each closing brace.
pub trait ClassificationStream: Send + Sync {
    /// Every classification span overlapping `span`, in document order.
    fn classify(&self, span: TextSpan) -> Vec<ClassificationSpan>;
}

/// Sorted, range-queryable classification spans.
#[derive(Debug, Clone, Default)]
pub struct ClassificationIndex {
    /// Spans kept sorted by start offset.
    spans: Vec<ClassificationSpan>,
    /// `prefix_max_end[i] = max(spans[0..=i].end)`, used to prune backward scans.
    prefix_max_end: Vec<usize>,
}

impl ClassificationIndex {
    /// Build an index from spans in any order. Empty spans are dropped.
    pub fn new(mut spans: Vec<ClassificationSpan>) -> Self {
        spans.retain(|s| !s.span.is_empty());
        spans.sort_by_key(|s| (s.span.start, s.span.end));

        let mut prefix_max_end = Vec::with_capacity(spans.len());
        let mut max_end = 0;
        for s in &spans {
            max_end = max_end.max(s.span.end);
            prefix_max_end.push(max_end);
        }

        Self {
            spans,
            prefix_max_end,
        }
    }

    /// Number of indexed spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// All spans, sorted by start.
    pub fn spans(&self) -> &[ClassificationSpan] {
        &self.spans
    }

    /// Query all spans overlapping `[start, end)`.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&ClassificationSpan> {
        let (from, to) = self.query_bounds(start, end);
        self.spans[from..to]
            .iter()
            .filter(|s| s.span.start < end && s.span.end > start)
            .collect()
    }

    fn query_bounds(&self, start: usize, end: usize) -> (usize, usize) {
        if self.spans.is_empty() || start >= end {
            return (0, 0);
        }

        // First span whose start is >= end: nothing from there on can overlap.
        let search_end = self.spans.partition_point(|s| s.span.start < end);
        if search_end == 0 {
            return (0, 0);
        }

        // First span starting at/after `start`, then walk back while earlier spans may still
        // reach into the query range.
        let mut scan_start = self
            .spans
            .partition_point(|s| s.span.start < start)
            .min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        while scan_start < search_end && self.spans[scan_start].span.end <= start {
            scan_start += 1;
        }

        (scan_start, search_end)
    }
}

impl ClassificationStream for ClassificationIndex {
    fn classify(&self, span: TextSpan) -> Vec<ClassificationSpan> {
        self.query_range(span.start, span.end)
            .into_iter()
            .cloned()
            .collect()
    }
}
