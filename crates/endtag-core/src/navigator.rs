//! Structural navigation.
//!
//! The host knows the lexical/syntactic structure of the document; the end-tag engine only asks
//! "what is the next span enclosing this one?" and searches over the answers.

use crate::span::TextSpan;

/// Host service returning enclosing structural spans.
pub trait StructureNavigator: Send + Sync {
    /// The smallest structural span that contains `span` and is not equal to it.
    ///
    /// Returns `None` when `span` is (or covers) the outermost structure.
    fn enclosing_span(&self, span: TextSpan) -> Option<TextSpan>;
}

/// A [`StructureNavigator`] over an explicit set of nested spans.
///
/// Hosts that already expose an outline, a folding tree, or a syntax tree can flatten it into
/// spans and wrap it here. The spans are expected to nest properly; for overlapping spans the
/// answer is the containing span with the greatest start.
#[derive(Debug, Clone, Default)]
pub struct NestedSpanNavigator {
    /// Sorted by `(start asc, end desc)`, deduplicated.
    spans: Vec<TextSpan>,
    /// `prefix_max_end[i] = max(spans[0..=i].end)`.
    prefix_max_end: Vec<usize>,
}

impl NestedSpanNavigator {
    /// Build a navigator from spans in any order. Empty spans are dropped.
    pub fn new(mut spans: Vec<TextSpan>) -> Self {
        spans.retain(|s| !s.is_empty());
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        spans.dedup();

        let mut prefix_max_end = Vec::with_capacity(spans.len());
        let mut max_end = 0;
        for s in &spans {
            max_end = max_end.max(s.end);
            prefix_max_end.push(max_end);
        }

        Self {
            spans,
            prefix_max_end,
        }
    }

    /// Number of structural spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there is no structure at all.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// All structural spans, sorted by start (outer before inner on ties).
    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }
}

impl StructureNavigator for NestedSpanNavigator {
    fn enclosing_span(&self, span: TextSpan) -> Option<TextSpan> {
        let upper = self.spans.partition_point(|s| s.start <= span.start);

        // Walking backward visits candidates with decreasing start, inner before outer on ties,
        // so the first containing span is the innermost one.
        for i in (0..upper).rev() {
            if self.prefix_max_end[i] < span.end {
                break;
            }
            let candidate = self.spans[i];
            if candidate != span && candidate.contains_span(span) {
                return Some(candidate);
            }
        }
        None
    }
}
