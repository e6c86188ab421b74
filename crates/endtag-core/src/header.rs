//! Header resolution.
//!
//! Given a closing brace, find the text that introduces its block: the `if (x)` of an if
//! statement, the signature of a method, `else if (y)` of a chained conditional, the parameter
//! list and arrow of a lambda. The search only walks the host's containment relation; it never
//! re-derives structure itself.

use crate::classification::{ClassificationKind, ClassificationSpan, ClassificationStream};
use crate::navigator::StructureNavigator;
use crate::snapshot::TextSnapshot;
use crate::span::TextSpan;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Default bound on outward navigator steps per closing brace.
pub const DEFAULT_MAX_WALK_STEPS: usize = 256;

/// The resolved header of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    /// Normalised, single-line header text.
    pub text: String,
    /// Raw header range in the snapshot, from the header start up to the opening brace.
    pub span: TextSpan,
    /// Range of the opening brace.
    pub open_brace: TextSpan,
}

/// Marker returned when the resolver observed its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Resolves block headers over the host services of one snapshot.
pub struct HeaderResolver<'a> {
    snapshot: &'a dyn TextSnapshot,
    classifier: &'a dyn ClassificationStream,
    navigator: &'a dyn StructureNavigator,
    max_walk_steps: usize,
}

impl<'a> HeaderResolver<'a> {
    /// Create a resolver with the default walk bound.
    pub fn new(
        snapshot: &'a dyn TextSnapshot,
        classifier: &'a dyn ClassificationStream,
        navigator: &'a dyn StructureNavigator,
    ) -> Self {
        Self {
            snapshot,
            classifier,
            navigator,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
        }
    }

    /// Bound the outward walk. A walk that exceeds the bound finds no header.
    pub fn with_max_walk_steps(mut self, steps: usize) -> Self {
        self.max_walk_steps = steps.max(1);
        self
    }

    /// Resolve the header for the closing brace at `close_brace`.
    ///
    /// `Ok(None)` means this brace gets no end tag; `Err(Cancelled)` aborts the whole pass.
    pub fn resolve(
        &self,
        close_brace: TextSpan,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedHeader>, Cancelled> {
        check(cancel)?;
        let Some(block) = self.navigator.enclosing_span(close_brace) else {
            trace!(target: "endtag.header", %close_brace, "no_enclosing_span");
            return Ok(None);
        };
        if !block.contains_span(close_brace) {
            trace!(target: "endtag.header", %close_brace, %block, "enclosing_span_does_not_contain_brace");
            return Ok(None);
        }
        if block.end != close_brace.end {
            // A stray brace: the innermost structure is not closed by it.
            trace!(target: "endtag.header", %close_brace, %block, "enclosing_span_not_closed_by_brace");
            return Ok(None);
        }

        check(cancel)?;
        let Some(open_brace) = self.find_open_brace(block, close_brace) else {
            trace!(target: "endtag.header", %close_brace, %block, "no_open_brace");
            return Ok(None);
        };

        let mut current = block;
        if block.start >= open_brace.start {
            // The block starts at its own brace: walk outward until a span starts with a
            // headline token.
            let Some(found) = self.walk_to_headline(block, open_brace, cancel)? else {
                return Ok(None);
            };
            current = found;
        }

        let mut header_span = TextSpan::new(current.start, open_brace.start);
        let mut raw = self.snapshot.text(header_span);

        if starts_with_word(&raw, "if") {
            check(cancel)?;
            if let Some(wider) = self.else_clause(current, open_brace) {
                header_span = wider;
                raw = self.snapshot.text(wider);
            }
        }

        let comments = self.comment_spans(header_span);
        let text = normalize_header(&raw, header_span.start, &comments);
        if text.is_empty() || self.has_unclosed_brace(header_span) {
            trace!(target: "endtag.header", %close_brace, header = %text, "header_rejected");
            return Ok(None);
        }

        Ok(Some(ResolvedHeader {
            text,
            span: header_span,
            open_brace,
        }))
    }

    /// Outward walk from `block` for a span whose first token is not punctuation, or whose
    /// header contains a lambda arrow.
    fn walk_to_headline(
        &self,
        block: TextSpan,
        open_brace: TextSpan,
        cancel: &CancellationToken,
    ) -> Result<Option<TextSpan>, Cancelled> {
        let mut current = block;
        for _ in 0..self.max_walk_steps {
            check(cancel)?;
            let Some(next) = self.navigator.enclosing_span(current) else {
                return Ok(None);
            };
            if !next.contains_span(current) || next == current {
                trace!(target: "endtag.header", %current, %next, "navigator_did_not_grow");
                return Ok(None);
            }
            current = next;
            if current.start >= open_brace.start {
                continue;
            }

            check(cancel)?;
            let tokens = self
                .classifier
                .classify(TextSpan::new(current.start, open_brace.start));
            let mut significant = tokens
                .iter()
                .filter(|t| t.kind != ClassificationKind::Comment && t.span.start >= current.start);
            match significant.next() {
                Some(first) if !first.kind.is_punctuation() => return Ok(Some(current)),
                Some(_) => {}
                None => continue,
            }

            let arrow = tokens
                .iter()
                .find(|t| t.kind == ClassificationKind::Operator)
                .is_some_and(|op| self.snapshot.text(op.span) == "=>");
            if arrow {
                return Ok(Some(current));
            }
        }

        trace!(target: "endtag.header", %block, steps = self.max_walk_steps, "walk_bound_exceeded");
        Ok(None)
    }

    /// The `else` clause directly around an `if` statement, as a header range.
    fn else_clause(&self, if_span: TextSpan, open_brace: TextSpan) -> Option<TextSpan> {
        let outer = self.navigator.enclosing_span(if_span)?;
        if outer.start >= if_span.start {
            return None;
        }
        let wider = TextSpan::new(outer.start, open_brace.start);
        if self.leading_kind(wider) != Some(ClassificationKind::Keyword) {
            return None;
        }
        starts_with_word(&self.snapshot.text(wider), "else").then_some(wider)
    }

    /// The first `{` punctuation inside `block` before the closing brace.
    fn find_open_brace(&self, block: TextSpan, close_brace: TextSpan) -> Option<TextSpan> {
        let range = TextSpan::new(block.start, close_brace.start);
        let tokens = self.classifier.classify(range);
        tokens
            .iter()
            .filter(|t| t.kind.is_punctuation() && t.span.start >= block.start)
            .find_map(|t| {
                let text = self.snapshot.text(t.span);
                text.char_indices()
                    .position(|(_, c)| c == '{')
                    .map(|i| TextSpan::with_len(t.span.start + i, 1))
            })
    }

    fn leading_kind(&self, span: TextSpan) -> Option<ClassificationKind> {
        self.classifier
            .classify(span)
            .into_iter()
            .find(|t| t.span.start >= span.start && t.kind != ClassificationKind::Comment)
            .map(|t| t.kind)
    }

    /// Whether a `{` punctuation token in `span` stays open at its end. Braces inside strings
    /// and comments are not punctuation and do not count.
    fn has_unclosed_brace(&self, span: TextSpan) -> bool {
        let mut depth = 0usize;
        let tokens = self.classifier.classify(span);
        for token in tokens
            .iter()
            .filter(|t| t.kind.is_punctuation() && span.contains_span(t.span))
        {
            for c in self.snapshot.text(token.span).chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
        depth > 0
    }

    fn comment_spans(&self, span: TextSpan) -> Vec<ClassificationSpan> {
        self.classifier
            .classify(span)
            .into_iter()
            .filter(|t| t.kind == ClassificationKind::Comment)
            .collect()
    }
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.trim_start()
        .strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

fn check(cancel: &CancellationToken) -> Result<(), Cancelled> {
    if cancel.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

/// Turn raw header text into its single-line display form.
///
/// Comment tokens are removed, leading attribute lists (`[Attr]`) are dropped, and whitespace
/// runs collapse to one space.
pub fn normalize_header(raw: &str, raw_start: usize, comments: &[ClassificationSpan]) -> String {
    let mut kept = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        let offset = raw_start + i;
        if comments.iter().any(|t| t.span.contains(offset)) {
            kept.push(' ');
        } else {
            kept.push(c);
        }
    }

    let mut collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    while collapsed.starts_with('[') {
        let Some(end) = matching_bracket(&collapsed) else {
            break;
        };
        collapsed = collapsed[end + 1..].trim_start().to_string();
    }
    collapsed
}

fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
