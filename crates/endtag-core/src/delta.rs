//! Structured text change deltas and span translation.
//!
//! Regions are computed against one snapshot but read against later ones while the next scan is
//! still running. A [`TextDelta`] describes how one snapshot became the next, expressed in
//! **character offsets** (Unicode scalar values), and [`TextDelta::translate_span`] maps a span
//! across it.

use crate::span::TextSpan;

/// One replacement at a character offset.
///
/// `start` is measured in the text as it is when this edit runs, i.e. after every earlier edit
/// of the same [`TextDelta`]. The removed range is `start..start + deleted_text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Where the edit applies.
    pub start: usize,
    /// Text removed at `start`; empty for a pure insertion.
    pub deleted_text: String,
    /// Text put in its place; empty for a pure deletion.
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// An insertion of `text` at `start`.
    pub fn insert(start: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: String::new(),
            inserted_text: text.into(),
        }
    }

    /// A deletion of `text`, which must be the current document text at `start`.
    pub fn delete(start: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: text.into(),
            inserted_text: String::new(),
        }
    }

    /// A replacement of `deleted` at `start` by `inserted`.
    pub fn replace(start: usize, deleted: impl Into<String>, inserted: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: deleted.into(),
            inserted_text: inserted.into(),
        }
    }

    /// Removed characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Inserted characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// End of the removed range, before the edit.
    pub fn end(&self) -> usize {
        self.start + self.deleted_len()
    }

    /// Map a pre-edit offset to the post-edit document.
    ///
    /// Offsets inside the deleted range collapse onto the edit start. An offset exactly at a pure
    /// insertion point stays in front of the inserted text unless `after_insert` is set.
    pub fn translate_offset(&self, offset: usize, after_insert: bool) -> usize {
        let end = self.end();
        if offset < self.start {
            return offset;
        }
        if offset > end {
            return offset - self.deleted_len() + self.inserted_len();
        }
        if offset == end && (end > self.start || after_insert) {
            return self.start + self.inserted_len();
        }
        self.start
    }

    /// Map a pre-edit span to the post-edit document.
    ///
    /// Returns `None` if the edit deleted the whole span. Text inserted exactly at either
    /// boundary ends up outside the span.
    pub fn translate_span(&self, span: TextSpan) -> Option<TextSpan> {
        if self.deleted_len() > 0 && self.start <= span.start && span.end <= self.end() {
            return None;
        }

        let start = self.translate_offset(span.start, true);
        let end = self.translate_offset(span.end, false);
        (start < end).then_some(TextSpan::new(start, end))
    }
}

/// How one snapshot became the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Length of the older snapshot.
    pub before_char_count: usize,
    /// Length of the newer snapshot.
    pub after_char_count: usize,
    /// Edits, applied one after another.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Build a delta from ordered edits, deriving the "after" character count.
    pub fn new(before_char_count: usize, edits: Vec<TextDeltaEdit>) -> Self {
        let after_char_count = edits.iter().fold(before_char_count, |count, edit| {
            (count + edit.inserted_len()).saturating_sub(edit.deleted_len())
        });
        Self {
            before_char_count,
            after_char_count,
            edits,
        }
    }

    /// Whether the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.iter().all(|e| e.deleted_text.is_empty() && e.inserted_text.is_empty())
    }

    /// Map a span through every edit in order; `None` once any edit deletes it entirely.
    pub fn translate_span(&self, span: TextSpan) -> Option<TextSpan> {
        self.edits
            .iter()
            .try_fold(span, |span, edit| edit.translate_span(span))
    }

    /// Map an offset through every edit in order.
    pub fn translate_offset(&self, offset: usize) -> usize {
        self.edits
            .iter()
            .fold(offset, |offset, edit| edit.translate_offset(offset, true))
    }
}
