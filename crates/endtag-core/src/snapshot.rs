//! Immutable text snapshots.
//!
//! A snapshot is one version of the document text. The scan reads header text from it and the
//! presentation layer maps offsets to lines; neither ever mutates it. [`RopeSnapshot`] is backed
//! by a `ropey::Rope`, so cloning is cheap and line lookups are O(log n).

use crate::delta::TextDelta;
use crate::error::SnapshotError;
use crate::span::TextSpan;
use ropey::Rope;

/// Read access to one immutable version of the document text.
pub trait TextSnapshot: Send + Sync {
    /// Monotonic snapshot version.
    fn version(&self) -> u64;

    /// Document length in characters.
    fn len_chars(&self) -> usize;

    /// Text covered by `span`, clamped to the document.
    fn text(&self, span: TextSpan) -> String;

    /// Zero-based line containing `offset` (clamped to the document).
    fn line_of(&self, offset: usize) -> usize;
}

/// A [`TextSnapshot`] backed by a rope.
#[derive(Debug, Clone)]
pub struct RopeSnapshot {
    rope: Rope,
    version: u64,
}

impl RopeSnapshot {
    /// Create the snapshot of `text` at `version`.
    pub fn new(text: &str, version: u64) -> Self {
        Self {
            rope: Rope::from_str(text),
            version,
        }
    }

    /// The full document text.
    pub fn full_text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines (a trailing newline starts an empty last line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Character offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines().saturating_sub(1)))
    }

    /// Produce the next snapshot by applying `delta`.
    ///
    /// Every edit's deleted text is compared with the current text first; a mismatch means the
    /// delta was recorded against another version and nothing is applied.
    pub fn apply_delta(&self, delta: &TextDelta) -> Result<RopeSnapshot, SnapshotError> {
        if self.rope.len_chars() != delta.before_char_count {
            return Err(SnapshotError::LengthMismatch {
                expected: delta.before_char_count,
                actual: self.rope.len_chars(),
            });
        }

        let mut rope = self.rope.clone();
        for edit in &delta.edits {
            let end = edit.end();
            if end > rope.len_chars() {
                return Err(SnapshotError::OutOfBounds {
                    offset: end,
                    len: rope.len_chars(),
                });
            }
            if rope.slice(edit.start..end) != edit.deleted_text.as_str() {
                return Err(SnapshotError::DeltaMismatch { offset: edit.start });
            }
            rope.remove(edit.start..end);
            rope.insert(edit.start, &edit.inserted_text);
        }

        Ok(RopeSnapshot {
            rope,
            version: self.version + 1,
        })
    }
}

impl TextSnapshot for RopeSnapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self, span: TextSpan) -> String {
        let len = self.rope.len_chars();
        let start = span.start.min(len);
        let end = span.end.min(len);
        self.rope.slice(start..end).to_string()
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::TextDeltaEdit;

    #[test]
    fn test_text_and_lines() {
        let snapshot = RopeSnapshot::new("fn a() {\n    x;\n}\n", 3);
        assert_eq!(snapshot.version(), 3);
        assert_eq!(snapshot.text(TextSpan::new(0, 6)), "fn a()");
        assert_eq!(snapshot.text(TextSpan::new(15, 100)), "\n}\n");
        assert_eq!(snapshot.line_of(0), 0);
        assert_eq!(snapshot.line_of(16), 2);
        assert_eq!(snapshot.line_start(2), 16);
    }

    #[test]
    fn test_char_offsets_with_wide_chars() {
        let snapshot = RopeSnapshot::new("a👋b{}", 0);
        assert_eq!(snapshot.len_chars(), 5);
        assert_eq!(snapshot.text(TextSpan::new(1, 3)), "👋b");
    }

    #[test]
    fn test_apply_delta_produces_next_version() {
        let snapshot = RopeSnapshot::new("if (a) {}", 1);
        let delta = TextDelta::new(9, vec![TextDeltaEdit::replace(4, "a", "ok")]);
        let next = snapshot.apply_delta(&delta).unwrap();
        assert_eq!(next.full_text(), "if (ok) {}");
        assert_eq!(next.version(), 2);
    }

    #[test]
    fn test_apply_delta_rejects_mismatched_text() {
        let snapshot = RopeSnapshot::new("if (a) {}", 1);
        let delta = TextDelta::new(9, vec![TextDeltaEdit::delete(0, "xx")]);
        assert_eq!(
            snapshot.apply_delta(&delta).unwrap_err(),
            SnapshotError::DeltaMismatch { offset: 0 }
        );

        let stale = TextDelta::new(4, vec![TextDeltaEdit::insert(0, "x")]);
        assert!(matches!(
            snapshot.apply_delta(&stale),
            Err(SnapshotError::LengthMismatch { .. })
        ));
    }
}
