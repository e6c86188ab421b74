//! Region diffing between generations.
//!
//! The UI layer only needs to invalidate the part of the document whose end tags changed. The
//! diff compares the previous generation (already translated onto the new snapshot) with the
//! freshly scanned one and reports a single bounding range.

use crate::region::{Region, RegionKey};
use crate::span::TextSpan;
use rustc_hash::FxHashSet;

/// Result of comparing two region lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionDiff {
    /// Regions present before but not after.
    pub removed: Vec<RegionKey>,
    /// Regions present after but not before.
    pub added: Vec<RegionKey>,
}

impl RegionDiff {
    /// Compare `old` (translated onto the new snapshot) against `new`.
    ///
    /// Identity is [`RegionKey`]: a region whose span or header changed counts as one removal
    /// and one addition.
    pub fn compute(old: &[Region], new: &[Region]) -> Self {
        let old_keys: FxHashSet<RegionKey> = old.iter().map(Region::key).collect();
        let new_keys: FxHashSet<RegionKey> = new.iter().map(Region::key).collect();

        // Iterate the slices, not the sets, so the output keeps document order.
        let removed = old
            .iter()
            .map(Region::key)
            .filter(|key| !new_keys.contains(key))
            .collect();
        let added = new
            .iter()
            .map(Region::key)
            .filter(|key| !old_keys.contains(key))
            .collect();

        Self { removed, added }
    }

    /// Returns `true` if both region sets are equal.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Bounding range of every removed and added span, or `None` when nothing changed.
    pub fn changed_span(&self) -> Option<TextSpan> {
        TextSpan::cover_all(self.removed.iter().chain(&self.added).map(|key| key.span))
    }
}

/// Shorthand for `RegionDiff::compute(old, new).changed_span()`.
pub fn changed_span(old: &[Region], new: &[Region]) -> Option<TextSpan> {
    RegionDiff::compute(old, new).changed_span()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconCategory;

    fn region(start: usize, end: usize, header: &str) -> Region {
        Region::new(TextSpan::new(start, end), header, IconCategory::Unknown)
    }

    #[test]
    fn test_identical_sets_signal_nothing() {
        let old = vec![region(0, 10, "if (a)"), region(20, 40, "void Run()")];
        let new = old.clone();
        let diff = RegionDiff::compute(&old, &new);
        assert!(diff.is_empty());
        assert_eq!(diff.changed_span(), None);
    }

    #[test]
    fn test_order_does_not_matter() {
        let old = vec![region(0, 10, "if (a)"), region(20, 40, "void Run()")];
        let new = vec![region(20, 40, "void Run()"), region(0, 10, "if (a)")];
        assert_eq!(changed_span(&old, &new), None);
    }

    #[test]
    fn test_changed_range_covers_removed_and_added() {
        let old = vec![region(0, 10, "if (a)"), region(20, 40, "void Run()")];
        let new = vec![region(0, 10, "if (a)"), region(50, 60, "while (x)")];
        let diff = RegionDiff::compute(&old, &new);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.changed_span(), Some(TextSpan::new(20, 60)));
    }

    #[test]
    fn test_header_change_is_a_change() {
        let old = vec![region(5, 30, "if (a)")];
        let new = vec![region(5, 30, "if (b)")];
        assert_eq!(changed_span(&old, &new), Some(TextSpan::new(5, 30)));
    }

    #[test]
    fn test_first_generation() {
        let new = vec![region(3, 9, "try"), region(12, 18, "catch")];
        assert_eq!(changed_span(&[], &new), Some(TextSpan::new(3, 18)));
        assert_eq!(changed_span(&new, &[]), Some(TextSpan::new(3, 18)));
        assert_eq!(changed_span(&[], &[]), None);
    }
}
