//! UI-side adornment state.
//!
//! Regions are recomputed from scratch on every scan, while the objects a UI creates to render
//! them live across scans. [`AdornmentTable`] keeps that association outside the region model,
//! keyed by [`RegionKey`]: when a new generation arrives, entries whose region survived keep their
//! handle and display flag, the rest are returned to the caller for disposal.
//!
//! The table is owned by the UI thread; scan workers never see it.

use crate::region::{Region, RegionKey};
use rustc_hash::{FxHashMap, FxHashSet};

/// An adornment handle plus whether it is currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdornmentEntry<H> {
    /// Opaque UI object rendering the end tag.
    pub handle: H,
    /// Whether the end tag is currently displayed.
    pub is_displayed: bool,
}

/// Side-table from region identity to UI adornment state.
#[derive(Debug, Clone)]
pub struct AdornmentTable<H> {
    entries: FxHashMap<RegionKey, AdornmentEntry<H>>,
}

impl<H> Default for AdornmentTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> AdornmentTable<H> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Associate `handle` with `key`. Returns the handle it replaces, if any.
    ///
    /// A new entry starts hidden; replacing a handle keeps the display flag.
    pub fn attach(&mut self, key: RegionKey, handle: H) -> Option<H> {
        match self.entries.get_mut(&key) {
            Some(entry) => Some(std::mem::replace(&mut entry.handle, handle)),
            None => {
                self.entries.insert(
                    key,
                    AdornmentEntry {
                        handle,
                        is_displayed: false,
                    },
                );
                None
            }
        }
    }

    /// Remove and return the handle for `key`.
    pub fn detach(&mut self, key: &RegionKey) -> Option<H> {
        self.entries.remove(key).map(|entry| entry.handle)
    }

    /// The handle attached to `key`.
    pub fn get(&self, key: &RegionKey) -> Option<&H> {
        self.entries.get(key).map(|entry| &entry.handle)
    }

    /// The full entry for `key`.
    pub fn entry(&self, key: &RegionKey) -> Option<&AdornmentEntry<H>> {
        self.entries.get(key)
    }

    /// Set the display flag. Returns `false` if no handle is attached to `key`.
    pub fn set_displayed(&mut self, key: &RegionKey, displayed: bool) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.is_displayed = displayed;
                true
            }
            None => false,
        }
    }

    /// Whether the end tag for `key` is shown. Unknown keys are not shown.
    pub fn is_displayed(&self, key: &RegionKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.is_displayed)
    }

    /// Keep only entries whose region is in `regions`; return the dropped handles.
    pub fn retain_generation(&mut self, regions: &[Region]) -> Vec<(RegionKey, H)> {
        let live: FxHashSet<RegionKey> = regions.iter().map(Region::key).collect();
        let stale: Vec<RegionKey> = self
            .entries
            .keys()
            .filter(|key| !live.contains(*key))
            .cloned()
            .collect();

        let mut dropped: Vec<(RegionKey, H)> = stale
            .into_iter()
            .filter_map(|key| {
                let entry = self.entries.remove(&key)?;
                Some((key, entry.handle))
            })
            .collect();
        dropped.sort_by(|a, b| a.0.cmp(&b.0));
        dropped
    }

    /// Number of attached handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handle is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionKey, &AdornmentEntry<H>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconCategory;
    use crate::span::TextSpan;

    fn region(start: usize, end: usize, header: &str) -> Region {
        Region::new(TextSpan::new(start, end), header, IconCategory::Unknown)
    }

    #[test]
    fn test_attach_and_display() {
        let mut table = AdornmentTable::new();
        let key = region(0, 10, "if (a)").key();
        assert_eq!(table.attach(key.clone(), 1u32), None);
        assert!(!table.is_displayed(&key));

        assert!(table.set_displayed(&key, true));
        assert_eq!(table.attach(key.clone(), 2), Some(1));
        assert!(table.is_displayed(&key));
        assert_eq!(table.get(&key), Some(&2));

        let missing = region(1, 2, "x").key();
        assert!(!table.set_displayed(&missing, true));
        assert!(!table.is_displayed(&missing));
    }

    #[test]
    fn test_retain_generation_keeps_surviving_regions() {
        let mut table = AdornmentTable::new();
        let kept = region(0, 10, "if (a)");
        let moved = region(20, 30, "while (b)");
        let renamed = region(40, 50, "void Run()");
        table.attach(kept.key(), "kept");
        table.attach(moved.key(), "moved");
        table.attach(renamed.key(), "renamed");
        table.set_displayed(&kept.key(), true);

        let next = vec![
            kept.clone(),
            region(22, 32, "while (b)"),
            region(40, 50, "void Run(int x)"),
        ];
        let dropped = table.retain_generation(&next);

        assert_eq!(
            dropped.iter().map(|(_, h)| *h).collect::<Vec<_>>(),
            vec!["moved", "renamed"]
        );
        assert_eq!(table.len(), 1);
        assert!(table.is_displayed(&kept.key()));
    }

    #[test]
    fn test_detach() {
        let mut table = AdornmentTable::new();
        let key = region(0, 3, "do").key();
        table.attach(key.clone(), ());
        assert_eq!(table.detach(&key), Some(()));
        assert!(table.is_empty());
    }
}
