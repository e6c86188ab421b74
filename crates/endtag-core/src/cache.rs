//! The current region generation and its translation across edits.
//!
//! A scan takes time; edits keep arriving while it runs and after it finishes. The cache keeps
//! the last published [`ParseGeneration`] unchanged and records every [`TextDelta`] applied to the
//! buffer since that generation's snapshot. Readers ask for the regions *at* a snapshot version
//! and get them translated forward on read.
//!
//! ```text
//! generation @ v3 ──delta(v4)──delta(v5)──▶ regions_at(5)
//!                                           publish(generation @ v5) prunes both deltas
//! ```

use crate::delta::TextDelta;
use crate::diff::RegionDiff;
use crate::region::{ParseGeneration, Region};
use crate::span::TextSpan;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of [`RegionCache::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The generation became current.
    Published {
        /// Snapshot version of the generation this one replaced.
        previous_version: u64,
        /// Bounding range of changed regions, `None` if the region set is unchanged.
        changed: Option<TextSpan>,
    },
    /// The generation was older than the current one, or its scan was superseded.
    Refused,
}

#[derive(Debug)]
struct RecordedDelta {
    after_version: u64,
    delta: Arc<TextDelta>,
}

#[derive(Debug)]
struct CacheState {
    generation: Arc<ParseGeneration>,
    deltas: Vec<RecordedDelta>,
}

/// Thread-safe holder of the current generation.
///
/// Readers take a short read lock and clone an `Arc`; publishing swaps the generation under the
/// write lock, so a reader sees either the old or the new generation, never a mix.
#[derive(Debug)]
pub struct RegionCache {
    state: RwLock<CacheState>,
}

impl Default for RegionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionCache {
    /// An empty cache at snapshot version 0.
    pub fn new() -> Self {
        Self::with_generation(ParseGeneration::empty(0, 0))
    }

    /// A cache whose current generation is `generation`.
    pub fn with_generation(generation: ParseGeneration) -> Self {
        Self {
            state: RwLock::new(CacheState {
                generation: Arc::new(generation),
                deltas: Vec::new(),
            }),
        }
    }

    /// The current generation as published, without translation.
    pub fn current(&self) -> Arc<ParseGeneration> {
        Arc::clone(&self.state.read().generation)
    }

    /// Record that the buffer moved to `after_version` through `delta`.
    ///
    /// Deltas must arrive in version order. A delta for a version the cache has already seen is
    /// ignored.
    pub fn record_delta(&self, after_version: u64, delta: Arc<TextDelta>) {
        let mut state = self.state.write();
        let last = state
            .deltas
            .last()
            .map_or(state.generation.snapshot_version(), |d| d.after_version);
        if after_version <= last {
            warn!(
                target: "endtag.cache",
                after_version,
                last,
                "ignoring out-of-order delta"
            );
            return;
        }
        state.deltas.push(RecordedDelta {
            after_version,
            delta,
        });
    }

    /// Latest snapshot version the cache can translate to.
    pub fn latest_version(&self) -> u64 {
        let state = self.state.read();
        state
            .deltas
            .last()
            .map_or(state.generation.snapshot_version(), |d| d.after_version)
    }

    /// Current regions translated forward to snapshot `version`.
    ///
    /// Regions whose whole extent was deleted are dropped. Versions at or before the
    /// generation's own return it unchanged.
    pub fn regions_at(&self, version: u64) -> Arc<[Region]> {
        let state = self.state.read();
        let pending: Vec<&TextDelta> = state
            .deltas
            .iter()
            .take_while(|d| d.after_version <= version)
            .map(|d| d.delta.as_ref())
            .collect();
        if pending.is_empty() {
            return state.generation.regions_arc();
        }
        translate_regions(state.generation.regions(), pending).into()
    }

    /// Make `generation` current if it is not older than the current one.
    pub fn publish(&self, generation: ParseGeneration) -> PublishOutcome {
        self.publish_if(generation, || true)
    }

    /// Like [`publish`](Self::publish), but `still_wanted` is checked under the write lock.
    ///
    /// A scan passes its cancellation check here, so a scan cancelled after it finished
    /// computing still never becomes current.
    pub fn publish_if(
        &self,
        generation: ParseGeneration,
        still_wanted: impl FnOnce() -> bool,
    ) -> PublishOutcome {
        let mut state = self.state.write();
        if !still_wanted() {
            debug!(target: "endtag.cache", version = generation.snapshot_version(), "publish_superseded");
            return PublishOutcome::Refused;
        }

        let current = &state.generation;
        let incoming = (generation.snapshot_version(), generation.config_version());
        let existing = (current.snapshot_version(), current.config_version());
        if incoming < existing {
            debug!(
                target: "endtag.cache",
                incoming = ?incoming,
                existing = ?existing,
                "publish_refused_older_generation"
            );
            return PublishOutcome::Refused;
        }

        let target = generation.snapshot_version();
        let pending: Vec<&TextDelta> = state
            .deltas
            .iter()
            .filter(|d| d.after_version > existing.0 && d.after_version <= target)
            .map(|d| d.delta.as_ref())
            .collect();
        let translated = translate_regions(current.regions(), pending);
        let changed = RegionDiff::compute(&translated, generation.regions()).changed_span();

        state.deltas.retain(|d| d.after_version > target);
        state.generation = Arc::new(generation);
        debug!(
            target: "endtag.cache",
            version = target,
            regions = state.generation.len(),
            changed = ?changed,
            "published"
        );
        PublishOutcome::Published {
            previous_version: existing.0,
            changed,
        }
    }
}

/// Map `regions` through `deltas` in order, dropping regions whose span is deleted.
pub fn translate_regions<'a, I>(regions: &[Region], deltas: I) -> Vec<Region>
where
    I: IntoIterator<Item = &'a TextDelta>,
    I::IntoIter: Clone,
{
    let deltas = deltas.into_iter();
    regions
        .iter()
        .filter_map(|region| {
            let span = deltas
                .clone()
                .try_fold(region.span, |span, delta| delta.translate_span(span))?;
            Some(Region {
                span,
                ..region.clone()
            })
        })
        .collect()
}
