//! Regions and parse generations.
//!
//! A [`Region`] pairs a closing brace with the header of the block it closes. Regions are value
//! records: a scan pass recomputes all of them from scratch, and UI state attached to a region
//! (its adornment, whether it is currently shown) lives in a separate side-table keyed by
//! [`RegionKey`] (see [`crate::adornment`]).

use crate::icon::IconCategory;
use crate::span::TextSpan;
use std::sync::Arc;

/// A detected (header, closing brace) pairing eligible for an end tag.
///
/// Invariants: `span.start < span.end`, `header` is non-empty and trimmed, and every `{` in it
/// outside a string literal is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// From the header start to just past the closing brace.
    pub span: TextSpan,
    /// Single-line header text shown in the end tag.
    pub header: String,
    /// Icon hint derived from the header.
    pub icon: IconCategory,
}

impl Region {
    /// Create a region.
    pub fn new(span: TextSpan, header: impl Into<String>, icon: IconCategory) -> Self {
        Self {
            span,
            header: header.into(),
            icon,
        }
    }

    /// Offset of the first header character (the click-to-jump target).
    pub fn header_start(&self) -> usize {
        self.span.start
    }

    /// Offset of the closing brace.
    pub fn close_brace(&self) -> usize {
        self.span.end.saturating_sub(1)
    }

    /// Stable identity of this region.
    pub fn key(&self) -> RegionKey {
        RegionKey {
            span: self.span,
            header: self.header.clone(),
        }
    }

    /// Returns `true` if the region satisfies the model invariants.
    pub fn is_well_formed(&self) -> bool {
        self.span.start < self.span.end
            && !self.header.is_empty()
            && self.header.trim() == self.header
            && !has_unclosed_brace(&self.header)
    }
}

/// Brace balance of header text, skipping quoted literals.
fn has_unclosed_brace(header: &str) -> bool {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for c in header.chars() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth > 0
}

/// Identity of a region across generations: same span and same header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    /// Region span.
    pub span: TextSpan,
    /// Header text.
    pub header: String,
}

/// One complete, internally consistent set of regions produced by a single scan pass.
#[derive(Debug, Clone)]
pub struct ParseGeneration {
    regions: Arc<[Region]>,
    snapshot_version: u64,
    config_version: u64,
}

impl ParseGeneration {
    /// Create a generation. `regions` must be in closing-brace document order.
    pub fn new(regions: Vec<Region>, snapshot_version: u64, config_version: u64) -> Self {
        Self {
            regions: regions.into(),
            snapshot_version,
            config_version,
        }
    }

    /// A generation without regions.
    pub fn empty(snapshot_version: u64, config_version: u64) -> Self {
        Self::new(Vec::new(), snapshot_version, config_version)
    }

    /// Regions in closing-brace document order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Shared handle to the region list.
    pub fn regions_arc(&self) -> Arc<[Region]> {
        Arc::clone(&self.regions)
    }

    /// Snapshot version the regions were computed against.
    pub fn snapshot_version(&self) -> u64 {
        self.snapshot_version
    }

    /// Options version the scan ran with.
    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if there are no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
