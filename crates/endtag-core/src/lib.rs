#![warn(missing_docs)]
//! Endtag Core - Headless Code Block End Tags
//!
//! # Overview
//!
//! `endtag-core` pairs every closing brace of a document with the header of the block it closes
//! (`public void Run()`, `else if (x > 0)`, `(a, b) =>`) and keeps that pairing current while the
//! document is edited. A UI layer renders the result as an inline tag after the `}` and jumps to
//! the header when the tag is clicked.
//!
//! The engine does not parse source code. The host supplies three services per snapshot:
//!
//! - [`TextSnapshot`] - immutable text with versions and line lookup
//! - [`ClassificationStream`] - lexical classification spans (punctuation, keyword, ...)
//! - [`StructureNavigator`] - "smallest structural span enclosing this one"
//!
//! and gets back [`Region`]s: (span, header text, icon) triples.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Tagger (scheduling, cancellation, notify)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Region Cache + Diff (generations, deltas)  │  ← Publication
//! ├─────────────────────────────────────────────┤
//! │  Scan Pass (closing braces → regions)       │  ← Discovery
//! ├─────────────────────────────────────────────┤
//! │  Header Resolver + Icon Selector            │  ← Per-brace logic
//! ├─────────────────────────────────────────────┤
//! │  Host Services (snapshot, classes, structure)│ ← Inputs
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use endtag_core::{
//!     ClassificationIndex, ClassificationKind, ClassificationSpan, DocumentServices,
//!     EndTagOptions, EndTagTagger, NestedSpanNavigator, RopeSnapshot, TextSpan,
//! };
//!
//! let text = "if (a)\n{\n}";
//! let tokens = vec![
//!     ClassificationSpan::new(0, 2, ClassificationKind::Keyword),
//!     ClassificationSpan::new(3, 1, ClassificationKind::Punctuation),
//!     ClassificationSpan::new(4, 1, ClassificationKind::Identifier),
//!     ClassificationSpan::new(5, 1, ClassificationKind::Punctuation),
//!     ClassificationSpan::new(7, 1, ClassificationKind::Punctuation),
//!     ClassificationSpan::new(9, 1, ClassificationKind::Punctuation),
//! ];
//! let services = DocumentServices::new(
//!     Arc::new(RopeSnapshot::new(text, 1)),
//!     Arc::new(ClassificationIndex::new(tokens)),
//!     Arc::new(NestedSpanNavigator::new(vec![TextSpan::new(0, 10)])),
//! );
//!
//! let tagger = EndTagTagger::new(EndTagOptions::default());
//! tagger.subscribe(|change| println!("re-render {}", change.changed));
//! tagger.request_scan(services);
//! tagger.wait_idle();
//!
//! let tags = tagger.tags(TextSpan::new(0, 10), 1);
//! assert_eq!(tags[0].header, "if (a)");
//! ```
//!
//! # Module Description
//!
//! - [`span`] - character-offset spans
//! - [`classification`] - classification spans and an indexed classification stream
//! - [`navigator`] - structural navigation contract and a span-set implementation
//! - [`snapshot`] - text snapshots (rope-backed)
//! - [`delta`] - text deltas and span translation
//! - [`header`] - header resolution for one closing brace
//! - [`icon`] - icon category selection
//! - [`region`] - regions and parse generations
//! - [`scan`] - the full-document discovery pass
//! - [`diff`] - changed-range computation between generations
//! - [`cache`] - the current generation and its translation across edits
//! - [`adornment`] - UI-side adornment side-table
//! - [`tagger`] - scan scheduling and change notification
//! - [`options`] - user options and their TOML file
//! - [`presentation`] - display, visibility and click helpers

pub mod adornment;
pub mod cache;
pub mod classification;
pub mod delta;
pub mod diff;
pub mod error;
pub mod header;
pub mod icon;
pub mod navigator;
pub mod options;
pub mod presentation;
pub mod region;
pub mod scan;
pub mod snapshot;
pub mod span;
pub mod tagger;

pub use adornment::{AdornmentEntry, AdornmentTable};
pub use cache::{PublishOutcome, RegionCache, translate_regions};
pub use classification::{
    ClassificationIndex, ClassificationKind, ClassificationSpan, ClassificationStream,
};
pub use delta::{TextDelta, TextDeltaEdit};
pub use diff::{RegionDiff, changed_span};
pub use error::{ConfigError, ScanError, SnapshotError};
pub use header::{DEFAULT_MAX_WALK_STEPS, HeaderResolver, ResolvedHeader, normalize_header};
pub use icon::{IconCategory, Visibility, select_category};
pub use navigator::{NestedSpanNavigator, StructureNavigator};
pub use options::{ClickMode, DisplayMode, EndTagOptions, VisibilityMode};
pub use presentation::{ClickGesture, EndTagView, JumpTarget, handle_click, jump_target, should_display};
pub use region::{ParseGeneration, Region, RegionKey};
pub use scan::{DocumentServices, scan};
pub use snapshot::{RopeSnapshot, TextSnapshot};
pub use span::TextSpan;
pub use tagger::{EndTagTagger, RegionsChanged, RegionsChangedCallback};
