//! The region discovery pass.
//!
//! One pass walks every punctuation token of the snapshot in document order. Each `}` character
//! is handed to the [`HeaderResolver`]; a resolved header becomes a [`Region`] with an icon picked
//! from the header text. The pass has no side effects: it returns a complete
//! [`ParseGeneration`] or nothing at all.

use crate::classification::ClassificationStream;
use crate::error::ScanError;
use crate::header::{Cancelled, HeaderResolver};
use crate::icon::select_category;
use crate::navigator::StructureNavigator;
use crate::options::EndTagOptions;
use crate::region::{ParseGeneration, Region};
use crate::snapshot::TextSnapshot;
use crate::span::TextSpan;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, trace};

/// The host services for one snapshot.
///
/// All three must describe the same text: classification and structure spans are offsets into
/// `snapshot`.
#[derive(Clone)]
pub struct DocumentServices {
    /// Text of the snapshot.
    pub snapshot: Arc<dyn TextSnapshot>,
    /// Lexical classification of the snapshot.
    pub classifier: Arc<dyn ClassificationStream>,
    /// Structural containment of the snapshot.
    pub navigator: Arc<dyn StructureNavigator>,
}

impl DocumentServices {
    /// Bundle the services of one snapshot.
    pub fn new(
        snapshot: Arc<dyn TextSnapshot>,
        classifier: Arc<dyn ClassificationStream>,
        navigator: Arc<dyn StructureNavigator>,
    ) -> Self {
        Self {
            snapshot,
            classifier,
            navigator,
        }
    }

    /// Version of the snapshot these services describe.
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }
}

impl std::fmt::Debug for DocumentServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentServices")
            .field("version", &self.snapshot.version())
            .field("len_chars", &self.snapshot.len_chars())
            .finish_non_exhaustive()
    }
}

/// Run one full scan of `services`.
///
/// Disabled options produce an empty generation without touching the services. Cancellation is
/// polled before every closing brace and inside every header resolution; a cancelled pass
/// returns [`ScanError::Cancelled`] and no regions.
pub fn scan(
    services: &DocumentServices,
    options: &EndTagOptions,
    cancel: &CancellationToken,
) -> Result<ParseGeneration, ScanError> {
    let version = services.version();
    if !options.enabled {
        debug!(target: "endtag.scan", version, "scan_disabled");
        return Ok(ParseGeneration::empty(version, options.version()));
    }

    let span = info_span!(target: "endtag.scan", "scan", version);
    let _enter = span.enter();

    let snapshot = services.snapshot.as_ref();
    let resolver = HeaderResolver::new(
        snapshot,
        services.classifier.as_ref(),
        services.navigator.as_ref(),
    )
    .with_max_walk_steps(options.effective_max_walk_steps());

    let whole = TextSpan::new(0, snapshot.len_chars());
    let tokens = services.classifier.classify(whole);

    let mut regions = Vec::new();
    let mut candidates = 0usize;
    // Overlapping punctuation tokens must not report the same brace twice.
    let mut next_offset = 0usize;

    for token in tokens.iter().filter(|t| t.kind.is_punctuation()) {
        if cancel.is_cancelled() {
            debug!(target: "endtag.scan", version, "scan_cancelled");
            return Err(ScanError::Cancelled);
        }
        let text = snapshot.text(token.span);
        for (i, c) in text.chars().enumerate() {
            let offset = token.span.start + i;
            if c != '}' || offset < next_offset {
                continue;
            }
            next_offset = offset + 1;
            candidates += 1;

            let close = TextSpan::with_len(offset, 1);
            let header = match resolver.resolve(close, cancel) {
                Ok(Some(header)) => header,
                Ok(None) => continue,
                Err(Cancelled) => {
                    debug!(target: "endtag.scan", version, "scan_cancelled");
                    return Err(ScanError::Cancelled);
                }
            };

            if options.skip_same_line
                && snapshot.line_of(header.span.start) == snapshot.line_of(offset)
            {
                trace!(target: "endtag.scan", %close, header = %header.text, "same_line_skipped");
                continue;
            }

            let icon = select_category(&header.text);
            let region = Region::new(TextSpan::new(header.span.start, close.end), header.text, icon);
            if !region.is_well_formed() {
                trace!(target: "endtag.scan", %close, "malformed_region_skipped");
                continue;
            }
            regions.push(region);
        }
    }

    if cancel.is_cancelled() {
        debug!(target: "endtag.scan", version, "scan_cancelled");
        return Err(ScanError::Cancelled);
    }

    debug!(
        target: "endtag.scan",
        version,
        candidates,
        regions = regions.len(),
        "scan_complete"
    );
    Ok(ParseGeneration::new(regions, version, options.version()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{ClassificationIndex, ClassificationKind, ClassificationSpan};
    use crate::icon::{IconCategory, Visibility};
    use crate::navigator::NestedSpanNavigator;
    use crate::snapshot::RopeSnapshot;

    // `class A {\n  void F() {\n  }\n}`, hand-classified.
    fn services() -> DocumentServices {
        let text = "class A {\n  void F() {\n  }\n}";
        let tokens = vec![
            ClassificationSpan::new(0, 5, ClassificationKind::Keyword),
            ClassificationSpan::new(6, 1, ClassificationKind::Identifier),
            ClassificationSpan::new(8, 1, ClassificationKind::Punctuation),
            ClassificationSpan::new(12, 4, ClassificationKind::Keyword),
            ClassificationSpan::new(17, 1, ClassificationKind::Identifier),
            ClassificationSpan::new(18, 2, ClassificationKind::Punctuation),
            ClassificationSpan::new(21, 1, ClassificationKind::Punctuation),
            ClassificationSpan::new(25, 1, ClassificationKind::Punctuation),
            ClassificationSpan::new(27, 1, ClassificationKind::Punctuation),
        ];
        let structure = vec![
            TextSpan::new(0, 28),
            TextSpan::new(12, 26),
            TextSpan::new(18, 20),
            TextSpan::new(21, 26),
        ];
        DocumentServices::new(
            Arc::new(RopeSnapshot::new(text, 7)),
            Arc::new(ClassificationIndex::new(tokens)),
            Arc::new(NestedSpanNavigator::new(structure)),
        )
    }

    #[test]
    fn test_scan_orders_regions_by_closing_brace() {
        let generation = scan(&services(), &EndTagOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(generation.snapshot_version(), 7);
        let headers: Vec<&str> = generation
            .regions()
            .iter()
            .map(|r| r.header.as_str())
            .collect();
        assert_eq!(headers, vec!["void F()", "class A"]);
        assert_eq!(generation.regions()[0].span, TextSpan::new(12, 26));
        assert_eq!(
            generation.regions()[0].icon,
            IconCategory::Method(Visibility::Private)
        );
        assert_eq!(
            generation.regions()[1].icon,
            IconCategory::Class(Visibility::Internal)
        );
    }

    #[test]
    fn test_disabled_options_short_circuit() {
        let mut options = EndTagOptions::default();
        options.update(|o| o.enabled = false);
        let generation = scan(&services(), &options, &CancellationToken::new()).unwrap();
        assert!(generation.is_empty());
        assert_eq!(generation.config_version(), 1);
    }

    #[test]
    fn test_cancelled_scan_returns_no_regions() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            scan(&services(), &EndTagOptions::default(), &cancel).unwrap_err(),
            ScanError::Cancelled
        );
    }

    #[test]
    fn test_same_line_blocks() {
        let text = "get { return x; }";
        let tokens = vec![
            ClassificationSpan::new(0, 3, ClassificationKind::Keyword),
            ClassificationSpan::new(4, 1, ClassificationKind::Punctuation),
            ClassificationSpan::new(6, 6, ClassificationKind::Keyword),
            ClassificationSpan::new(13, 1, ClassificationKind::Identifier),
            ClassificationSpan::new(14, 1, ClassificationKind::Punctuation),
            ClassificationSpan::new(16, 1, ClassificationKind::Punctuation),
        ];
        let services = DocumentServices::new(
            Arc::new(RopeSnapshot::new(text, 0)),
            Arc::new(ClassificationIndex::new(tokens)),
            Arc::new(NestedSpanNavigator::new(vec![TextSpan::new(0, 17)])),
        );

        let skipped = scan(&services, &EndTagOptions::default(), &CancellationToken::new()).unwrap();
        assert!(skipped.is_empty());

        let mut options = EndTagOptions::default();
        options.skip_same_line = false;
        let kept = scan(&services, &options, &CancellationToken::new()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.regions()[0].header, "get");
    }
}
