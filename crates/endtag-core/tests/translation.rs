mod common;

use common::{SAMPLE, toy_services};
use endtag_core::{
    EndTagOptions, RegionCache, RopeSnapshot, TextDelta, TextDeltaEdit, TextSnapshot, scan,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Random single-character insertions and deletions. A region untouched by an edit must still
// cover the same text afterwards; a region the edit falls inside changes length by exactly the
// edit size.
#[test]
fn test_random_edits_translate_regions() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let generation = scan(
        &toy_services(SAMPLE, 0),
        &EndTagOptions::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    let cache = RegionCache::with_generation(generation);
    let mut snapshot = RopeSnapshot::new(SAMPLE, 0);
    let original = RopeSnapshot::new(SAMPLE, 0);

    for _ in 0..200 {
        let len = snapshot.len_chars();
        let edit = if rng.gen_bool(0.5) || len == 0 {
            TextDeltaEdit::insert(rng.gen_range(0..=len), "~")
        } else {
            let at = rng.gen_range(0..len);
            let text = snapshot.text(endtag_core::TextSpan::with_len(at, 1));
            TextDeltaEdit::delete(at, text)
        };
        let delta = TextDelta::new(len, vec![edit]);
        let next = snapshot.apply_delta(&delta).unwrap();
        cache.record_delta(next.version(), Arc::new(delta));
        snapshot = next;
    }

    let translated = cache.regions_at(snapshot.version());
    let current = cache.current();
    assert!(translated.len() <= current.len());

    for region in translated.iter() {
        assert!(region.span.start < region.span.end);
        assert!(region.span.end <= snapshot.len_chars());
        // Header and icon are carried over untouched.
        assert!(current.regions().iter().any(|r| r.header == region.header));
    }

    // The original region text with every `~` removed is a subsequence source for the
    // translated text: removing inserted markers can only lose characters, never add them.
    for region in translated.iter() {
        let now: String = snapshot
            .text(region.span)
            .chars()
            .filter(|&c| c != '~')
            .collect();
        let source = current
            .regions()
            .iter()
            .filter(|r| r.header == region.header)
            .map(|r| original.text(r.span))
            .find(|text| is_subsequence(&now, text));
        assert!(source.is_some(), "{:?} is not drawn from any original region", now);
    }
}

#[test]
fn test_insertion_outside_keeps_text() {
    let generation = scan(
        &toy_services(SAMPLE, 0),
        &EndTagOptions::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    let before = RopeSnapshot::new(SAMPLE, 0);
    let cache = RegionCache::with_generation(generation);

    let base = SAMPLE.chars().count();
    for step in 1..=20u64 {
        // Inserting at offset 0 lands in front of every region, including one starting there.
        cache.record_delta(
            step,
            Arc::new(TextDelta::new(
                base + (step as usize - 1) * 3,
                vec![TextDeltaEdit::insert(0, "abc")],
            )),
        );
    }

    let shifted = cache.regions_at(20);
    assert_eq!(shifted.len(), cache.current().len());
    for (old, new) in cache.current().regions().iter().zip(shifted.iter()) {
        assert_eq!(new.span.start, old.span.start + 60);
        assert_eq!(new.span.len(), old.span.len());
        assert_eq!(before.text(old.span).len(), new.span.len());
    }
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars();
    needle.chars().all(|c| hay.any(|h| h == c))
}
