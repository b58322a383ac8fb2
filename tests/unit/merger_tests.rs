/*!
 * Tests for the segment merger
 */

use subsplit::alignment::merger::{aggregate_actors, is_contiguous_duplicate, join_sentences, strip_redundant_symbols};
use subsplit::alignment::{CandidateSegment, Cue, LanguageText, SegmentMerger};
use subsplit::language_utils::{Language, LanguageMap, LanguageSet};

use crate::common::cue;

fn languages() -> LanguageSet {
    LanguageSet::new(Language::Japanese, vec![Language::Spanish, Language::English]).unwrap()
}

fn candidate(start_ms: i64, end_ms: i64, cues: Vec<Cue>) -> CandidateSegment {
    let mut map: LanguageMap<Vec<Cue>> = LanguageMap::new();
    for cue in cues {
        map.get_or_insert_with(cue.language, Vec::new).push(cue);
    }
    CandidateSegment { start_ms, end_ms, cues: map }
}

/// Primary sentences join with an ideographic space
#[test]
fn test_joinSentences_withPrimaryJoiner_shouldUseIdeographicSpace() {
    let cues = vec![
        cue(Language::Japanese, 0, 0, 1000, "おはよう"),
        cue(Language::Japanese, 1, 1000, 2000, "元気?"),
    ];

    assert_eq!(join_sentences(&cues, "\u{3000}"), "おはよう\u{3000}元気?");
}

/// A space right after a full stop is dropped
#[test]
fn test_joinSentences_afterMaru_shouldDropJoiner() {
    let cues = vec![
        cue(Language::Japanese, 0, 0, 1000, "おはよう。"),
        cue(Language::Japanese, 1, 1000, 2000, "元気"),
    ];

    assert_eq!(join_sentences(&cues, "\u{3000}"), "おはよう。元気");
}

/// Sentences are trimmed before joining
#[test]
fn test_joinSentences_withPaddedSentences_shouldTrimEach() {
    let cues = vec![
        cue(Language::English, 0, 0, 1000, " Hi "),
        cue(Language::English, 1, 1000, 2000, "there "),
    ];

    assert_eq!(join_sentences(&cues, " "), "Hi there");
}

/// Doubled quote artifacts become straight double quotes
#[test]
fn test_joinSentences_withQuoteArtifacts_shouldUseDoubleQuotes() {
    let cues = vec![cue(Language::English, 0, 0, 1000, "``Run!''")];

    assert_eq!(join_sentences(&cues, " "), "\"Run!\"");
}

/// Continuation dashes after punctuation are dropped
#[test]
fn test_stripRedundantSymbols_withDashesAfterPunctuation_shouldRemoveThem() {
    assert_eq!(strip_redundant_symbols("Really?-Yes"), "Really?Yes");
    assert_eq!(strip_redundant_symbols("No!-"), "No!");
    assert_eq!(strip_redundant_symbols("Well,- fine"), "Well, fine");
    assert_eq!(strip_redundant_symbols("ええー-"), "ええー");
}

/// A leading dash is dropped but inner hyphens stay
#[test]
fn test_stripRedundantSymbols_withLeadingDash_shouldRemoveOnlyLeading() {
    assert_eq!(strip_redundant_symbols("-Go"), "Go");
    assert_eq!(strip_redundant_symbols("well-known"), "well-known");
}

/// Runs of whitespace shrink to one
#[test]
fn test_stripRedundantSymbols_withDoubleSpaces_shouldCollapse() {
    assert_eq!(strip_redundant_symbols("a   b"), "a b");
}

/// Actors are sorted, distinct and never blank
#[test]
fn test_aggregateActors_withRepeatsAndBlanks_shouldSortAndDedup() {
    let cues = vec![
        cue(Language::English, 0, 0, 1, "a").with_actor("Kou"),
        cue(Language::English, 1, 0, 1, "b").with_actor("Aoi"),
        cue(Language::English, 2, 0, 1, "c").with_actor("Kou"),
        cue(Language::English, 3, 0, 1, "d"),
        cue(Language::English, 4, 0, 1, "e").with_actor(" \tAoi "),
    ];

    assert_eq!(aggregate_actors(&cues), "Aoi,Kou");
}

/// No actor labels give an empty string
#[test]
fn test_aggregateActors_withoutActors_shouldReturnEmpty() {
    let cues = vec![cue(Language::English, 0, 0, 1, "a")];
    assert_eq!(aggregate_actors(&cues), "");
}

/// Contiguous duplicate needs both the same sentence and touching times
#[test]
fn test_isContiguousDuplicate_withVariousCues_shouldRequireBothConditions() {
    let list = vec![
        cue(Language::English, 0, 0, 1000, "Yes"),
        cue(Language::English, 1, 1000, 2000, "No"),
    ];

    assert!(is_contiguous_duplicate(&list, &cue(Language::English, 2, 2000, 2500, "Yes")));
    assert!(!is_contiguous_duplicate(&list, &cue(Language::English, 2, 2100, 2500, "Yes")));
    assert!(!is_contiguous_duplicate(&list, &cue(Language::English, 2, 2000, 2500, "Maybe")));
    assert!(!is_contiguous_duplicate(&[], &cue(Language::English, 2, 2000, 2500, "Yes")));
}

/// A complete candidate becomes a segment with one slot per configured language
#[test]
fn test_merge_withPrimaryAndSecondary_shouldBuildSegment() {
    let merger = SegmentMerger::new(languages());
    let candidate = candidate(
        1000,
        3000,
        vec![
            cue(Language::Japanese, 4, 1000, 2000, "一").with_actor("Aoi"),
            cue(Language::Spanish, 5, 1100, 2900, "uno"),
            cue(Language::Japanese, 7, 2000, 3000, "二"),
        ],
    );

    let segment = merger.merge(candidate).expect("segment");

    assert_eq!(segment.segment_id, 4);
    assert_eq!((segment.start_ms, segment.end_ms), (1000, 3000));
    assert_eq!(segment.midpoint_ms(), 2000);
    assert_eq!(segment.sentence(Language::Japanese), Some("一\u{3000}二"));
    assert_eq!(segment.sentence(Language::Spanish), Some("uno"));

    let japanese = segment.text(Language::Japanese).expect("ja slot");
    assert_eq!(japanese.contributing_ids, vec![4, 7]);
    assert_eq!(japanese.ids_string(), "4,7");
    assert_eq!(japanese.actors, "Aoi");
    assert_eq!(japanese.is_machine_translated, Some(false));

    // English is in the set but had no cue
    let english = segment.text(Language::English).expect("en slot");
    assert_eq!(english, &LanguageText::default());
    assert!(!english.has_text());
    assert_eq!(english.ids_string(), "");
}

/// The segment id is the smallest primary id, even when a secondary cue came first
#[test]
fn test_merge_withSecondaryFirst_shouldUsePrimaryId() {
    let merger = SegmentMerger::new(languages());
    let candidate = candidate(
        900,
        2000,
        vec![
            cue(Language::English, 2, 900, 1900, "one"),
            cue(Language::Japanese, 3, 1000, 2000, "一"),
        ],
    );

    let segment = merger.merge(candidate).expect("segment");

    assert_eq!(segment.segment_id, 3);
}

/// Primary-only candidates are discarded
#[test]
fn test_merge_withPrimaryOnly_shouldReturnNone() {
    let merger = SegmentMerger::new(languages());
    let candidate = candidate(0, 1000, vec![cue(Language::Japanese, 0, 0, 1000, "一")]);

    assert!(merger.merge(candidate).is_none());
}

/// Secondary-only candidates are discarded
#[test]
fn test_merge_withoutPrimary_shouldReturnNone() {
    let merger = SegmentMerger::new(languages());
    let candidate = candidate(
        0,
        1000,
        vec![
            cue(Language::Spanish, 0, 0, 1000, "uno"),
            cue(Language::English, 1, 0, 1000, "one"),
        ],
    );

    assert!(merger.merge(candidate).is_none());
}

/// Languages outside the set do not count toward completeness
#[test]
fn test_merge_withOnlyForeignSecondary_shouldReturnNone() {
    let merger = SegmentMerger::new(languages());
    let candidate = candidate(
        0,
        1000,
        vec![
            cue(Language::Japanese, 0, 0, 1000, "一"),
            cue(Language::French, 1, 0, 1000, "un"),
        ],
    );

    assert!(merger.merge(candidate).is_none());
}
