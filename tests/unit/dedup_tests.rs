/*!
 * Tests for cue sequencing and deduplication
 */

use subsplit::alignment::dedup::{deduplicate, drop_empty, prepare_cues, sequence_cues};
use subsplit::language_utils::Language;
use subsplit::subtitle_processor::RawCue;

use crate::common::{cue, track, track_from_cues};

/// Cues of all tracks come out sorted by start with rank ids
#[test]
fn test_sequenceCues_withTwoTracks_shouldSortAndNumber() {
    let ja = track(Language::Japanese, &[(1000, 2000, "一"), (5000, 6000, "三")]);
    let es = track(Language::Spanish, &[(3000, 4000, "dos"), (500, 900, "cero")]);

    let cues = sequence_cues(&[ja, es]);

    let starts: Vec<i64> = cues.iter().map(|c| c.start_ms).collect();
    assert_eq!(starts, vec![500, 1000, 3000, 5000]);
    let ids: Vec<usize> = cues.iter().map(|c| c.sub_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(cues[0].language, Language::Spanish);
    assert_eq!(cues[0].sentence, "cero");
}

/// Equal starts keep the order of the tracks as given
#[test]
fn test_sequenceCues_withEqualStarts_shouldKeepTrackOrder() {
    let ja = track(Language::Japanese, &[(1000, 2000, "はい")]);
    let en = track(Language::English, &[(1000, 1800, "Yes")]);

    let cues = sequence_cues(&[ja.clone(), en.clone()]);
    assert_eq!(cues[0].language, Language::Japanese);
    assert_eq!(cues[1].language, Language::English);

    let cues = sequence_cues(&[en, ja]);
    assert_eq!(cues[0].language, Language::English);
    assert_eq!(cues[1].language, Language::Japanese);
}

/// Ids are given out before non-dialogue lines are dropped
#[test]
fn test_prepareCues_withRejectedLine_shouldLeaveIdGap() {
    let en = track_from_cues(
        Language::English,
        vec![
            RawCue::dialogue(1000, 2000, "Hello"),
            RawCue::dialogue(2000, 3000, "CAFE").with_actor("Sign_A"),
            RawCue::dialogue(3000, 4000, "Bye"),
        ],
    );

    let cues = prepare_cues(&[en]);

    let ids: Vec<usize> = cues.iter().map(|c| c.sub_id).collect();
    assert_eq!(ids, vec![0, 2]);
}

/// Actor and raw text are carried from the source event
#[test]
fn test_sequenceCues_withAssEvent_shouldKeepActorAndRawText() {
    let en = track_from_cues(
        Language::English,
        vec![RawCue::dialogue(0, 1000, "{\\i1}Hi{\\i0}").with_actor("Aoi")],
    );

    let cues = sequence_cues(&[en]);

    assert_eq!(cues[0].actor, "Aoi");
    assert_eq!(cues[0].raw_text, "{\\i1}Hi{\\i0}");
    assert_eq!(cues[0].sentence, "Hi");
}

/// Empty sentences are dropped
#[test]
fn test_dropEmpty_withBlankSentence_shouldRemoveIt() {
    let cues = vec![
        cue(Language::Japanese, 0, 0, 100, ""),
        cue(Language::Japanese, 1, 100, 200, "ok"),
    ];

    let kept = drop_empty(cues);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].sub_id, 1);
}

/// Two identical cues collapse into the first one
#[test]
fn test_deduplicate_withIdenticalCues_shouldKeepFirst() {
    let cues = vec![
        cue(Language::English, 3, 1000, 2000, "Hello"),
        cue(Language::English, 4, 1000, 2000, "Hello"),
    ];

    let kept = deduplicate(cues);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].sub_id, 3);
}

/// Any difference in the key keeps both cues
#[test]
fn test_deduplicate_withDifferentKeys_shouldKeepAll() {
    let cues = vec![
        cue(Language::English, 0, 1000, 2000, "Hello"),
        cue(Language::English, 1, 1000, 2001, "Hello"),
        cue(Language::Spanish, 2, 1000, 2000, "Hello"),
        cue(Language::English, 3, 1000, 2000, "Hello!"),
    ];

    assert_eq!(deduplicate(cues).len(), 4);
}

/// Actor is not part of the key
#[test]
fn test_deduplicate_withDifferentActors_shouldStillCollapse() {
    let cues = vec![
        cue(Language::English, 0, 1000, 2000, "Hey").with_actor("Aoi"),
        cue(Language::English, 1, 1000, 2000, "Hey").with_actor("Kou"),
    ];

    let kept = deduplicate(cues);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].actor, "Aoi");
}

/// Running deduplication on its own output removes nothing
#[test]
fn test_deduplicate_appliedTwice_shouldBeIdempotent() {
    let cues = vec![
        cue(Language::English, 0, 0, 1000, "a"),
        cue(Language::English, 1, 0, 1000, "a"),
        cue(Language::Japanese, 2, 0, 1000, "a"),
        cue(Language::English, 3, 2000, 3000, "b"),
        cue(Language::English, 4, 2000, 3000, "b"),
    ];

    let once = deduplicate(cues);
    let twice = deduplicate(once.clone());

    assert_eq!(once.len(), 3);
    assert_eq!(once, twice);
}

/// No tracks means no cues
#[test]
fn test_prepareCues_withNoTracks_shouldReturnEmpty() {
    assert!(prepare_cues(&[]).is_empty());
}
