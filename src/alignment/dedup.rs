/*!
 * Cue sequencing and deduplication.
 *
 * Release groups often ship the same line twice (once per style, or once in
 * a karaoke layer), so exact repeats are collapsed before alignment.
 */

use std::collections::HashSet;

use log::debug;

use super::Cue;
use super::sanitizer;
use crate::language_utils::Language;
use crate::subtitle_processor::SubtitleTrack;

/// Sanitize every cue of every track, stable-sort by start time and number them.
///
/// Ids are assigned before non-dialogue lines are dropped, so the ids that
/// survive may have gaps.
pub fn sequence_cues(tracks: &[SubtitleTrack]) -> Vec<Cue> {
    let mut cues: Vec<Cue> = tracks
        .iter()
        .flat_map(|track| {
            track.cues.iter().map(move |raw| Cue {
                sub_id: 0,
                language: track.language,
                start_ms: raw.start_ms,
                end_ms: raw.end_ms,
                raw_text: raw.raw_text.clone(),
                sentence: sanitizer::sanitize(raw),
                actor: raw.actor.clone(),
            })
        })
        .collect();

    // sort_by_key is stable: equal starts keep track order
    cues.sort_by_key(|cue| cue.start_ms);

    for (rank, cue) in cues.iter_mut().enumerate() {
        cue.sub_id = rank;
    }

    cues
}

/// Drop cues whose sentence is empty
pub fn drop_empty(cues: Vec<Cue>) -> Vec<Cue> {
    let before = cues.len();
    let kept: Vec<Cue> = cues.into_iter().filter(|cue| !cue.sentence.is_empty()).collect();
    debug!("Dropped {} non-dialogue cues", before - kept.len());
    kept
}

/// Remove cues whose `(start, end, language, sentence)` was already seen.
/// The first occurrence wins and order is preserved.
pub fn deduplicate(cues: Vec<Cue>) -> Vec<Cue> {
    let mut seen: HashSet<(i64, i64, Language, String)> = HashSet::with_capacity(cues.len());
    let mut kept = Vec::with_capacity(cues.len());

    for cue in cues {
        let key = (cue.start_ms, cue.end_ms, cue.language, cue.sentence.clone());
        if seen.insert(key) {
            kept.push(cue);
        } else {
            debug!("Duplicate cue {} ({}): {}", cue.sub_id, cue.language, cue.sentence);
        }
    }

    kept
}

/// Sequence, filter and deduplicate in one pass, ready for the aligner
pub fn prepare_cues(tracks: &[SubtitleTrack]) -> Vec<Cue> {
    deduplicate(drop_empty(sequence_cues(tracks)))
}
