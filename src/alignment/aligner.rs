/*!
 * Timeline aligner.
 *
 * Walks the start-sorted cue stream once and groups overlapping cues of all
 * languages into candidate segments. A new candidate starts when a cue does
 * not overlap the current window, or when it starts right at the window's
 * end (two sequential utterances rather than one line in two languages).
 */

use log::debug;

use super::Cue;
use super::merger::is_contiguous_duplicate;
use crate::language_utils::LanguageMap;

/// Cues of all languages that share one time window
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSegment {
    pub start_ms: i64,
    pub end_ms: i64,
    pub cues: LanguageMap<Vec<Cue>>,
}

impl CandidateSegment {
    /// Number of cues across all languages
    pub fn cue_count(&self) -> usize {
        self.cues.iter().map(|(_, list)| list.len()).sum()
    }
}

// In-progress window, owned by a single align() call
struct AlignerState {
    // Boundary window; seeded one millisecond wider than the first cue
    segment_start: i64,
    segment_end: i64,
    // Exact min/max over the absorbed cues
    span: Option<(i64, i64)>,
    accumulator: LanguageMap<Vec<Cue>>,
}

impl AlignerState {
    fn seeded_by(first: &Cue) -> Self {
        Self {
            segment_start: first.start_ms - 1,
            segment_end: first.end_ms + 1,
            span: None,
            accumulator: LanguageMap::new(),
        }
    }

    fn restart_with(&mut self, cue: &Cue) {
        self.segment_start = cue.start_ms;
        self.segment_end = cue.end_ms;
        self.span = Some((cue.start_ms, cue.end_ms));
        self.accumulator = LanguageMap::with(cue.language, vec![cue.clone()]);
    }

    fn absorb(&mut self, cue: &Cue) {
        let list = self.accumulator.get_or_insert_with(cue.language, Vec::new);
        if is_contiguous_duplicate(list, cue) {
            debug!("Suppressed contiguous duplicate {}: {}", cue.sub_id, cue.sentence);
        } else {
            list.push(cue.clone());
        }

        // The window grows even when the cue itself was suppressed
        self.segment_start = self.segment_start.min(cue.start_ms);
        self.segment_end = self.segment_end.max(cue.end_ms);
        self.span = Some(match self.span {
            Some((start, end)) => (start.min(cue.start_ms), end.max(cue.end_ms)),
            None => (cue.start_ms, cue.end_ms),
        });
    }

    /// Hand the current window out as a candidate; `None` if nothing was accumulated
    fn finalize(&mut self) -> Option<CandidateSegment> {
        let cues = std::mem::take(&mut self.accumulator);
        let (start_ms, end_ms) = self.span.take()?;
        if cues.is_empty() {
            return None;
        }
        Some(CandidateSegment {
            start_ms,
            end_ms,
            cues,
        })
    }
}

/// Groups cues into candidate segments
#[derive(Debug, Clone)]
pub struct TimelineAligner {
    gap_threshold_ms: i64,
    flush_trailing_segment: bool,
}

impl Default for TimelineAligner {
    fn default() -> Self {
        Self::new(500, true)
    }
}

impl TimelineAligner {
    pub fn new(gap_threshold_ms: i64, flush_trailing_segment: bool) -> Self {
        Self {
            gap_threshold_ms,
            flush_trailing_segment,
        }
    }

    fn is_boundary(&self, state: &AlignerState, cue: &Cue) -> bool {
        let overlaps = state.segment_start < cue.end_ms && cue.start_ms < state.segment_end;
        !overlaps || (state.segment_end - cue.start_ms).abs() < self.gap_threshold_ms
    }

    /// Split `cues` (sorted by start time) into candidate segments, in order
    pub fn align(&self, cues: &[Cue]) -> Vec<CandidateSegment> {
        let Some(first) = cues.first() else {
            return Vec::new();
        };

        let mut state = AlignerState::seeded_by(first);
        let mut candidates = Vec::new();

        for cue in cues {
            if self.is_boundary(&state, cue) {
                candidates.extend(state.finalize());
                state.restart_with(cue);
            } else {
                state.absorb(cue);
            }
        }

        if self.flush_trailing_segment {
            candidates.extend(state.finalize());
        }

        debug!("Aligned {} cues into {} candidates", cues.len(), candidates.len());
        candidates
    }
}
