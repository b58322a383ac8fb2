/*!
 * Multilingual subtitle alignment.
 *
 * Turns per-language subtitle tracks of one episode into time-aligned
 * segments, each holding the primary-language sentence next to its
 * secondary-language renditions:
 *
 * tracks -> sanitizer -> dedup -> aligner -> merger -> (fallback)
 *
 * Everything here is synchronous and keeps no state between calls except
 * [`fallback`], which awaits a translator.
 */

use log::debug;

use crate::app_config::AlignmentConfig;
use crate::errors::AlignmentError;
use crate::language_utils::{Language, LanguageSet};
use crate::subtitle_processor::SubtitleTrack;

pub mod aligner;
pub mod dedup;
pub mod fallback;
pub mod merger;
pub mod sanitizer;

pub use aligner::{CandidateSegment, TimelineAligner};
pub use fallback::{FallbackFailure, apply_translation_fallback};
pub use merger::{LanguageText, Segment, SegmentMerger};

/// One timed, sanitized line from one language track
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Rank in the start-sorted sequence of all cues of the episode
    pub sub_id: usize,
    pub language: Language,
    pub start_ms: i64,
    pub end_ms: i64,
    pub raw_text: String,
    /// Cleaned text; empty when the line is not dialogue
    pub sentence: String,
    pub actor: String,
}

impl Cue {
    /// Build a cue that was already sanitized, `sub_id` left at zero
    pub fn new(language: Language, start_ms: i64, end_ms: i64, sentence: &str) -> Self {
        Self {
            sub_id: 0,
            language,
            start_ms,
            end_ms,
            raw_text: sentence.to_string(),
            sentence: sentence.to_string(),
            actor: String::new(),
        }
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    pub fn with_sub_id(mut self, sub_id: usize) -> Self {
        self.sub_id = sub_id;
        self
    }
}

/// Runs the whole alignment chain for one episode
#[derive(Debug, Clone)]
pub struct SegmentPipeline {
    languages: LanguageSet,
    aligner: TimelineAligner,
    merger: SegmentMerger,
}

impl SegmentPipeline {
    pub fn new(languages: LanguageSet, config: &AlignmentConfig) -> Self {
        Self {
            aligner: TimelineAligner::new(config.gap_threshold_ms, config.flush_trailing_segment),
            merger: SegmentMerger::new(languages.clone()),
            languages,
        }
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Build the ordered segment list from the episode's tracks.
    ///
    /// Fails only when a track's language is outside the configured set.
    pub fn build_segments(&self, tracks: &[SubtitleTrack]) -> Result<Vec<Segment>, AlignmentError> {
        if let Some(track) = tracks.iter().find(|t| !self.languages.contains(t.language)) {
            return Err(AlignmentError::LanguageNotInSet(track.language.to_string()));
        }

        let cues = dedup::prepare_cues(tracks);
        debug!("Prepared {} dialogue cues from {} tracks", cues.len(), tracks.len());

        let candidates = self.aligner.align(&cues);

        let segments: Vec<Segment> = candidates
            .into_iter()
            .filter_map(|candidate| self.merger.merge(candidate))
            .collect();

        debug!("Built {} complete segments", segments.len());
        Ok(segments)
    }

    /// Same as [`build_segments`](Self::build_segments) for cues that were already sequenced
    pub fn build_segments_from_cues(&self, cues: &[Cue]) -> Result<Vec<Segment>, AlignmentError> {
        if let Some(cue) = cues.iter().find(|c| !self.languages.contains(c.language)) {
            return Err(AlignmentError::LanguageNotInSet(cue.language.to_string()));
        }

        Ok(self
            .aligner
            .align(cues)
            .into_iter()
            .filter_map(|candidate| self.merger.merge(candidate))
            .collect())
    }
}
