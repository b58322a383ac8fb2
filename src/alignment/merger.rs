/*!
 * Segment merger.
 *
 * Collapses the cues of one candidate into a single rendition per language
 * and drops candidates that cannot form a bilingual pair.
 */

use log::debug;

use super::Cue;
use super::aligner::CandidateSegment;
use crate::language_utils::{Language, LanguageMap, LanguageSet};

// @const: Separator between merged Japanese-style sentences (ideographic space)
const PRIMARY_JOINER: &str = "\u{3000}";
const SECONDARY_JOINER: &str = " ";

/// Merged text of one language inside a segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageText {
    // @field: Joined sentence, `None` when the language had no cue
    pub merged_sentence: Option<String>,
    // @field: Sorted distinct speaker labels, comma separated
    pub actors: String,
    // @field: sub_ids of the cues merged into this text
    pub contributing_ids: Vec<usize>,
    // @field: Some(false) from subtitles, Some(true) from the translator
    pub is_machine_translated: Option<bool>,
}

impl LanguageText {
    /// Whether the slot carries usable text
    pub fn has_text(&self) -> bool {
        self.merged_sentence.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// `contributing_ids` as a comma separated list
    pub fn ids_string(&self) -> String {
        self.contributing_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One aligned, bilingual unit of output
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    // @field: sub_id of the earliest primary-language cue
    pub segment_id: usize,
    pub start_ms: i64,
    pub end_ms: i64,
    // @field: One slot for every language of the configured set
    pub texts: LanguageMap<LanguageText>,
}

impl Segment {
    pub fn text(&self, language: Language) -> Option<&LanguageText> {
        self.texts.get(language)
    }

    pub fn sentence(&self, language: Language) -> Option<&str> {
        self.texts.get(language).and_then(|t| t.merged_sentence.as_deref())
    }

    /// Screenshot timestamp: the middle of the segment
    pub fn midpoint_ms(&self) -> i64 {
        (self.start_ms + self.end_ms) / 2
    }
}

/// True when `cue` repeats a sentence already in `list` and directly continues its last cue.
///
/// Two characters saying the same line in chorus often come out as back to
/// back identical events.
pub fn is_contiguous_duplicate(list: &[Cue], cue: &Cue) -> bool {
    let Some(last) = list.last() else {
        return false;
    };
    last.end_ms == cue.start_ms && list.iter().any(|saved| saved.sentence == cue.sentence)
}

/// Strip and join the sentences of one language, then tidy quotes and dashes
pub fn join_sentences(cues: &[Cue], joiner: &str) -> String {
    let joined = cues
        .iter()
        .map(|cue| cue.sentence.trim())
        .collect::<Vec<_>>()
        .join(joiner);

    strip_redundant_symbols(&joined.replace("``", "\"").replace("''", "\""))
}

/// Delete dashes and spaces made redundant by neighbouring punctuation.
///
/// Every predicate looks at the text as it was before any deletion.
pub fn strip_redundant_symbols(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let after_ellipsis = i >= 3 && chars[i - 3..i] == ['.', '.', '.'];

        let redundant = match c {
            '-' => i == 0 || matches!(prev, Some('.' | '?' | '!' | ',' | 'ー' | '-')),
            '。' => after_ellipsis,
            c if c.is_whitespace() => matches!(prev, Some(p) if p == '。' || p.is_whitespace()),
            _ => false,
        };

        if !redundant {
            out.push(c);
        }
    }

    out
}

/// Sorted distinct speaker labels, tabs removed, empties skipped
pub fn aggregate_actors(cues: &[Cue]) -> String {
    let mut actors: Vec<String> = cues
        .iter()
        .map(|cue| cue.actor.replace('\t', "").trim().to_string())
        .filter(|actor| !actor.is_empty())
        .collect();
    actors.sort();
    actors.dedup();
    actors.join(",")
}

/// Turns candidates into segments
#[derive(Debug, Clone)]
pub struct SegmentMerger {
    languages: LanguageSet,
}

impl SegmentMerger {
    pub fn new(languages: LanguageSet) -> Self {
        Self { languages }
    }

    fn merge_language(&self, language: Language, cues: &[Cue]) -> LanguageText {
        let joiner = if language == self.languages.primary() {
            PRIMARY_JOINER
        } else {
            SECONDARY_JOINER
        };

        let merged = join_sentences(cues, joiner);
        let is_machine_translated = if merged.is_empty() { None } else { Some(false) };

        LanguageText {
            merged_sentence: Some(merged),
            actors: aggregate_actors(cues),
            contributing_ids: cues.iter().map(|cue| cue.sub_id).collect(),
            is_machine_translated,
        }
    }

    /// Merge a candidate; `None` when it lacks the primary language or every secondary one
    pub fn merge(&self, candidate: CandidateSegment) -> Option<Segment> {
        let primary = self.languages.primary();
        let has_cues = |lang: Language| candidate.cues.get(lang).is_some_and(|list| !list.is_empty());

        let complete = has_cues(primary) && self.languages.secondary().iter().any(|&lang| has_cues(lang));
        if !complete {
            debug!(
                "Discarding candidate {}-{} ms: no {}/secondary pair ({} cues)",
                candidate.start_ms,
                candidate.end_ms,
                primary,
                candidate.cue_count()
            );
            return None;
        }

        let mut texts = LanguageMap::new();
        for language in self.languages.all() {
            let text = match candidate.cues.get(language) {
                Some(cues) if !cues.is_empty() => self.merge_language(language, cues),
                _ => LanguageText::default(),
            };
            texts.insert(language, text);
        }

        let segment_id = candidate
            .cues
            .get(primary)
            .and_then(|cues| cues.iter().map(|cue| cue.sub_id).min())?;

        Some(Segment {
            segment_id,
            start_ms: candidate.start_ms,
            end_ms: candidate.end_ms,
            texts,
        })
    }
}
