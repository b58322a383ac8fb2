/*!
 * Line sanitizer: decides whether a subtitle event is spoken dialogue and
 * normalizes its text.
 *
 * Rejection rules run first, in order; the first one that fires turns the
 * line into an empty sentence. Surviving lines go through [`TEXT_RULES`],
 * an ordered list of independent text transformations.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::subtitle_processor::{MarkupType, RawCue, ass_plaintext};

// Speaker labels used for sign typesetting and opening/ending theme lyrics
static NON_DIALOGUE_ACTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)sign|(?:^|[_\-\s])(?:ed|op)(?:$|[_\-\s])").unwrap()
});

// Styles for background chatter, on-screen signs and title cards
static NON_DIALOGUE_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)top|sign|tipo tv|block").unwrap()
});

static POSITIONING_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"pos\(.*?\)|move\(.*?\)").unwrap()
});

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|\t").unwrap());

// Innermost bracket group: no other bracket of any variant inside
static INNERMOST_BRACKETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^()（）\[\]{}《》【】]*\)|\[[^()（）\[\]{}《》【】]*\]").unwrap()
});

static DECORATIVE_SYMBOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"●|→|ー?♪ー?|\x{202A}|\x{202C}|➡|&lrm;").unwrap()
});

static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]+").unwrap()
});

/// Dash, tilde and quote variants folded before NFKC
const PUNCTUATION_FOLDS: &[(char, &str)] = &[
    ('〜', "ー"),
    ('～', "ー"),
    ('’', "'"),
    ('”', "\""),
    ('“', "``"),
    ('―', "-"),
    ('‐', "-"),
    ('˗', "-"),
    ('֊', "-"),
    ('‑', "-"),
    ('‒', "-"),
    ('–', "-"),
    ('⁃', "-"),
    ('⁻', "-"),
    ('₋', "-"),
    ('−', "-"),
    ('﹣', "ー"),
    ('－', "ー"),
    ('—', "ー"),
    ('━', "ー"),
    ('─', "ー"),
];

/// Why a line is not treated as dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Comment or other non-dialogue event type
    NotDialogue,
    /// Actor label marks signs or theme song lyrics
    NonDialogueActor,
    /// Style marks background text, signs or title cards
    NonDialogueStyle,
    /// Line carries `pos(...)`/`move(...)` typesetting
    PositioningDirective,
}

/// One named step of text normalization
pub struct TextRule {
    pub name: &'static str,
    apply: fn(&str) -> String,
}

impl TextRule {
    pub fn apply(&self, text: &str) -> String {
        (self.apply)(text)
    }
}

/// Text normalization steps, applied in order
pub static TEXT_RULES: [TextRule; 6] = [
    TextRule { name: "fold_width_and_punctuation", apply: fold_width_and_punctuation },
    TextRule { name: "collapse_line_breaks", apply: collapse_line_breaks },
    TextRule { name: "strip_bracketed_annotations", apply: strip_bracketed_annotations },
    TextRule { name: "strip_decorative_symbols", apply: strip_decorative_symbols },
    TextRule { name: "strip_emoji", apply: strip_emoji },
    TextRule { name: "trim", apply: trim },
];

/// Run the rejection rules; `None` means the line is dialogue
pub fn classify(markup_type: MarkupType, actor: &str, style: &str, raw_text: &str) -> Option<RejectReason> {
    if markup_type != MarkupType::Dialogue {
        return Some(RejectReason::NotDialogue);
    }
    if !actor.is_empty() && NON_DIALOGUE_ACTOR.is_match(actor) {
        return Some(RejectReason::NonDialogueActor);
    }
    if !style.is_empty() && NON_DIALOGUE_STYLE.is_match(style) {
        return Some(RejectReason::NonDialogueStyle);
    }
    if POSITIONING_DIRECTIVE.is_match(raw_text) {
        return Some(RejectReason::PositioningDirective);
    }
    None
}

/// Classify a line and return its cleaned sentence, or `""` if it is not dialogue
pub fn classify_and_clean(raw_text: &str, actor: &str, style: &str, markup_type: MarkupType) -> String {
    if classify(markup_type, actor, style, raw_text).is_some() {
        return String::new();
    }
    clean_text(&ass_plaintext(raw_text))
}

/// Sanitize a parsed subtitle event
pub fn sanitize(cue: &RawCue) -> String {
    classify_and_clean(&cue.raw_text, &cue.actor, &cue.style, cue.markup_type)
}

/// Apply every text rule in order
pub fn clean_text(text: &str) -> String {
    TEXT_RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

fn fold_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match PUNCTUATION_FOLDS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// Half-width forms become full-width (and full-width ASCII becomes ASCII) through NFKC
pub fn fold_width_and_punctuation(text: &str) -> String {
    // Folding again after NFKC catches dashes that NFKC itself produces
    fold_punctuation(&fold_punctuation(text).nfkc().collect::<String>())
}

pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").into_owned()
}

/// Remove innermost `(...)`/`[...]` groups until none are left
pub fn strip_bracketed_annotations(text: &str) -> String {
    let mut current = text.to_string();
    while INNERMOST_BRACKETS.is_match(&current) {
        current = INNERMOST_BRACKETS.replace_all(&current, "").into_owned();
    }
    current
}

pub fn strip_decorative_symbols(text: &str) -> String {
    DECORATIVE_SYMBOLS.replace_all(text, "").into_owned()
}

pub fn strip_emoji(text: &str) -> String {
    EMOJI.replace_all(text, "").into_owned()
}

fn trim(text: &str) -> String {
    text.trim().to_string()
}
