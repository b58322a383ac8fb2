/*!
 * Translation fallback: fills secondary languages that have no subtitle text
 * by machine-translating the primary sentence.
 */

use log::{debug, warn};

use super::merger::Segment;
use crate::errors::ProviderError;
use crate::language_utils::{Language, LanguageSet};
use crate::providers::Translator;

/// A translation that could not be made for one language of one segment
#[derive(Debug)]
pub struct FallbackFailure {
    pub segment_id: usize,
    pub language: Language,
    pub error: ProviderError,
}

impl std::fmt::Display for FallbackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "segment {} [{}]: {}", self.segment_id, self.language, self.error)
    }
}

/// Fill empty secondary slots of `segment` through `translator`.
///
/// Without a translator nothing changes. Failures are returned, not raised:
/// the slot stays empty and the segment is still usable.
pub async fn apply_translation_fallback(
    segment: &mut Segment,
    languages: &LanguageSet,
    translator: Option<&dyn Translator>,
) -> Vec<FallbackFailure> {
    let mut failures = Vec::new();

    let Some(translator) = translator else {
        return failures;
    };

    let primary = languages.primary();
    let source_text = match segment.sentence(primary) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return failures,
    };

    for &target in languages.secondary() {
        let slot = segment.texts.get_or_insert_with(target, Default::default);
        if slot.has_text() {
            continue;
        }

        let result = translator
            .translate(&source_text, primary, target)
            .await
            .and_then(|translated| match translated.trim() {
                "" => Err(ProviderError::ParseError("empty translation".to_string())),
                trimmed => Ok(trimmed.to_string()),
            });

        match result {
            Ok(translated) => {
                debug!("[{} - {}] {}", translator.name(), target, translated);
                slot.merged_sentence = Some(translated);
                slot.is_machine_translated = Some(true);
            }
            Err(error) => {
                let failure = FallbackFailure {
                    segment_id: segment.segment_id,
                    language: target,
                    error,
                };
                warn!("Translation fallback failed for {}", failure);
                failures.push(failure);
            }
        }
    }

    failures
}
