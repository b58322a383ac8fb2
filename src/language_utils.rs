use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AlignmentError;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating, normalizing, and
/// matching ISO 639-1 (2-letter) and ISO 639-2 (3-letter) language codes,
/// plus the fixed set of languages the segmenter knows how to bundle.
/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form.
/// Container tags such as `fre` and `ger` use the bibliographic form.
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if IsoLanguage::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if IsoLanguage::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = IsoLanguage::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if IsoLanguage::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if IsoLanguage::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        let part2t = part2b_to_part2t(&normalized_code).unwrap_or(&normalized_code);

        if let Some(lang) = IsoLanguage::from_639_3(part2t) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(code_639_1.to_string());
            }
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = IsoLanguage::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

// @enum: Languages the segmenter can bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl Language {
    /// Number of supported languages
    pub const COUNT: usize = 7;

    /// Every supported language, in slot order
    pub const ALL: [Language; Language::COUNT] = [
        Language::Japanese,
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    // @returns: ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
        }
    }

    // @returns: Uppercase English name used in output column headers
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Japanese => "JAPANESE",
            Self::English => "ENGLISH",
            Self::Spanish => "SPANISH",
            Self::French => "FRENCH",
            Self::German => "GERMAN",
            Self::Italian => "ITALIAN",
            Self::Portuguese => "PORTUGUESE",
        }
    }

    // @returns: Tag used in the contributing-id column (`SUBS_<TAG>_IDS`)
    pub fn ids_column_tag(self) -> &'static str {
        match self {
            // Dataset consumers read the Japanese id column as SUBS_JP_IDS
            Self::Japanese => "JP",
            Self::English => "EN",
            Self::Spanish => "ES",
            Self::French => "FR",
            Self::German => "DE",
            Self::Italian => "IT",
            Self::Portuguese => "PT",
        }
    }

    /// Resolve any ISO 639-1/639-2 code (or 639-2/B container tag) to a supported language
    pub fn from_code(code: &str) -> Option<Language> {
        let part1 = normalize_to_part1_or_part2t(code).ok()?;
        Self::ALL.into_iter().find(|lang| lang.code() == part1)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s).ok_or_else(|| anyhow!("Unsupported language: {}", s))
    }
}

/// One slot per supported language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageMap<T> {
    slots: [Option<T>; Language::COUNT],
}

impl<T> Default for LanguageMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> LanguageMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding a single value
    pub fn with(language: Language, value: T) -> Self {
        let mut map = Self::default();
        map.insert(language, value);
        map
    }

    pub fn get(&self, language: Language) -> Option<&T> {
        self.slots[language.index()].as_ref()
    }

    pub fn get_mut(&mut self, language: Language) -> Option<&mut T> {
        self.slots[language.index()].as_mut()
    }

    pub fn insert(&mut self, language: Language, value: T) -> Option<T> {
        self.slots[language.index()].replace(value)
    }

    pub fn take(&mut self, language: Language) -> Option<T> {
        self.slots[language.index()].take()
    }

    pub fn contains(&self, language: Language) -> bool {
        self.slots[language.index()].is_some()
    }

    pub fn get_or_insert_with(&mut self, language: Language, f: impl FnOnce() -> T) -> &mut T {
        self.slots[language.index()].get_or_insert_with(f)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots in language order
    pub fn iter(&self) -> impl Iterator<Item = (Language, &T)> {
        Language::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(lang, slot)| slot.as_ref().map(|value| (lang, value)))
    }
}

/// The primary language plus the secondary languages a segment may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    primary: Language,
    secondary: Vec<Language>,
}

impl LanguageSet {
    /// Build a set; requires at least one secondary language distinct from the primary
    pub fn new(primary: Language, secondary: Vec<Language>) -> Result<Self, AlignmentError> {
        if secondary.contains(&primary) {
            return Err(AlignmentError::PrimaryListedAsSecondary(primary.to_string()));
        }

        let mut deduped = Vec::with_capacity(secondary.len());
        for lang in secondary {
            if !deduped.contains(&lang) {
                deduped.push(lang);
            }
        }

        if deduped.is_empty() {
            return Err(AlignmentError::NoSecondaryLanguage);
        }

        Ok(Self { primary, secondary: deduped })
    }

    pub fn primary(&self) -> Language {
        self.primary
    }

    pub fn secondary(&self) -> &[Language] {
        &self.secondary
    }

    pub fn contains(&self, language: Language) -> bool {
        language == self.primary || self.secondary.contains(&language)
    }

    /// Primary first, then secondaries in configured order
    pub fn all(&self) -> impl Iterator<Item = Language> + '_ {
        std::iter::once(self.primary).chain(self.secondary.iter().copied())
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self {
            primary: Language::Japanese,
            secondary: vec![Language::Spanish, Language::English],
        }
    }
}
