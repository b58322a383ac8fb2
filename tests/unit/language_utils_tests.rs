/*!
 * Tests for language utility functions
 */

use subsplit::app_config::SubtitleInfo;
use subsplit::errors::AlignmentError;
use subsplit::language_utils::{
    Language, LanguageCodeType, LanguageMap, LanguageSet, get_language_name, language_codes_match,
    normalize_to_part1_or_part2t, normalize_to_part2t, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validateLanguageCode_withValidCodes_shouldReturnCorrectType() {
    assert!(matches!(validate_language_code("ja").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("jpn").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code(" ES ").unwrap(), LanguageCodeType::Part1));

    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

/// Test normalization of language codes
#[test]
fn test_normalize_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("ja").unwrap(), "jpn");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part1_or_part2t("jpn").unwrap(), "ja");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("SPA").unwrap(), "es");
}

/// Test matching of different language code formats
#[test]
fn test_languageCodesMatch_withEquivalentCodes_shouldReturnTrue() {
    assert!(language_codes_match("ja", "jpn"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match(" EN ", "eng"));
    assert!(!language_codes_match("ja", "spa"));
    assert!(!language_codes_match("??", "en"));
}

/// Test retrieval of language names from codes
#[test]
fn test_getLanguageName_withValidCodes_shouldReturnName() {
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert_eq!(get_language_name("eng").unwrap(), "English");
    assert!(get_language_name("12").is_err());
}

/// Any ISO form of a supported language resolves to it
#[test]
fn test_languageFromCode_withIsoForms_shouldResolve() {
    assert_eq!(Language::from_code("ja"), Some(Language::Japanese));
    assert_eq!(Language::from_code("jpn"), Some(Language::Japanese));
    assert_eq!(Language::from_code("spa"), Some(Language::Spanish));
    assert_eq!(Language::from_code("ger"), Some(Language::German));
    assert_eq!(Language::from_code("PT"), Some(Language::Portuguese));
}

/// Valid but unsupported codes do not resolve
#[test]
fn test_languageFromCode_withUnsupportedLanguage_shouldReturnNone() {
    assert_eq!(Language::from_code("zh"), None);
    assert_eq!(Language::from_code("und"), None);
    assert_eq!(Language::from_code(""), None);
}

/// Parsing goes through the same code resolution
#[test]
fn test_languageFromStr_withCodes_shouldParse() {
    assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
    assert!("klingon".parse::<Language>().is_err());
}

/// Codes, column names and id tags used in the output
#[test]
fn test_languageLabels_withJapanese_shouldUseJpTag() {
    assert_eq!(Language::Japanese.code(), "ja");
    assert_eq!(Language::Japanese.to_string(), "ja");
    assert_eq!(Language::Japanese.column_name(), "JAPANESE");
    assert_eq!(Language::Japanese.ids_column_tag(), "JP");
    assert_eq!(Language::Spanish.ids_column_tag(), "ES");
}

/// Languages serialize as their ISO 639-1 code
#[test]
fn test_languageSerde_withJson_shouldUseCode() {
    assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"en\"");
    let parsed: Language = serde_json::from_str("\"fr\"").unwrap();
    assert_eq!(parsed, Language::French);
}

/// Map slots are independent and iterate in language order
#[test]
fn test_languageMap_withInsertAndTake_shouldTrackSlots() {
    let mut map = LanguageMap::new();
    assert!(map.is_empty());

    map.insert(Language::English, 2);
    map.insert(Language::Japanese, 1);
    assert_eq!(map.insert(Language::English, 3), Some(2));

    let items: Vec<(Language, i32)> = map.iter().map(|(lang, v)| (lang, *v)).collect();
    assert_eq!(items, vec![(Language::Japanese, 1), (Language::English, 3)]);

    *map.get_or_insert_with(Language::Spanish, || 0) += 5;
    assert_eq!(map.get(Language::Spanish), Some(&5));

    assert_eq!(map.take(Language::Japanese), Some(1));
    assert!(!map.contains(Language::Japanese));
}

/// The set keeps the primary first and secondaries in configured order
#[test]
fn test_languageSet_withDuplicateSecondaries_shouldDedup() {
    let set = LanguageSet::new(
        Language::Japanese,
        vec![Language::English, Language::Spanish, Language::English],
    )
    .unwrap();

    assert_eq!(set.secondary(), &[Language::English, Language::Spanish]);
    let all: Vec<Language> = set.all().collect();
    assert_eq!(all, vec![Language::Japanese, Language::English, Language::Spanish]);
    assert!(set.contains(Language::Spanish));
    assert!(!set.contains(Language::French));
}

/// A set needs a secondary language different from the primary one
#[test]
fn test_languageSet_withInvalidSecondaries_shouldFail() {
    assert_eq!(
        LanguageSet::new(Language::Japanese, vec![]),
        Err(AlignmentError::NoSecondaryLanguage)
    );
    assert_eq!(
        LanguageSet::new(Language::Japanese, vec![Language::Japanese, Language::English]),
        Err(AlignmentError::PrimaryListedAsSecondary("ja".to_string()))
    );
}

/// The default set bundles Japanese with Spanish and English
#[test]
fn test_languageSet_default_shouldBeJapaneseSpanishEnglish() {
    let set = LanguageSet::default();
    assert_eq!(set.primary(), Language::Japanese);
    assert_eq!(set.secondary(), &[Language::Spanish, Language::English]);
}

/// Test container track tags resolve with any ISO form
#[test]
fn test_subtitleTrackSelection_withIsoCodes_shouldMatchCorrectly() {
    let tracks = vec![
        SubtitleInfo {
            index: 2,
            codec_name: "ass".to_string(),
            language: Some("jpn".to_string()),
            title: None,
        },
        SubtitleInfo {
            index: 3,
            codec_name: "subrip".to_string(),
            language: Some("spa".to_string()),
            title: Some("Latinoamericano".to_string()),
        },
        SubtitleInfo {
            index: 4,
            codec_name: "subrip".to_string(),
            language: None,
            title: Some("Signs".to_string()),
        },
    ];

    let resolved: Vec<(usize, Language)> = tracks
        .iter()
        .filter_map(|t| t.language.as_deref().and_then(Language::from_code).map(|l| (t.index, l)))
        .collect();

    assert_eq!(resolved, vec![(2, Language::Japanese), (3, Language::Spanish)]);
}
