/*!
 * Tests for the translator implementations
 */

use subsplit::app_config::{TranslationConfig, TranslationProvider};
use subsplit::errors::ProviderError;
use subsplit::language_utils::Language;
use subsplit::providers::Translator;
use subsplit::providers::deepl::{DeepL, TranslateRequest, TranslateResponse, resolve_endpoint, source_code, target_code};
use subsplit::providers::mock::MockTranslator;

/// Test the DeepL provider against the live API
#[tokio::test]
#[ignore]
async fn test_deepl_provider_withValidApiKey_shouldTranslate() {
    // This test should only run if an API key is provided
    let api_key = std::env::var("DEEPL_TOKEN").unwrap_or_default();
    if api_key.is_empty() {
        return;
    }

    let client = DeepL::new(api_key, "");
    let translated = client
        .translate("おはようございます", Language::Japanese, Language::English)
        .await
        .unwrap();

    assert!(!translated.is_empty());
    println!("DeepL response: {}", translated);
}

/// Free keys go to the free endpoint, others to pro
#[test]
fn test_resolveEndpoint_withKeyTypes_shouldPickHost() {
    assert_eq!(resolve_endpoint("abc:fx", ""), "https://api-free.deepl.com");
    assert_eq!(resolve_endpoint("abc", ""), "https://api.deepl.com");
    assert_eq!(resolve_endpoint("abc:fx", "http://localhost:8080/"), "http://localhost:8080");
}

/// Endpoint selection is also applied when building from config
#[test]
fn test_deeplFromConfig_withFreeKey_shouldUseFreeEndpoint() {
    let config = TranslationConfig {
        provider: TranslationProvider::DeepL,
        api_key: "key:fx".to_string(),
        ..TranslationConfig::default()
    };

    let client = DeepL::from_config(&config);

    assert_eq!(client.endpoint(), "https://api-free.deepl.com");
    assert_eq!(client.name(), "DeepL");
}

/// Language codes are upper case, with regional targets where DeepL needs them
#[test]
fn test_languageCodes_withDeepLTargets_shouldUseVariants() {
    assert_eq!(source_code(Language::Japanese), "JA");
    assert_eq!(source_code(Language::English), "EN");
    assert_eq!(target_code(Language::English), "EN-US");
    assert_eq!(target_code(Language::Portuguese), "PT-BR");
    assert_eq!(target_code(Language::Spanish), "ES");
}

/// Request and response bodies match the DeepL JSON shape
#[test]
fn test_translateBodies_withJson_shouldMatchApiShape() {
    let request = TranslateRequest {
        text: vec!["こんにちは".to_string()],
        source_lang: "JA".to_string(),
        target_lang: "ES".to_string(),
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["text"][0], "こんにちは");
    assert_eq!(value["target_lang"], "ES");

    let response: TranslateResponse = serde_json::from_str(
        r#"{"translations":[{"detected_source_language":"JA","text":"Hola"}]}"#,
    )
    .unwrap();
    assert_eq!(response.translations[0].text, "Hola");
    assert_eq!(response.translations[0].detected_source_language.as_deref(), Some("JA"));
}

/// An unreachable endpoint gives a connection error after the retries
#[tokio::test]
async fn test_deeplTranslate_withUnreachableEndpoint_shouldReturnConnectionError() {
    let config = TranslationConfig {
        provider: TranslationProvider::DeepL,
        api_key: "key".to_string(),
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
        retry_count: 1,
        retry_backoff_ms: 1,
    };
    let client = DeepL::from_config(&config);

    let result = client.translate("テスト", Language::Japanese, Language::English).await;

    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

/// The working mock tags output with the target code
#[tokio::test]
async fn test_mockTranslator_working_shouldTagTarget() {
    let translator = MockTranslator::working();

    let result = translator
        .translate("こんにちは", Language::Japanese, Language::Spanish)
        .await
        .unwrap();

    assert_eq!(result, "[es] こんにちは");
    assert_eq!(translator.name(), "Mock");
}

/// The failing mock always errors
#[tokio::test]
async fn test_mockTranslator_failing_shouldError() {
    let translator = MockTranslator::failing();

    for _ in 0..3 {
        assert!(translator.translate("x", Language::Japanese, Language::English).await.is_err());
    }
    assert_eq!(translator.request_count(), 3);
}
