use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils::Language;
use crate::providers::Translator;

const FREE_API_URL: &str = "https://api-free.deepl.com";
const PRO_API_URL: &str = "https://api.deepl.com";

// DeepL answers 456 when the character quota is used up
const QUOTA_EXCEEDED_STATUS: u16 = 456;

/// DeepL client for the `/v2/translate` endpoint
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// Auth key; keys ending in `:fx` belong to free accounts
    api_key: String,
    /// Base URL without the `/v2/...` path
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds, doubled per attempt
    backoff_base_ms: u64,
}

/// DeepL translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest {
    /// Texts to translate
    pub text: Vec<String>,
    /// Source language code (e.g. `JA`)
    pub source_lang: String,
    /// Target language code (e.g. `EN-US`)
    pub target_lang: String,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<Translation>,
}

/// One translated text
#[derive(Debug, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

/// Source language code as DeepL expects it
pub fn source_code(language: Language) -> String {
    language.code().to_uppercase()
}

/// Target language code; English and Portuguese need a regional variant
pub fn target_code(language: Language) -> String {
    match language {
        Language::English => "EN-US".to_string(),
        Language::Portuguese => "PT-BR".to_string(),
        other => other.code().to_uppercase(),
    }
}

/// Pick the API base URL from the configured endpoint or the key type
pub fn resolve_endpoint(api_key: &str, endpoint: &str) -> String {
    if !endpoint.is_empty() {
        endpoint.trim_end_matches('/').to_string()
    } else if api_key.ends_with(":fx") {
        FREE_API_URL.to_string()
    } else {
        PRO_API_URL.to_string()
    }
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let endpoint = resolve_endpoint(&api_key, &endpoint.into());
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key,
            endpoint,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Create a client from the translation section of the config
    pub fn from_config(config: &TranslationConfig) -> Self {
        let endpoint = resolve_endpoint(&config.api_key, &config.endpoint);
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint,
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify_status(status: StatusCode, message: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationError(message),
            QUOTA_EXCEEDED_STATUS => ProviderError::QuotaExceeded(message),
            code => ProviderError::ApiError {
                status_code: code,
                message,
            },
        }
    }

    /// Send a translate request with retry logic
    pub async fn complete(&self, request: &TranslateRequest) -> Result<TranslateResponse, ProviderError> {
        let url = format!("{}/v2/translate", self.endpoint);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            let response_result = self
                .client
                .post(&url)
                .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
                .json(request)
                .send()
                .await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<TranslateResponse>()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());

                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        // Transient, try again
                        warn!(
                            "DeepL API error ({}): {} - attempt {}/{}",
                            status,
                            error_text,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(Self::classify_status(status, error_text));
                    } else {
                        error!("DeepL API error ({}): {}", status, error_text);
                        return Err(Self::classify_status(status, error_text));
                    }
                }
                Err(e) => {
                    warn!(
                        "DeepL network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!("DeepL request failed after {} attempts", self.max_retries + 1))
        }))
    }
}

#[async_trait]
impl Translator for DeepL {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            text: vec![text.to_string()],
            source_lang: source_code(source),
            target_lang: target_code(target),
        };
        debug!("DeepL {} -> {}: {}", request.source_lang, request.target_lang, text);

        let response = self.complete(&request).await?;
        response
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::ParseError("Response contained no translations".to_string()))
    }

    fn name(&self) -> &str {
        "DeepL"
    }
}
