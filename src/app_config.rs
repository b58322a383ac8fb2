use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::language_utils::{Language, LanguageSet};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language every segment must contain (ISO code)
    #[serde(default = "default_primary_language")]
    pub primary_language: String,

    /// Languages paired with the primary one, in output column order
    #[serde(default = "default_secondary_languages")]
    pub secondary_languages: Vec<String>,

    /// Timeline alignment settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Translation fallback config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Output and clip generation settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: No machine translation, missing languages stay empty
    #[default]
    None,
    // @provider: DeepL
    DeepL,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::None => "None",
            Self::DeepL => "DeepL",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::DeepL => "deepl".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "deepl" => Ok(Self::DeepL),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Timeline alignment settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlignmentConfig {
    /// Overlapping cues whose start lies closer than this to the window end
    /// are treated as sequential utterances
    #[serde(default = "default_gap_threshold_ms")]
    pub gap_threshold_ms: i64,

    /// Emit the segment still open when the cue stream ends
    #[serde(default = "default_true")]
    pub flush_trailing_segment: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            gap_threshold_ms: default_gap_threshold_ms(),
            flush_trailing_segment: true,
        }
    }
}

/// Translation fallback configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    // @field: API key (DeepL auth key)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL; empty picks the free or pro endpoint from the key
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Output and clip generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Name of the per-episode segment table
    #[serde(default = "default_tsv_file_name")]
    pub tsv_file_name: String,

    /// Audio clip extension (passed to ffmpeg through the file name)
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    /// Screenshot extension
    #[serde(default = "default_screenshot_extension")]
    pub screenshot_extension: String,

    /// Parse and align subtitles but skip clip generation
    #[serde(default)]
    pub dry_run: bool,

    /// Process several episodes at the same time
    #[serde(default)]
    pub parallel_episodes: bool,

    /// Upper bound on episodes processed at once when parallel
    #[serde(default = "default_max_parallel_episodes")]
    pub max_parallel_episodes: usize,

    /// Timeout for each ffmpeg/ffprobe invocation
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tsv_file_name: default_tsv_file_name(),
            audio_extension: default_audio_extension(),
            screenshot_extension: default_screenshot_extension(),
            dry_run: false,
            parallel_episodes: false,
            max_parallel_episodes: default_max_parallel_episodes(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
        }
    }
}

/// Information about a subtitle track inside a container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtitleInfo {
    /// The index/id of the subtitle track
    pub index: usize,
    /// The codec name of the subtitle track
    pub codec_name: String,
    /// The language code (ISO 639-1 or ISO 639-2)
    pub language: Option<String>,
    /// The title of the subtitle track if available
    pub title: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_primary_language() -> String {
    "ja".to_string()
}

fn default_secondary_languages() -> Vec<String> {
    vec!["es".to_string(), "en".to_string()]
}

fn default_gap_threshold_ms() -> i64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_true() -> bool {
    true
}

fn default_tsv_file_name() -> String {
    "data.tsv".to_string()
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

fn default_screenshot_extension() -> String {
    "webp".to_string()
}

fn default_max_parallel_episodes() -> usize {
    6
}

fn default_ffmpeg_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.language_set()?;

        if self.alignment.gap_threshold_ms < 0 {
            return Err(anyhow!("alignment.gap_threshold_ms must not be negative"));
        }

        if self.output.max_parallel_episodes == 0 {
            return Err(anyhow!("output.max_parallel_episodes must be at least 1"));
        }

        if self.translation.provider == TranslationProvider::DeepL && self.translation.api_key.is_empty() {
            return Err(anyhow!("Translation API key is required for DeepL provider"));
        }

        Ok(())
    }

    /// Resolve the configured codes into the fixed language set
    pub fn language_set(&self) -> Result<LanguageSet> {
        let resolve = |code: &str| -> Result<Language> {
            // Surface "not an ISO code" separately from "not supported"
            crate::language_utils::get_language_name(code)?;
            code.parse::<Language>()
        };

        let primary = resolve(&self.primary_language)?;
        let secondary = self
            .secondary_languages
            .iter()
            .map(|code| resolve(code))
            .collect::<Result<Vec<_>>>()?;

        Ok(LanguageSet::new(primary, secondary)?)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            primary_language: default_primary_language(),
            secondary_languages: default_secondary_languages(),
            alignment: AlignmentConfig::default(),
            translation: TranslationConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
