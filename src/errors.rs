/*!
 * Error types for the subsplit application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The translation quota of the account is used up
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider cannot handle this language pair
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Errors that can occur while reading subtitle tracks
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A timestamp could not be parsed
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// The subtitle format is not one we can parse
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// The file parsed but did not contain usable events
    #[error("Malformed subtitle track: {0}")]
    Malformed(String),
}

/// Contract violations raised by the alignment core
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    /// The language set has no secondary language
    #[error("At least one secondary language is required")]
    NoSecondaryLanguage,

    /// The primary language was also listed as secondary
    #[error("Language {0} cannot be both primary and secondary")]
    PrimaryListedAsSecondary(String),

    /// A track was supplied for a language outside the configured set
    #[error("Track language {0} is not part of the configured language set")]
    LanguageNotInSet(String),
}

/// Errors from clip and screenshot generation
#[derive(Error, Debug)]
pub enum MediaError {
    /// The external tool could not be started
    #[error("Failed to run {tool}: {message}")]
    Spawn {
        /// Tool name (ffmpeg, ffprobe)
        tool: String,
        /// Underlying error
        message: String,
    },

    /// The external tool exited with a failure status
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Tool name (ffmpeg, ffprobe)
        tool: String,
        /// Filtered stderr
        message: String,
    },

    /// The external tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Tool name (ffmpeg, ffprobe)
        tool: String,
        /// Timeout that was exceeded
        secs: u64,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the alignment core
    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Error from clip generation
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
