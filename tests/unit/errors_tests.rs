/*!
 * Tests for error types
 */

use std::io;
use subsplit::errors::{AlignmentError, AppError, MediaError, ProviderError, SubtitleError};

/// Test provider error messages
#[test]
fn test_providerError_display_shouldIncludeDetails() {
    let error = ProviderError::ApiError {
        status_code: 456,
        message: "Quota exceeded".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 456 - Quota exceeded");

    let error = ProviderError::AuthenticationError("bad key".to_string());
    assert_eq!(error.to_string(), "Authentication error: bad key");
}

/// Test subtitle error messages
#[test]
fn test_subtitleError_display_shouldIncludeDetails() {
    let error = SubtitleError::InvalidTimestamp("0:99:00.00".to_string());
    assert_eq!(error.to_string(), "Invalid timestamp '0:99:00.00'");
}

/// Test alignment contract violations
#[test]
fn test_alignmentError_display_shouldNameLanguage() {
    let error = AlignmentError::LanguageNotInSet("fr".to_string());
    assert!(error.to_string().contains("fr"));
    assert_eq!(
        AlignmentError::NoSecondaryLanguage.to_string(),
        "At least one secondary language is required"
    );
}

/// Test media error messages
#[test]
fn test_mediaError_display_shouldNameTool() {
    let error = MediaError::Timeout {
        tool: "ffmpeg".to_string(),
        secs: 120,
    };
    assert_eq!(error.to_string(), "ffmpeg timed out after 120 seconds");
}

/// Test conversion of domain errors into AppError
#[test]
fn test_appError_fromDomainErrors_shouldWrap() {
    let app_error: AppError = ProviderError::ConnectionError("reset".to_string()).into();
    assert!(matches!(app_error, AppError::Provider(_)));
    assert_eq!(app_error.to_string(), "Provider error: Connection error: reset");

    let app_error: AppError = AlignmentError::NoSecondaryLanguage.into();
    assert!(matches!(app_error, AppError::Alignment(_)));

    let app_error: AppError = MediaError::Spawn {
        tool: "ffprobe".to_string(),
        message: "not found".to_string(),
    }
    .into();
    assert!(matches!(app_error, AppError::Media(_)));

    let app_error: AppError = SubtitleError::Malformed("empty".to_string()).into();
    assert!(matches!(app_error, AppError::Subtitle(_)));
}

/// Test conversion of io and anyhow errors
#[test]
fn test_appError_fromIoAndAnyhow_shouldConvert() {
    let app_error: AppError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(app_error, AppError::File(_)));

    let app_error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app_error.to_string(), "Unknown error: boom");
}

/// Test that errors propagate with ?
#[test]
fn test_appError_withQuestionMark_shouldPropagate() {
    fn inner() -> Result<(), AppError> {
        Err(ProviderError::QuotaExceeded("limit".to_string()))?;
        Ok(())
    }

    assert!(matches!(inner(), Err(AppError::Provider(ProviderError::QuotaExceeded(_)))));
}
