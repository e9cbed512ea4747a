/*!
 * Tests for error classification and conversion
 */

use subpair::errors::{AppError, ParseError, ProviderError, ReconciliationError, TranslationError};

#[test]
fn test_provider_error_isRetryable_shouldSeparateTransientFailures() {
    assert!(ProviderError::Timeout(30).is_retryable());
    assert!(ProviderError::ConnectionError("reset".into()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".into()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".into() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: "bad".into() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("key".into()).is_retryable());
    assert!(!ProviderError::ParseError("json".into()).is_retryable());
}

#[test]
fn test_translation_error_fromProvider_shouldKeepRetryability() {
    let err: TranslationError = ProviderError::Timeout(5).into();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("5 seconds"));

    let err: TranslationError = ReconciliationError { expected: 3, actual: 1 }.into();
    assert!(!err.is_retryable());
    assert_eq!(err.to_string(), "Reconciliation error: Expected 3 translated segments but got 1");
}

#[test]
fn test_parse_error_display_shouldNameLine() {
    let err = ParseError::Malformed {
        line: 12,
        message: "cue 4 has no timing line".into(),
    };
    assert_eq!(err.to_string(), "Malformed subtitle at line 12: cue 4 has no timing line");
}

#[test]
fn test_app_error_conversions_shouldWrapSources() {
    let app: AppError = ParseError::NoCues.into();
    assert!(matches!(app, AppError::Parse(ParseError::NoCues)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app.to_string(), "Unknown error: boom");
}
