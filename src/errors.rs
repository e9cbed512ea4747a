/*!
 * Error types for the subpair application.
 *
 * Library-level failures are modelled with thiserror enums so callers can
 * tell fatal input problems apart from recoverable translation failures.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
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
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Whether a retry has a reasonable chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::ConnectionError(_)
            | Self::RateLimitExceeded(_)
            | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors raised while reading an SRT file. Always fatal for that file.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file could not be read
    #[error("Cannot read subtitle file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8
    #[error("Subtitle file {path} is not valid UTF-8: {source}")]
    InvalidEncoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Structural problem in the SRT content
    #[error("Malformed subtitle at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// The file parsed but held no cue at all
    #[error("No subtitle cues found")]
    NoCues,
}

/// A translated batch came back with a different number of segments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Expected {expected} translated segments but got {actual}")]
pub struct ReconciliationError {
    pub expected: usize,
    pub actual: usize,
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The backend answered with nothing usable
    #[error("Empty translation returned")]
    EmptyResponse,

    /// Batch output could not be aligned with its blocks
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),
}

impl TranslationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::EmptyResponse => true,
            Self::Reconciliation(_) => false,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Input could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
