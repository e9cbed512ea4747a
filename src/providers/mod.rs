/*!
 * Translation backends.
 *
 * - `deepl`: DeepL REST API
 * - `ollama`: local LLM server
 * - `mock`: deterministic in-process backend for tests and dry runs
 *
 * Each client performs a single attempt per call. Retries and backoff are
 * handled by `translation::TranslationService`.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::errors::ProviderError;

/// Common trait for all translation backends
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Check that the backend is reachable and accepts our credentials
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract the translated text from a response
    fn extract_text(response: &Self::Response) -> String;
}

/// Spaces requests out to honour a requests-per-minute limit
#[derive(Debug)]
pub struct RateLimiter {
    interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let interval = requests_per_minute
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64));
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request is allowed
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Map a reqwest transport failure onto the provider taxonomy
pub(crate) fn map_transport_error(error: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status onto the provider taxonomy
pub(crate) fn map_status_error(status: u16, body: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthenticationError(body),
        // DeepL answers 456 when the character quota is exhausted
        429 | 456 => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

pub mod deepl;
pub mod mock;
pub mod ollama;
