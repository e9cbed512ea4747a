/*!
 * Deterministic in-process backend.
 *
 * Used by the test suite and by `--provider mock` dry runs. Behaviors:
 * - `Working`: prefixes every text line with the target code, keeps
 *   separator lines untouched
 * - `Failing`: always errors
 * - `Intermittent`: every Nth call errors
 * - `MergesSegments`: translates but drops separator lines, the way a
 *   careless backend would
 * - `Timeout`: reports a timeout
 * - `Empty`: answers with nothing
 * - `Slow`: like `Working` after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

impl MockRequest {
    pub fn new(text: impl Into<String>, source_language: &str, target_language: &str) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// Mock response
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Working,
    Failing,
    /// Fails on every `fail_every`-th request (1-based)
    Intermittent { fail_every: usize },
    MergesSegments,
    Timeout,
    Empty,
    Slow { delay_ms: u64 },
}

/// Mock provider; clones share the request counter and log
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    custom_response: Option<fn(&MockRequest) -> String>,
}

/// Lines made only of `=` are kept verbatim so batch separators survive
fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '=')
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn merges_segments() -> Self {
        Self::new(MockBehavior::MergesSegments)
    }

    pub fn timeout() -> Self {
        Self::new(MockBehavior::Timeout)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Replace the `Working` translation with a custom generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    pub fn behavior(&self) -> MockBehavior {
        self.behavior
    }

    /// Number of `complete` calls so far, across clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn received_texts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.text.clone()).collect()
    }

    /// The translation `Working` produces for `text`
    pub fn translate_lines(text: &str, target_language: &str) -> String {
        let tag = target_language.to_uppercase();
        text.lines()
            .map(|line| {
                if is_separator_line(line) || line.trim().is_empty() {
                    line.to_string()
                } else {
                    format!("[{}] {}", tag, line.trim())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn working_text(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::translate_lines(&request.text, &request.target_language),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(MockResponse {
                text: self.working_text(&request),
            }),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count),
                    })
                } else {
                    Ok(MockResponse {
                        text: self.working_text(&request),
                    })
                }
            }

            MockBehavior::MergesSegments => {
                let translated = Self::translate_lines(&request.text, &request.target_language);
                let merged = translated
                    .lines()
                    .filter(|line| !is_separator_line(line))
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(MockResponse { text: merged })
            }

            MockBehavior::Timeout => Err(ProviderError::Timeout(30)),

            MockBehavior::Empty => Ok(MockResponse { text: String::new() }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(MockResponse {
                    text: self.working_text(&request),
                })
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
