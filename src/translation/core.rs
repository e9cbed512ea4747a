/*!
 * Translation service.
 *
 * Wraps one configured backend behind `translate_text`, adding retries with
 * exponential backoff for retryable failures. The target language is passed
 * on every call; the service holds no per-run state.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::app_config::{Config, TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::language_utils;
use crate::providers::deepl::{DeepL, DeepLRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::Provider;

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    DeepL { client: DeepL },
    Ollama { client: Ollama, model: String },
    Mock { client: MockProvider },
}

/// Main translation service
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<TranslationProviderImpl>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Source language code or "auto"
    source_language: String,

    /// Batch marker line, mentioned in LLM prompts
    separator: String,
}

/// Reject endpoints that are not absolute http(s) URLs
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("Unsupported endpoint scheme '{}' in {}", other, endpoint)),
    }
}

impl TranslationService {
    /// Create a service for the provider selected in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let translation = config.translation.clone();
        let endpoint = translation.get_endpoint();
        let timeout_secs = translation.get_timeout_secs();
        let rate_limit = translation.get_rate_limit();

        let provider = match translation.provider {
            ConfigTranslationProvider::DeepL => {
                validate_endpoint(&endpoint)?;
                let api_key = translation.get_api_key();
                if api_key.is_empty() {
                    return Err(anyhow!("DeepL requires an API key"));
                }
                TranslationProviderImpl::DeepL {
                    client: DeepL::new(api_key, endpoint, timeout_secs, rate_limit),
                }
            }
            ConfigTranslationProvider::Ollama => {
                let client = Ollama::new(endpoint.clone(), timeout_secs, rate_limit);
                if endpoint.contains("://") {
                    validate_endpoint(&endpoint)?;
                }
                TranslationProviderImpl::Ollama {
                    client,
                    model: translation.get_model(),
                }
            }
        };

        Ok(Self::from_impl(provider, config))
    }

    /// Create a service backed by a mock provider
    pub fn from_mock(client: MockProvider, config: &Config) -> Self {
        Self::from_impl(TranslationProviderImpl::Mock { client }, config)
    }

    fn from_impl(provider: TranslationProviderImpl, config: &Config) -> Self {
        Self {
            provider: Arc::new(provider),
            config: config.translation.clone(),
            source_language: config.source_language.clone(),
            separator: config.batching.separator.clone(),
        }
    }

    /// Human-readable backend name for logs
    pub fn provider_name(&self) -> String {
        match self.provider.as_ref() {
            TranslationProviderImpl::DeepL { .. } => "DeepL".to_string(),
            TranslationProviderImpl::Ollama { model, .. } => format!("Ollama ({})", model),
            TranslationProviderImpl::Mock { .. } => "Mock".to_string(),
        }
    }

    /// Check that the backend is reachable
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.provider.as_ref() {
            TranslationProviderImpl::DeepL { client } => client.test_connection().await,
            TranslationProviderImpl::Ollama { client, .. } => client.test_connection().await,
            TranslationProviderImpl::Mock { client } => client.test_connection().await,
        }
    }

    /// Translate one string into `target_language`, retrying retryable failures
    pub async fn translate_text(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let retry_count = self.config.common.retry_count;
        let backoff_base_ms = self.config.common.retry_backoff_ms;
        let mut attempt: u32 = 0;

        loop {
            let error = match self.translate_once(text, target_language).await {
                Ok(translated) if translated.trim().is_empty() => TranslationError::EmptyResponse,
                Ok(translated) => return Ok(translated),
                Err(e) => TranslationError::from(e),
            };
            if !error.is_retryable() || attempt >= retry_count {
                return Err(error);
            }

            let backoff_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
            attempt += 1;
            warn!(
                "Translation attempt {}/{} failed: {}. Retrying in {} ms",
                attempt,
                retry_count + 1,
                error,
                backoff_ms
            );
            if backoff_ms > 0 {
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }

    async fn translate_once(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        debug!("Translating {} chars with {}", text.chars().count(), self.provider_name());
        match self.provider.as_ref() {
            TranslationProviderImpl::DeepL { client } => {
                let target = language_utils::to_deepl_code(target_language, true)
                    .map_err(|e| ProviderError::RequestFailed(e.to_string()))?
                    .ok_or_else(|| ProviderError::RequestFailed("Target language cannot be 'auto'".to_string()))?;
                let source = language_utils::to_deepl_code(&self.source_language, false)
                    .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
                let request = DeepLRequest::new(text, target).source_lang(source);
                let response = client.complete(request).await?;
                Ok(DeepL::extract_text(&response))
            }
            TranslationProviderImpl::Ollama { client, model } => {
                let request = GenerationRequest::new(model.clone(), text)
                    .system(self.system_prompt(target_language))
                    .temperature(self.config.common.temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            TranslationProviderImpl::Mock { client } => {
                let request = MockRequest::new(text, &self.source_language, target_language);
                let response = client.complete(request).await?;
                Ok(MockProvider::extract_text(&response))
            }
        }
    }

    /// Prompt for LLM backends with language names and the separator filled in
    pub fn system_prompt(&self, target_language: &str) -> String {
        let source_name = language_utils::get_language_name(&self.source_language)
            .unwrap_or_else(|_| self.source_language.clone());
        let target_name =
            language_utils::get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());
        self.config
            .common
            .system_prompt
            .replace("{source_language}", &source_name)
            .replace("{target_language}", &target_name)
            .replace("{separator}", &self.separator)
    }
}
