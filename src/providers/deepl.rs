use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{map_status_error, map_transport_error, Provider, RateLimiter};

/// DeepL client for the `/v2/translate` endpoint
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as `DeepL-Auth-Key`
    api_key: String,
    /// Base URL, e.g. https://api-free.deepl.com
    endpoint: String,
    timeout_secs: u64,
    limiter: RateLimiter,
}

/// One translate call
#[derive(Debug, Clone)]
pub struct DeepLRequest {
    pub text: String,
    /// DeepL target code such as `RU` or `EN-US`
    pub target_lang: String,
    /// DeepL source code, omitted for auto-detection
    pub source_lang: Option<String>,
}

impl DeepLRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_lang: target_lang.into(),
            source_lang: None,
        }
    }

    pub fn source_lang(mut self, source_lang: Option<String>) -> Self {
        self.source_lang = source_lang;
        self
    }

    fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![
            ("text", self.text.as_str()),
            ("target_lang", self.target_lang.as_str()),
            // keep line structure so separator lines survive
            ("split_sentences", "nonewlines"),
            ("preserve_formatting", "1"),
        ];
        if let Some(source) = &self.source_lang {
            form.push(("source_lang", source.as_str()));
        }
        form
    }
}

#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

impl DeepL {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
        rate_limit: Option<u32>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_secs,
            limiter: RateLimiter::new(rate_limit),
        }
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

#[async_trait]
impl Provider for DeepL {
    type Request = DeepLRequest;
    type Response = DeepLResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.limiter.acquire().await;
        let url = format!("{}/v2/translate", self.endpoint);
        debug!("DeepL request: {} chars to {}", request.text.chars().count(), request.target_lang);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .form(&request.form())
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(map_status_error(status.as_u16(), error_text));
        }

        response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v2/usage", self.endpoint);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status_error(status.as_u16(), body))
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .translations
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
