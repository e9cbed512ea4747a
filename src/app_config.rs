use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the JSON configuration
/// (`conf.json` by default). CLI flags override values after loading.

/// Environment variables checked for an API key when the config has none
pub const API_KEY_ENV_VARS: &[&str] = &["SUBPAIR_API_KEY", "DEEPL_API_KEY"];

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO) or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// How cues are turned into blocks
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// How blocks are packed into requests
    #[serde(default)]
    pub batching: BatchConfig,

    /// Output artifacts
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL REST API
    #[default]
    DeepL,
    // @provider: Ollama (local LLM)
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Whether requests must carry an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::DeepL)
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
            "deepl" => Ok(Self::DeepL),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (Ollama only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, empty means "read from environment"
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::DeepL => Self {
                provider_type: "deepl".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_deepl_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Settings shared by all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Prompt template for LLM backends.
    /// Placeholders: {source_language}, {target_language}, {separator}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for retryable failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature for LLM backends (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// What to do with cues whose cleaned text is empty
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCuePolicy {
    /// Keep them in the cue list; the merger skips them
    #[default]
    Preserve,
    /// Discard them while loading
    Drop,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    /// Fold consecutive cues into sentence blocks
    #[serde(default = "default_true")]
    pub merge_cues: bool,

    #[serde(default)]
    pub empty_cues: EmptyCuePolicy,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            merge_cues: true,
            empty_cues: EmptyCuePolicy::default(),
        }
    }
}

/// Recovery when a batch translation splits into the wrong number of parts
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationPolicy {
    /// Re-translate every block of the batch on its own
    #[default]
    PerBlock,
    /// Give every block of the batch the error placeholder
    Placeholder,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Maximum number of blocks in one request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Maximum characters in one request, separators included
    #[serde(default = "default_max_chars_per_batch")]
    pub max_chars_per_batch: usize,

    /// Marker line placed between blocks of a batch
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Number of batches translated at the same time
    #[serde(default = "default_concurrent_batches")]
    pub concurrent_batches: usize,

    #[serde(default)]
    pub reconciliation: ReconciliationPolicy,

    /// Text stored for blocks whose translation failed
    #[serde(default = "default_error_placeholder")]
    pub error_placeholder: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_chars_per_batch: default_max_chars_per_batch(),
            separator: default_separator(),
            concurrent_batches: default_concurrent_batches(),
            reconciliation: ReconciliationPolicy::default(),
            error_placeholder: default_error_placeholder(),
        }
    }
}

/// Output artifact kinds
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Two-column HTML comparison table
    Html,
    /// Anki-importable tab separated deck
    Anki,
    /// `{"items": [...]}` document
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Anki => "tsv",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "anki" | "tsv" | "flashcards" => Ok(Self::Anki),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Invalid export format: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,

    /// Deck name for flashcards; the input file stem when unset
    #[serde(default)]
    pub deck_name: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            deck_name: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
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
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    crate::language_utils::AUTO_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    25
}

fn default_max_chars_per_batch() -> usize {
    4500
}

fn default_separator() -> String {
    "====".to_string()
}

fn default_concurrent_batches() -> usize {
    1
}

fn default_error_placeholder() -> String {
    "[translation error]".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Html]
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the following text from {source_language} to {target_language}. \
     Lines consisting only of {separator} separate independent segments: copy every such line unchanged and translate each segment on its own. \
     Reply with the translation only."
        .to_string()
}

impl Config {
    /// Load a configuration file, failing when it cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))
    }

    /// Load the file if present, otherwise write defaults there and use them
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        let config = Self::default();
        if let Err(e) = config.save(path) {
            log::warn!("Could not write default config to {}: {}", path.display(), e);
        } else {
            log::info!("Created default configuration at {}", path.display());
        }
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !crate::language_utils::is_auto(&self.source_language) {
            crate::language_utils::validate_language_code(&self.source_language)
                .with_context(|| format!("Invalid source language '{}'", self.source_language))?;
        }
        crate::language_utils::validate_language_code(&self.target_language)
            .with_context(|| format!("Invalid target language '{}'", self.target_language))?;

        if self.batching.max_batch_size == 0 {
            return Err(anyhow!("batching.max_batch_size must be greater than zero"));
        }
        if self.batching.max_chars_per_batch == 0 {
            return Err(anyhow!("batching.max_chars_per_batch must be greater than zero"));
        }
        if self.batching.concurrent_batches == 0 {
            return Err(anyhow!("batching.concurrent_batches must be greater than zero"));
        }
        if self.batching.separator.trim().is_empty() {
            return Err(anyhow!("batching.separator must not be blank"));
        }
        if self.export.formats.is_empty() {
            return Err(anyhow!("export.formats must name at least one format"));
        }

        if self.translation.provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "An API key is required for {}: set it in the config or in one of {:?}",
                self.translation.provider.display_name(),
                API_KEY_ENV_VARS
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            segmentation: SegmentationConfig::default(),
            batching: BatchConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.model.is_empty() => p.model.clone(),
            _ => match self.provider {
                TranslationProvider::Ollama => default_ollama_model(),
                TranslationProvider::DeepL => String::new(),
            },
        }
    }

    /// API key from the config, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(p) = self.get_active_provider_config() {
            if !p.api_key.is_empty() {
                return p.api_key.clone();
            }
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.endpoint.is_empty() => p.endpoint.clone(),
            _ => match self.provider {
                TranslationProvider::DeepL => default_deepl_endpoint(),
                TranslationProvider::Ollama => default_ollama_endpoint(),
            },
        }
    }

    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(p) if p.timeout_secs > 0 => p.timeout_secs,
            _ => default_timeout_secs(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        self.get_active_provider_config().and_then(|p| p.rate_limit)
    }

    /// Set the model of the active provider, adding an entry if needed
    pub fn set_model(&mut self, model: String) {
        let provider = self.provider;
        let provider_str = provider.to_lowercase_string();
        match self
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(p) => p.model = model,
            None => {
                let mut entry = ProviderConfig::new(provider);
                entry.model = model;
                self.available_providers.push(entry);
            }
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::DeepL),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
