/*!
 * # subpair - bilingual subtitle pairs
 *
 * Turns an SRT subtitle file into original/translation pairs suitable for
 * language study.
 *
 * ## Pipeline
 *
 * 1. `subtitle_processor`: parse SRT into cues and clean their markup
 * 2. `translation::merge`: fold cues into sentence-level blocks
 * 3. `translation::batch`: pack blocks into bounded batches and translate them
 * 4. `translation::reconcile`: split each batch answer back per block
 * 5. `export`: write an HTML table, an Anki-importable deck or JSON
 *
 * Backends live in `providers` (DeepL, Ollama and an offline mock).
 * Configuration is in `app_config`, errors in `errors`, and the per-file and
 * per-folder orchestration in `app_controller`.
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ParseError, ProviderError, ReconciliationError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use subtitle_processor::{Cue, SubtitleCollection};
pub use translation::{Block, TranslationResult, TranslationService};
