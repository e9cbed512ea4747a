/*!
 * Segmentation and translation of subtitle text.
 *
 * - `merge`: folds cues into sentence blocks
 * - `batch`: plans bounded batches and translates them
 * - `reconcile`: splits batch answers back per block
 * - `core`: the translation service wrapping one backend
 */

pub use self::batch::{Batch, BatchReport, BatchTranslator, Batcher};
pub use self::core::TranslationService;
pub use self::merge::{Block, BlockMerger};
pub use self::reconcile::{TranslationOutcome, TranslationResult};

pub mod batch;
pub mod core;
pub mod merge;
pub mod reconcile;
