/*!
 * Batch planning and batch translation.
 *
 * `Batcher` packs blocks greedily into requests bounded by block count and
 * character count. `BatchTranslator` sends each batch as one joined string,
 * splits the answer back per block and recovers from failures so that every
 * block ends up with exactly one result.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{BatchConfig, ReconciliationPolicy};
use crate::translation::core::TranslationService;
use crate::translation::merge::Block;
use crate::translation::reconcile::{
    assemble_results, join_batch, reconcile, split_batch, TranslationOutcome, TranslationResult,
};

/// A contiguous run of blocks sent in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Block positions covered by this batch
    pub range: Range<usize>,
    /// Characters including one separator per block after the first
    pub char_count: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Greedy batch planner
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    max_batch_size: usize,
    max_chars_per_batch: usize,
}

impl Batcher {
    pub fn new(max_batch_size: usize, max_chars_per_batch: usize) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
            max_chars_per_batch,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.max_batch_size, config.max_chars_per_batch)
    }

    /// Pack blocks left to right. An empty batch accepts any block, so an
    /// oversized block forms a batch of its own.
    pub fn plan(&self, blocks: &[Block]) -> Vec<Batch> {
        let mut batches = Vec::new();
        let mut start = 0;
        let mut chars = 0;

        for (i, block) in blocks.iter().enumerate() {
            let len = block.char_len();
            let count = i - start;
            if count == 0 {
                chars = len;
                continue;
            }
            if count < self.max_batch_size && chars + 1 + len <= self.max_chars_per_batch {
                chars += 1 + len;
            } else {
                batches.push(Batch {
                    range: start..i,
                    char_count: chars,
                });
                start = i;
                chars = len;
            }
        }

        if start < blocks.len() {
            batches.push(Batch {
                range: start..blocks.len(),
                char_count: chars,
            });
        }

        for batch in batches.iter().filter(|b| b.len() == 1 && b.char_count > self.max_chars_per_batch) {
            warn!(
                "Block {} has {} characters, above the {} character batch limit; sending it alone",
                batch.range.start + 1,
                batch.char_count,
                self.max_chars_per_batch
            );
        }
        debug!("Planned {} batches for {} blocks", batches.len(), blocks.len());
        batches
    }
}

/// Counters describing one translation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub batches: usize,
    /// Batches whose request failed outright
    pub failed_batches: usize,
    /// Batches whose response could not be split per block
    pub reconciled_batches: usize,
    pub fallback_blocks: usize,
    pub placeholder_blocks: usize,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "{} batches, {} failed, {} needed reconciliation; {} blocks re-translated individually, {} placeholders",
            self.batches, self.failed_batches, self.reconciled_batches, self.fallback_blocks, self.placeholder_blocks
        )
    }
}

/// What happened to a single batch
struct BatchOutcome {
    translations: Vec<(String, TranslationOutcome)>,
    failed: bool,
    reconciled: bool,
}

/// Translates planned batches and reassembles per-block results
pub struct BatchTranslator {
    service: TranslationService,
    config: BatchConfig,
}

impl BatchTranslator {
    pub fn new(service: TranslationService, config: BatchConfig) -> Self {
        Self { service, config }
    }

    /// Translate every batch and return one result per block, in block order.
    ///
    /// At most `concurrent_batches` requests run at a time; results are put
    /// back in batch order regardless of completion order.
    pub async fn translate_batches(
        &self,
        blocks: &[Block],
        batches: &[Batch],
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> (Vec<TranslationResult>, BatchReport) {
        let total_batches = batches.len();
        let processed_batches = Arc::new(AtomicUsize::new(0));
        let concurrency = self.config.concurrent_batches.max(1);
        let started = Instant::now();

        let mut outcomes = stream::iter(batches.iter().enumerate())
            .map(|(batch_index, batch)| {
                let processed_batches = processed_batches.clone();
                let progress_callback = progress_callback.clone();
                let slice = blocks.get(batch.range.clone()).unwrap_or(&[]);

                async move {
                    let outcome = self.translate_one(batch_index, slice, target_language).await;
                    let current = processed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);
                    (batch_index, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        outcomes.sort_by_key(|(idx, _)| *idx);

        let mut report = BatchReport {
            batches: total_batches,
            ..BatchReport::default()
        };
        let mut slots: Vec<Option<(String, TranslationOutcome)>> = vec![None; blocks.len()];

        for (batch_index, outcome) in outcomes {
            if outcome.failed {
                report.failed_batches += 1;
            }
            if outcome.reconciled {
                report.reconciled_batches += 1;
            }
            let range = batches[batch_index].range.clone();
            if let Some(window) = slots.get_mut(range) {
                for (slot, translation) in window.iter_mut().zip(outcome.translations) {
                    *slot = Some(translation);
                }
            }
        }

        let results = assemble_results(blocks, slots, &self.config.error_placeholder);
        for result in &results {
            match result.outcome {
                TranslationOutcome::Fallback => report.fallback_blocks += 1,
                TranslationOutcome::Placeholder => report.placeholder_blocks += 1,
                TranslationOutcome::Translated => {}
            }
        }

        info!("Translation finished in {:.1?}: {}", started.elapsed(), report.summary());
        (results, report)
    }

    async fn translate_one(&self, batch_index: usize, blocks: &[Block], target_language: &str) -> BatchOutcome {
        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        let joined = join_batch(&texts, &self.config.separator);

        let translated = match self.service.translate_text(&joined, target_language).await {
            Ok(text) => text,
            Err(e) => {
                error!("Batch {} failed: {}", batch_index + 1, e);
                return BatchOutcome {
                    translations: self.placeholders(blocks.len()),
                    failed: true,
                    reconciled: false,
                };
            }
        };

        match reconcile(blocks.len(), split_batch(&translated, &self.config.separator)) {
            Ok(segments) => BatchOutcome {
                translations: segments
                    .into_iter()
                    .map(|s| (s, TranslationOutcome::Translated))
                    .collect(),
                failed: false,
                reconciled: false,
            },
            Err(e) => {
                warn!("Batch {}: {}", batch_index + 1, e);
                let translations = match self.config.reconciliation {
                    ReconciliationPolicy::PerBlock => self.translate_individually(blocks, target_language).await,
                    ReconciliationPolicy::Placeholder => self.placeholders(blocks.len()),
                };
                BatchOutcome {
                    translations,
                    failed: false,
                    reconciled: true,
                }
            }
        }
    }

    async fn translate_individually(
        &self,
        blocks: &[Block],
        target_language: &str,
    ) -> Vec<(String, TranslationOutcome)> {
        let mut translations = Vec::with_capacity(blocks.len());
        for block in blocks {
            match self.service.translate_text(&block.text, target_language).await {
                Ok(text) => translations.push((text.trim().to_string(), TranslationOutcome::Fallback)),
                Err(e) => {
                    warn!("Block at cue {} failed: {}", block.first_cue_index(), e);
                    translations.push((self.config.error_placeholder.clone(), TranslationOutcome::Placeholder));
                }
            }
        }
        translations
    }

    fn placeholders(&self, count: usize) -> Vec<(String, TranslationOutcome)> {
        vec![(self.config.error_placeholder.clone(), TranslationOutcome::Placeholder); count]
    }
}
