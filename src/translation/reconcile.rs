/*!
 * Splitting batch translations back into per-block results.
 *
 * A batch is sent as the block texts joined by a marker line. The backend
 * is expected to keep the marker lines, so splitting on them yields one
 * segment per block. When it does not, the mismatch is reported as a
 * `ReconciliationError` and the caller decides how to recover.
 */

use log::warn;
use serde::Serialize;

use crate::errors::ReconciliationError;
use crate::translation::merge::Block;

/// How a block's translation was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// Taken from the batch response
    Translated,
    /// Translated on its own after the batch could not be split
    Fallback,
    /// Translation failed; the text is the error placeholder
    Placeholder,
}

/// A block paired with its translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub block: Block,
    pub translation: String,
    pub outcome: TranslationOutcome,
}

impl TranslationResult {
    /// First source cue index of the block
    pub fn index(&self) -> usize {
        self.block.first_cue_index()
    }

    pub fn original(&self) -> &str {
        &self.block.text
    }

    pub fn is_placeholder(&self) -> bool {
        self.outcome == TranslationOutcome::Placeholder
    }
}

/// Join block texts with a marker line between them
pub fn join_batch<S: AsRef<str>>(texts: &[S], marker: &str) -> String {
    let separator = format!("\n{}\n", marker);
    texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Split a translated batch on lines consisting of the marker alone
pub fn split_batch(text: &str, marker: &str) -> Vec<String> {
    let marker = marker.trim();
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim() == marker {
            segments.push(current.join("\n").trim().to_string());
            current.clear();
        } else {
            current.push(line);
        }
    }
    segments.push(current.join("\n").trim().to_string());
    segments
}

/// Check that a split produced exactly one segment per block
pub fn reconcile(expected: usize, segments: Vec<String>) -> Result<Vec<String>, ReconciliationError> {
    if segments.len() == expected {
        Ok(segments)
    } else {
        Err(ReconciliationError {
            expected,
            actual: segments.len(),
        })
    }
}

/// Build the final result list, one entry per block in block order.
///
/// `slots[i]` holds the translation for `blocks[i]`; an unfilled slot gets
/// the placeholder.
pub fn assemble_results(
    blocks: &[Block],
    slots: Vec<Option<(String, TranslationOutcome)>>,
    placeholder: &str,
) -> Vec<TranslationResult> {
    let mut slots = slots.into_iter();
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let (translation, outcome) = match slots.next().flatten() {
                Some(filled) => filled,
                None => {
                    warn!("Block {} has no translation, using placeholder", i + 1);
                    (placeholder.to_string(), TranslationOutcome::Placeholder)
                }
            };
            TranslationResult {
                block: block.clone(),
                translation,
                outcome,
            }
        })
        .collect()
}
