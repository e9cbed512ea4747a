/*!
 * Folding timed cues into translation blocks.
 *
 * Subtitle cues often cut a sentence in the middle. Translating such
 * fragments independently loses context, so consecutive cues are joined
 * until the text reaches a sentence end. A cue that opens with a dash
 * marks a new speaker and always starts a new block. A cue that starts
 * with a clock time ("10:15 p.m.") also always starts a new block.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::Cue;

// @const: Leading clock time such as "7:30 a.m." or "10:15pm"
static CLOCK_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d{1,2}:\d{2}\s*[ap]\.?\s?m\b\.?").unwrap());

const DASH_MARKERS: &[char] = &['-', '\u{2010}', '\u{2013}', '\u{2014}'];

const CLOSING_QUOTES: &[char] = &['"', '\'', '\u{201d}', '\u{2019}', '\u{00bb}', ')'];

/// A translation unit built from one or more consecutive cues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Merged text, never empty
    pub text: String,

    /// Source cue indices, in order
    pub cue_indices: Vec<usize>,

    /// Opened by a dash speaker marker (already removed from `text`)
    pub speaker_turn: bool,
}

impl Block {
    pub fn new(text: impl Into<String>, cue_indices: Vec<usize>) -> Self {
        Self {
            text: text.into(),
            cue_indices,
            speaker_turn: false,
        }
    }

    /// Index of the first source cue
    pub fn first_cue_index(&self) -> usize {
        self.cue_indices.first().copied().unwrap_or_default()
    }

    /// Length in Unicode scalar values
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Whether `text` ends a sentence.
///
/// Trailing closing quotes and brackets are ignored. An ellipsis is a
/// continuation, not an ending.
pub fn is_sentence_terminal(text: &str) -> bool {
    let core = text.trim_end().trim_end_matches(CLOSING_QUOTES).trim_end();
    if core.ends_with("...") || core.ends_with('\u{2026}') {
        return false;
    }
    core.ends_with(['.', '!', '?'])
}

/// Whether `text` opens with a clock time followed by a.m./p.m.
pub fn starts_with_clock_time(text: &str) -> bool {
    CLOCK_TIME_REGEX.is_match(text.trim_start())
}

/// Split a leading speaker dash from the text.
///
/// Returns whether a marker was present and the remaining trimmed text.
pub fn split_dash_marker(text: &str) -> (bool, &str) {
    let trimmed = text.trim_start();
    match trimmed.strip_prefix(DASH_MARKERS) {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed.trim_end()),
    }
}

/// One unit going through the fold
struct Piece<'a> {
    text: &'a str,
    cue_indices: &'a [usize],
    speaker_turn: bool,
}

/// Folds cues or blocks into sentence blocks
#[derive(Debug, Clone, Copy)]
pub struct BlockMerger {
    /// When false, every non-empty cue becomes its own block
    merge_enabled: bool,
}

impl Default for BlockMerger {
    fn default() -> Self {
        Self { merge_enabled: true }
    }
}

impl BlockMerger {
    pub fn new(merge_enabled: bool) -> Self {
        Self { merge_enabled }
    }

    /// Build blocks from cues in source order. Empty cues are skipped.
    pub fn merge_cues(&self, cues: &[Cue]) -> Vec<Block> {
        let indices: Vec<[usize; 1]> = cues.iter().map(|c| [c.index]).collect();
        let pieces = cues.iter().zip(indices.iter()).filter_map(|(cue, idx)| {
            let (speaker_turn, text) = split_dash_marker(&cue.text);
            (!text.is_empty()).then_some(Piece {
                text,
                cue_indices: idx.as_slice(),
                speaker_turn,
            })
        });
        self.fold(pieces)
    }

    /// Re-run the fold over existing blocks. Merged output is a fixed point.
    pub fn merge_blocks(&self, blocks: &[Block]) -> Vec<Block> {
        let pieces = blocks.iter().filter(|b| !b.text.trim().is_empty()).map(|b| Piece {
            text: b.text.trim(),
            cue_indices: &b.cue_indices,
            speaker_turn: b.speaker_turn,
        });
        self.fold(pieces)
    }

    fn fold<'a>(&self, pieces: impl Iterator<Item = Piece<'a>>) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut current: Option<Block> = None;

        for piece in pieces {
            let continues = match &current {
                Some(acc) => {
                    self.merge_enabled
                        && !piece.speaker_turn
                        && !is_sentence_terminal(&acc.text)
                        && !starts_with_clock_time(piece.text)
                }
                None => false,
            };

            match current.as_mut() {
                Some(acc) if continues => {
                    acc.text.push(' ');
                    acc.text.push_str(piece.text);
                    acc.cue_indices.extend_from_slice(piece.cue_indices);
                }
                _ => {
                    if let Some(done) = current.take() {
                        blocks.push(done);
                    }
                    current = Some(Block {
                        text: piece.text.to_string(),
                        cue_indices: piece.cue_indices.to_vec(),
                        speaker_turn: piece.speaker_turn,
                    });
                }
            }
        }

        if let Some(done) = current {
            blocks.push(done);
        }
        blocks
    }
}
