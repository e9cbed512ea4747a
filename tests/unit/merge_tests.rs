/*!
 * Tests for merging cues into sentence blocks
 */

use subpair::subtitle_processor::Cue;
use subpair::translation::merge::{is_sentence_terminal, starts_with_clock_time};
use subpair::translation::{Block, BlockMerger};

fn cues(texts: &[&str]) -> Vec<Cue> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Cue::new(i + 1, (i as u64) * 1000, (i as u64) * 1000 + 900, *text))
        .collect()
}

fn texts(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|b| b.text.as_str()).collect()
}

#[test]
fn test_merge_cues_withSplitSentenceAndDash_shouldBuildTwoBlocks() {
    let blocks = BlockMerger::default().merge_cues(&cues(&["Hello", "world.", "- Next line."]));

    assert_eq!(texts(&blocks), vec!["Hello world.", "Next line."]);
    assert_eq!(blocks[0].cue_indices, vec![1, 2]);
    assert_eq!(blocks[1].cue_indices, vec![3]);
    assert!(blocks[1].speaker_turn);
}

#[test]
fn test_merge_cues_withEllipsis_shouldContinueSentence() {
    let blocks = BlockMerger::default().merge_cues(&cues(&["Wait...", "for me.", "Okay."]));
    assert_eq!(texts(&blocks), vec!["Wait... for me.", "Okay."]);
}

#[test]
fn test_merge_cues_withMixedPunctuation_shouldTreatAsTerminal() {
    let blocks = BlockMerger::default().merge_cues(&cues(&["Really?!", "Yes"]));
    assert_eq!(texts(&blocks), vec!["Really?!", "Yes"]);
}

#[test]
fn test_merge_cues_withClockTime_shouldStartNewBlock() {
    let blocks = BlockMerger::default().merge_cues(&cues(&["And now", "10:15 p.m. news update"]));
    assert_eq!(texts(&blocks), vec!["And now", "10:15 p.m. news update"]);
}

#[test]
fn test_merge_cues_withClockTimeInsideBlock_shouldNotEndSentence() {
    // The abbreviation's period ends the text, so the next cue starts fresh
    let blocks = BlockMerger::default().merge_cues(&cues(&["See you at", "7:30 a.m.", "sharp."]));
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].text, "7:30 a.m.");
}

#[test]
fn test_merge_cues_withEmptyCues_shouldSkipThem() {
    let blocks = BlockMerger::default().merge_cues(&cues(&["Hello", "", "-", "there."]));
    assert_eq!(texts(&blocks), vec!["Hello there."]);
    assert_eq!(blocks[0].cue_indices, vec![1, 4]);
}

#[test]
fn test_merge_cues_withMergeDisabled_shouldKeepOneBlockPerCue() {
    let blocks = BlockMerger::new(false).merge_cues(&cues(&["Hello", "world.", "- Next line."]));
    assert_eq!(texts(&blocks), vec!["Hello", "world.", "Next line."]);
}

#[test]
fn test_merge_blocks_withMergedOutput_shouldBeIdempotent() {
    let merger = BlockMerger::default();
    let input = cues(&["Hello", "world.", "- Next", "line.", "- Who?", "Me", "10:15 p.m. news", "at nine."]);
    let once = merger.merge_cues(&input);
    let twice = merger.merge_blocks(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_merge_cues_withNoCues_shouldReturnNoBlocks() {
    assert!(BlockMerger::default().merge_cues(&[]).is_empty());
}

#[test]
fn test_merge_cues_shouldCoverEveryNonEmptyCueOnce() {
    let input = cues(&["One", "two.", "", "Three", "- four", "five!"]);
    let blocks = BlockMerger::default().merge_cues(&input);
    let covered: Vec<usize> = blocks.iter().flat_map(|b| b.cue_indices.clone()).collect();
    assert_eq!(covered, vec![1, 2, 4, 5, 6]);
    assert!(blocks.iter().all(|b| !b.text.is_empty()));
}

#[test]
fn test_is_sentence_terminal_withVariousEndings_shouldClassify() {
    assert!(is_sentence_terminal("Done."));
    assert!(is_sentence_terminal("What?"));
    assert!(!is_sentence_terminal("Hmm,"));
    assert!(!is_sentence_terminal("Well\u{2026}"));
}

#[test]
fn test_starts_with_clock_time_withFormats_shouldMatch() {
    assert!(starts_with_clock_time("10:15 p.m. news"));
    assert!(starts_with_clock_time("7:30am"));
    assert!(starts_with_clock_time("7:30 AM sharp"));
    assert!(!starts_with_clock_time("At 7:30 a.m."));
    assert!(!starts_with_clock_time("10:15 and counting"));
}
