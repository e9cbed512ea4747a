/*!
 * Tests for SRT parsing and cue cleaning
 */

use anyhow::Result;
use subpair::app_config::EmptyCuePolicy;
use subpair::errors::ParseError;
use subpair::subtitle_processor::{clean_cue_text, Cue, SubtitleCollection};

use crate::common;

#[test]
fn test_parse_srt_string_withSampleFile_shouldCleanAndKeepOrder() -> Result<()> {
    let cues = SubtitleCollection::parse_srt_string(common::SAMPLE_SRT, EmptyCuePolicy::Preserve)?;

    assert_eq!(cues.len(), 4);
    assert_eq!(cues[0], Cue::new(1, 1_000, 3_000, "Hello"));
    assert_eq!(cues[2].text, "- Next line.");
    assert_eq!(cues[3].text, "She said \"fine\" & left.");
    assert_eq!(cues.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    Ok(())
}

#[test]
fn test_parse_srt_string_withBomAndCrlf_shouldParse() -> Result<()> {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst line\r\nsecond line\r\n\r\n2\r\n00:00:03.000 --> 00:00:04.500\r\nNext\r\n";
    let cues = SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Preserve)?;

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "First line second line");
    assert_eq!(cues[1].start_ms, 3_000);
    assert_eq!(cues[1].end_ms, 4_500);
    Ok(())
}

#[test]
fn test_parse_srt_string_withEmptyCue_shouldFollowPolicy() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n<i></i>\n\n2\n00:00:03,000 --> 00:00:04,000\nText\n";

    let preserved = SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Preserve)?;
    assert_eq!(preserved.len(), 2);
    assert!(preserved[0].is_empty());

    let dropped = SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Drop)?;
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].index, 2);
    Ok(())
}

#[test]
fn test_parse_srt_string_withOnlyEmptyCuesDropped_shouldReturnEmptyList() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n";
    let cues = SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Drop)?;
    assert!(cues.is_empty());
    Ok(())
}

#[test]
fn test_parse_srt_string_withMissingTiming_shouldFailWithLine() {
    let content = "1\nnot a timing line\nText\n";
    match SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Preserve) {
        Err(ParseError::Malformed { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Malformed, got {:?}", other),
    }
}

#[test]
fn test_parse_srt_string_withTextBeforeFirstCue_shouldFail() {
    let content = "garbage\n1\n00:00:01,000 --> 00:00:02,000\nText\n";
    assert!(matches!(
        SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Preserve),
        Err(ParseError::Malformed { line: 1, .. })
    ));
}

#[test]
fn test_parse_srt_string_withNoContent_shouldReportNoCues() {
    assert!(matches!(
        SubtitleCollection::parse_srt_string("\n\n  \n", EmptyCuePolicy::Preserve),
        Err(ParseError::NoCues)
    ));
}

#[test]
fn test_parse_srt_string_withBlankLineInsideCue_shouldAppendStrayText() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst part\n\nsecond part\n\n2\n00:00:03,000 --> 00:00:04,000\nNext\n";
    let cues = SubtitleCollection::parse_srt_string(content, EmptyCuePolicy::Preserve)?;
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "First part second part");
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldReturnUnreadable() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("nope.srt");
    assert!(matches!(
        SubtitleCollection::load(&missing, EmptyCuePolicy::Preserve),
        Err(ParseError::Unreadable { .. })
    ));
    Ok(())
}

#[test]
fn test_load_withInvalidUtf8_shouldFailWithEncodingError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("latin1.srt");
    let mut bytes = b"1\n00:00:01,000 --> 00:00:02,000\nCaf".to_vec();
    bytes.push(0xe9);
    bytes.extend_from_slice(b"\n");
    std::fs::write(&path, bytes)?;

    match SubtitleCollection::load(&path, EmptyCuePolicy::Preserve) {
        Err(ParseError::InvalidEncoding { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected InvalidEncoding, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_load_withUtf8Bom_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "bom.srt",
        "\u{feff}1\n00:00:01,000 --> 00:00:02,000\nCaf\u{e9}\n",
    )?;

    let collection = SubtitleCollection::load(&path, EmptyCuePolicy::Preserve)?;
    assert_eq!(collection.cues[0].text, "Caf\u{e9}");
    Ok(())
}

#[test]
fn test_clean_cue_text_withEntitiesAndAssTags_shouldDecode() {
    assert_eq!(clean_cue_text("{\\i1}Tom &amp; Jerry{\\i0}"), "Tom & Jerry");
    assert_eq!(clean_cue_text("&amp;lt;tag&amp;gt;"), "&lt;tag&gt;");
    assert_eq!(clean_cue_text("  spaced \n\n out  "), "spaced out");
}

#[test]
fn test_clean_cue_text_withCharacterReferences_shouldDecodeThem() {
    assert_eq!(clean_cue_text("Caf&#233; &#x2014; caf&eacute;"), "Caf\u{e9} \u{2014} caf\u{e9}");
    assert_eq!(clean_cue_text("&#X41;&hellip;"), "A\u{2026}");
    // Unknown or invalid references stay as written
    assert_eq!(clean_cue_text("&bogus; &#xD800; AT&T"), "&bogus; &#xD800; AT&T");
}

#[test]
fn test_cue_display_withValues_shouldRenderSrtBlock() {
    let cue = Cue::new(7, 61_234, 65_432, "Hi");
    assert_eq!(cue.to_string(), "7\n00:01:01,234 --> 00:01:05,432\nHi\n");
}
