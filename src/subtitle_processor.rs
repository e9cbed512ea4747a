use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::EmptyCuePolicy;
use crate::errors::ParseError;

// @module: SRT loading and cue text cleaning

// @const: SRT timing line, accepting '.' as millisecond separator too
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})")
        .unwrap()
});

// @const: HTML-ish tags such as <i>, </font>, <font color="...">
static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

// @const: ASS/SSA override blocks such as {\an8}
static ASS_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\\[^}]*\}").unwrap());

// @const: BB-code style tags such as [i], [/b], [color=#fff]
static BB_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[/?(?:i|b|u|s|color|font|size)(?:=[^\]]*)?\]").unwrap());

// @const: Numeric (&#233; &#xE9;) and named (&eacute;) character references
static ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z][A-Za-z0-9]{1,31}));").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// @struct: One timed subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Index from the source file
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cleaned single-line text, possibly empty
    pub text: String,
}

impl Cue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Cue {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return None;
        }
        let hours: u64 = parts[0].parse().ok()?;
        let minutes: u64 = parts[1].parse().ok()?;
        let seconds: u64 = parts[2].parse().ok()?;
        let millis: u64 = parts[3].parse().ok()?;
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }
        Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)
    }
}

/// Strip markup and fold a raw multi-line cue into one trimmed line
pub fn clean_cue_text(raw: &str) -> String {
    let without_html = HTML_TAG_REGEX.replace_all(raw, "");
    let without_ass = ASS_TAG_REGEX.replace_all(&without_html, "");
    let without_bb = BB_TAG_REGEX.replace_all(&without_ass, "");
    let decoded = decode_entities(&without_bb);
    WHITESPACE_REGEX.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // Single pass, so "&amp;lt;" decodes to the literal "&lt;"
    ENTITY_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{00ab}',
        "raquo" => '\u{00bb}',
        "iexcl" => '\u{00a1}',
        "iquest" => '\u{00bf}',
        "copy" => '\u{00a9}',
        "reg" => '\u{00ae}',
        "deg" => '\u{00b0}',
        "szlig" => '\u{00df}',
        "agrave" => '\u{00e0}',
        "aacute" => '\u{00e1}',
        "acirc" => '\u{00e2}',
        "auml" => '\u{00e4}',
        "ccedil" => '\u{00e7}',
        "egrave" => '\u{00e8}',
        "eacute" => '\u{00e9}',
        "ecirc" => '\u{00ea}',
        "iacute" => '\u{00ed}',
        "ntilde" => '\u{00f1}',
        "oacute" => '\u{00f3}',
        "ocirc" => '\u{00f4}',
        "ouml" => '\u{00f6}',
        "uacute" => '\u{00fa}',
        "uuml" => '\u{00fc}',
        "Eacute" => '\u{00c9}',
        "Agrave" => '\u{00c0}',
        "Ccedil" => '\u{00c7}',
        "Auml" => '\u{00c4}',
        "Ouml" => '\u{00d6}',
        "Uuml" => '\u{00dc}',
        _ => return None,
    };
    Some(c)
}

enum ParseState {
    ExpectIndex,
    ExpectTiming { index: usize, line: usize },
    Text { index: usize, start_ms: u64, end_ms: u64, raw: String },
}

/// Ordered cues loaded from one SRT file
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Cues in source order
    pub cues: Vec<Cue>,
}

impl SubtitleCollection {
    pub fn new(source_file: PathBuf, cues: Vec<Cue>) -> Self {
        SubtitleCollection { source_file, cues }
    }

    /// Read and parse an SRT file
    pub fn load<P: AsRef<Path>>(path: P, policy: EmptyCuePolicy) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|source| ParseError::InvalidEncoding {
            path: path.to_path_buf(),
            source,
        })?;
        let cues = Self::parse_srt_string(&content, policy)?;
        debug!("Loaded {} cues from {}", cues.len(), path.display());
        Ok(Self::new(path.to_path_buf(), cues))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cues whose cleaned text is not empty
    pub fn non_empty_cues(&self) -> impl Iterator<Item = &Cue> {
        self.cues.iter().filter(|c| !c.is_empty())
    }

    /// Parse SRT content into cleaned cues.
    ///
    /// Structural problems are fatal: an index line must be followed by a
    /// timing line, and text may not appear before the first index. A stray
    /// text line after a finished cue (usually a blank line inside the cue
    /// text) is appended to that cue.
    pub fn parse_srt_string(content: &str, policy: EmptyCuePolicy) -> Result<Vec<Cue>, ParseError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut cues: Vec<Cue> = Vec::new();
        let mut parsed = 0usize;
        let mut state = ParseState::ExpectIndex;

        let mut finish = |cues: &mut Vec<Cue>, index: usize, start_ms: u64, end_ms: u64, raw: &str| {
            parsed += 1;
            let text = clean_cue_text(raw);
            if text.is_empty() && policy == EmptyCuePolicy::Drop {
                debug!("Dropping empty cue {}", index);
                return;
            }
            cues.push(Cue::new(index, start_ms, end_ms, text));
        };

        for (line_idx, line) in content.lines().enumerate() {
            let line_no = line_idx + 1;
            let trimmed = line.trim();

            state = match state {
                ParseState::ExpectIndex => {
                    if trimmed.is_empty() {
                        ParseState::ExpectIndex
                    } else if let Ok(index) = trimmed.parse::<usize>() {
                        ParseState::ExpectTiming { index, line: line_no }
                    } else if let Some(last) = cues.last_mut() {
                        warn!("Line {}: text outside a cue, appending to cue {}", line_no, last.index);
                        last.text = clean_cue_text(&format!("{} {}", last.text, trimmed));
                        ParseState::ExpectIndex
                    } else {
                        return Err(ParseError::Malformed {
                            line: line_no,
                            message: format!("expected a cue index, found '{}'", trimmed),
                        });
                    }
                }
                ParseState::ExpectTiming { index, line } => {
                    let caps = TIMESTAMP_REGEX.captures(trimmed).ok_or_else(|| ParseError::Malformed {
                        line: line_no,
                        message: format!("cue {} (line {}) has no valid timing line", index, line),
                    })?;
                    let start_ms = timestamp_from_captures(&caps, 1);
                    let end_ms = timestamp_from_captures(&caps, 5);
                    if end_ms < start_ms {
                        warn!("Cue {} ends before it starts", index);
                    }
                    ParseState::Text {
                        index,
                        start_ms,
                        end_ms,
                        raw: String::new(),
                    }
                }
                ParseState::Text {
                    index,
                    start_ms,
                    end_ms,
                    mut raw,
                } => {
                    if trimmed.is_empty() {
                        finish(&mut cues, index, start_ms, end_ms, &raw);
                        ParseState::ExpectIndex
                    } else {
                        if !raw.is_empty() {
                            raw.push('\n');
                        }
                        raw.push_str(trimmed);
                        ParseState::Text {
                            index,
                            start_ms,
                            end_ms,
                            raw,
                        }
                    }
                }
            };
        }

        match state {
            ParseState::Text {
                index,
                start_ms,
                end_ms,
                raw,
            } => finish(&mut cues, index, start_ms, end_ms, &raw),
            ParseState::ExpectTiming { index, line } => {
                return Err(ParseError::Malformed {
                    line,
                    message: format!("cue {} has no timing line", index),
                });
            }
            ParseState::ExpectIndex => {}
        }

        if parsed == 0 {
            return Err(ParseError::NoCues);
        }
        Ok(cues)
    }
}

fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> u64 {
    let part = |offset: usize| -> u64 {
        caps.get(start_idx + offset)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    ((part(0) * 60 + part(1)) * 60 + part(2)) * 1000 + part(3)
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cue in &self.cues {
            writeln!(f, "{}", cue)?;
        }
        Ok(())
    }
}
