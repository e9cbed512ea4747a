/*!
 * ISO 639 language code helpers.
 *
 * Codes are accepted as ISO 639-1 (`ru`), ISO 639-2/T (`rus`) or the
 * bibliographic ISO 639-2/B variants (`ger`, `fre`). The pseudo-code `auto`
 * is accepted wherever the source language may be detected by the backend.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Pseudo-code meaning "let the backend detect the language"
pub const AUTO_LANGUAGE: &str = "auto";

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Which flavour of ISO code was supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    Part1,
    Part2T,
    Part2B,
}

fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

fn resolve(code: &str) -> Option<(Language, LanguageCodeType)> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized).map(|l| (l, LanguageCodeType::Part1)),
        3 => {
            if let Some(lang) = Language::from_639_3(&normalized) {
                return Some((lang, LanguageCodeType::Part2T));
            }
            bibliographic_to_terminology(&normalized)
                .and_then(Language::from_639_3)
                .map(|l| (l, LanguageCodeType::Part2B))
        }
        _ => None,
    }
}

/// Whether the code is the `auto` detection marker
pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO_LANGUAGE)
}

/// Validate a language code and report which ISO flavour it is
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    resolve(code)
        .map(|(_, kind)| kind)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    resolve(code)
        .map(|(lang, _)| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize to ISO 639-1 where one exists, otherwise ISO 639-2/T
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let (lang, _) = resolve(code)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// English name of a language, or "auto-detected" for the auto marker
pub fn get_language_name(code: &str) -> Result<String> {
    if is_auto(code) {
        return Ok("auto-detected".to_string());
    }
    let (lang, _) = resolve(code).ok_or_else(|| anyhow!("Unknown language code: {}", code))?;
    Ok(lang.to_name().to_string())
}

/// Code as expected by the DeepL API.
///
/// DeepL wants upper-case ISO 639-1 codes and a regional variant for English
/// and Portuguese targets. Returns `None` for `auto` so the caller can omit
/// the field.
pub fn to_deepl_code(code: &str, as_target: bool) -> Result<Option<String>> {
    if is_auto(code) {
        return Ok(None);
    }
    let short = normalize_to_part1_or_part2t(code)?.to_uppercase();
    let deepl = match (short.as_str(), as_target) {
        ("EN", true) => "EN-US".to_string(),
        ("PT", true) => "PT-PT".to_string(),
        _ => short,
    };
    Ok(Some(deepl))
}
