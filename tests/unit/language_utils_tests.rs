/*!
 * Tests for ISO language code utilities
 */

use subpair::language_utils::{
    get_language_name, is_auto, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    to_deepl_code, validate_language_code, LanguageCodeType,
};

#[test]
fn test_validate_language_code_withEachFlavour_shouldClassify() {
    assert_eq!(validate_language_code("ru").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("rus").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("").is_err());
}

#[test]
fn test_normalize_withMixedCodes_shouldAgree() {
    assert_eq!(normalize_to_part2t("FR").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
    assert!(language_codes_match("de", "ger"));
    assert!(!language_codes_match("de", "fr"));
}

#[test]
fn test_get_language_name_withAuto_shouldDescribeDetection() {
    assert!(is_auto("AUTO"));
    assert_eq!(get_language_name("auto").unwrap(), "auto-detected");
    assert_eq!(get_language_name("ru").unwrap(), "Russian");
}

#[test]
fn test_to_deepl_code_withSourceAndTarget_shouldFormatForApi() {
    assert_eq!(to_deepl_code("auto", false).unwrap(), None);
    assert_eq!(to_deepl_code("rus", true).unwrap().as_deref(), Some("RU"));
    assert_eq!(to_deepl_code("pt", true).unwrap().as_deref(), Some("PT-PT"));
    assert_eq!(to_deepl_code("pt", false).unwrap().as_deref(), Some("PT"));
    assert!(to_deepl_code("nope", true).is_err());
}
