/*!
 * Tests for language tag utilities
 */

use transloom::language_utils::{
    language_name, language_tags_match, normalize_tag, split_tag, validate_tag,
};

#[test]
fn test_splitTag_withRegion_shouldSeparateBaseAndRegion() {
    assert_eq!(split_tag("fr-FR"), ("fr".to_string(), Some("FR".to_string())));
    assert_eq!(split_tag("pt_br"), ("pt".to_string(), Some("BR".to_string())));
    assert_eq!(split_tag("de"), ("de".to_string(), None));
}

#[test]
fn test_validateTag_withValidCodes_shouldAccept() {
    assert!(validate_tag("en").is_ok());
    assert!(validate_tag("fr-FR").is_ok());
    assert!(validate_tag("deu").is_ok());
}

#[test]
fn test_validateTag_withInvalidCodes_shouldReject() {
    assert!(validate_tag("xx").is_err());
    assert!(validate_tag("").is_err());
    assert!(validate_tag("english").is_err());
}

#[test]
fn test_normalizeTag_shouldPreferTwoLetterBase() {
    assert_eq!(normalize_tag("fra-FR").unwrap(), "fr-FR");
    assert_eq!(normalize_tag("DEU").unwrap(), "de");
    assert_eq!(normalize_tag("en").unwrap(), "en");
}

#[test]
fn test_languageTagsMatch_shouldIgnoreRegion() {
    assert!(language_tags_match("fr", "fr-FR"));
    assert!(language_tags_match("fra", "fr-CA"));
    assert!(!language_tags_match("fr", "de"));
    assert!(!language_tags_match("fr", "not-a-tag"));
}

#[test]
fn test_languageName_shouldResolveEnglishNames() {
    assert_eq!(language_name("fr").unwrap(), "French");
    assert_eq!(language_name("de-DE").unwrap(), "German");
    assert!(language_name("zz").is_err());
}
