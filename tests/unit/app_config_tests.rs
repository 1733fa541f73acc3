/*!
 * Tests for configuration loading, defaults, and validation
 */

use std::time::Duration;

use transloom::app_config::{Config, RequestPacing};

use crate::common;

fn valid_config() -> Config {
    Config {
        source_language: "en".to_string(),
        target_languages: vec!["fr-FR".to_string(), "de-DE".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_validate_withValidLanguages_shouldSucceed() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_validate_withoutTargets_shouldFail() {
    let config = Config {
        target_languages: Vec::new(),
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withSourceAmongTargets_shouldFail() {
    let config = Config {
        target_languages: vec!["en-GB".to_string()],
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let config = Config {
        target_languages: vec!["zz-ZZ".to_string()],
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_pacingPresets_shouldMatchDocumentedDelays() {
    assert_eq!(RequestPacing::Fast.delay(), Duration::from_millis(100));
    assert_eq!(RequestPacing::Balanced.delay(), Duration::from_millis(300));
    assert_eq!(RequestPacing::Reliable.delay(), Duration::from_millis(500));
    assert_eq!(RequestPacing::default(), RequestPacing::Balanced);
}

#[test]
fn test_pacing_fromStr_shouldParseLowercaseNames() {
    assert_eq!("fast".parse::<RequestPacing>().unwrap(), RequestPacing::Fast);
    assert_eq!("RELIABLE".parse::<RequestPacing>().unwrap(), RequestPacing::Reliable);
    assert!("sluggish".parse::<RequestPacing>().is_err());
}

#[test]
fn test_saveAndLoad_shouldRoundTripConfig() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("transloom.json");

    let mut config = valid_config();
    config.pacing = RequestPacing::Reliable;
    config.do_not_translate.push("Acme".to_string());
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.source_language, "en");
    assert_eq!(loaded.target_languages.len(), 2);
    assert_eq!(loaded.pacing, RequestPacing::Reliable);
    assert_eq!(loaded.do_not_translate, vec!["Acme".to_string()]);
}

#[test]
fn test_fromFile_withPartialJson_shouldApplyDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        &dir.path().to_path_buf(),
        "minimal.json",
        r#"{"source_language": "en", "target_languages": ["es"]}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.pacing, RequestPacing::Balanced);
    assert!(config.do_not_translate.is_empty());
    assert!(config.glossary.is_empty());
}
