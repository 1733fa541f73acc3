use anyhow::{anyhow, Result};
use isolang::Language;

/// Language tag utilities
///
/// Target languages arrive as bare ISO 639 codes ("fr") or region-qualified
/// tags ("fr-FR", "pt_BR"). Validation and matching work on the base
/// language subtag; the full tag is preserved everywhere else, since review
/// tables and output columns are keyed by the tag as given.
/// Split a tag into its base language subtag and optional region.
pub fn split_tag(tag: &str) -> (String, Option<String>) {
    let trimmed = tag.trim();
    match trimmed.split_once(['-', '_']) {
        Some((base, region)) => (base.to_lowercase(), Some(region.to_uppercase())),
        None => (trimmed.to_lowercase(), None),
    }
}

/// Resolve the base subtag of a tag to an ISO language.
fn base_language(tag: &str) -> Result<Language> {
    let (base, _) = split_tag(tag);

    if base.len() == 2 {
        if let Some(language) = Language::from_639_1(&base) {
            return Ok(language);
        }
    } else if base.len() == 3 {
        if let Some(language) = Language::from_639_3(&base) {
            return Ok(language);
        }
    }

    Err(anyhow!("Invalid language tag: {}", tag))
}

/// Validate that a tag carries a known base language subtag.
pub fn validate_tag(tag: &str) -> Result<()> {
    base_language(tag).map(|_| ())
}

/// Normalize a tag's base subtag to ISO 639-1 where one exists, keeping the
/// region suffix: "fra-FR" becomes "fr-FR".
pub fn normalize_tag(tag: &str) -> Result<String> {
    let language = base_language(tag)?;
    let (_, region) = split_tag(tag);

    let base = language
        .to_639_1()
        .map(|code| code.to_string())
        .unwrap_or_else(|| language.to_639_3().to_string());

    Ok(match region {
        Some(region) => format!("{}-{}", base, region),
        None => base,
    })
}

/// Check if two tags refer to the same base language, ignoring region:
/// "fr" matches "fr-FR" and "fra".
pub fn language_tags_match(first: &str, second: &str) -> bool {
    match (base_language(first), base_language(second)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name for a tag.
pub fn language_name(tag: &str) -> Result<String> {
    let language = base_language(tag)?;
    Ok(language.to_name().to_string())
}
