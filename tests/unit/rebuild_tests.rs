/*!
 * Tests for per-language document reconstruction
 */

use std::collections::HashMap;

use transloom::dedup::{deduplicate, DedupOptions};
use transloom::document::{Document, TabularDocument, Template};
use transloom::rebuild::{expand_to_segments, rebuild_document, OverwriteMode, SegmentTranslations};

use crate::common;

fn identity_translations(extraction: &transloom::Extraction) -> SegmentTranslations {
    extraction
        .segments
        .iter()
        .map(|s| (s.id.clone(), s.source_text.clone()))
        .collect()
}

#[test]
fn test_rebuild_roundTripIdentity_json() {
    let document = common::json_document("payload");
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &identity_translations(&extraction),
        "fr-FR",
        OverwriteMode::default(),
    );

    let Document::Json(original) = &document else { panic!() };
    let Document::Json(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(original.root, rebuilt.root);
}

#[test]
fn test_rebuild_roundTripIdentity_subtitle() {
    let document = common::subtitle_document("episode");
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &identity_translations(&extraction),
        "fr-FR",
        OverwriteMode::default(),
    );

    let Document::Subtitle(original) = &document else { panic!() };
    let Document::Subtitle(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(original.to_srt_string(), rebuilt.to_srt_string());
}

#[test]
fn test_rebuild_roundTripIdentity_htmlPreservesEveryByte() {
    let content = "<div id=\"a\">\n  <p>Hello <b>bold</b> world</p>\n\t<span>tail</span>\n</div>";
    let document = Document::Text(transloom::document::TextDocument::new("page", content));
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &identity_translations(&extraction),
        "fr-FR",
        OverwriteMode::default(),
    );
    let Document::Text(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.content, content);
}

fn sheet_with_french_column() -> Document {
    Document::Tabular(
        TabularDocument::new(
            "sheet",
            vec!["Key".to_string(), "Source".to_string(), "fr-FR".to_string()],
            vec![
                vec!["k1".to_string(), "Hello".to_string(), "Salut".to_string()],
                vec!["k2".to_string(), "Goodbye".to_string(), String::new()],
            ],
            1,
        )
        .with_language_column("fr-FR", 2),
    )
}

fn french_translations() -> SegmentTranslations {
    HashMap::from([
        ("T1".to_string(), "Bonjour".to_string()),
        ("T2".to_string(), "Au revoir".to_string()),
    ])
}

#[test]
fn test_rebuild_tabular_keepMode_shouldLeaveExistingColumnAlone() {
    let document = sheet_with_french_column();
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &french_translations(),
        "fr-FR",
        OverwriteMode::Keep,
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.rows[0][2], "Salut");
    assert_eq!(rebuilt.rows[1][2], "");
}

#[test]
fn test_rebuild_tabular_fillEmptyMode_shouldOnlyFillBlankCells() {
    let document = sheet_with_french_column();
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &french_translations(),
        "fr-FR",
        OverwriteMode::FillEmpty,
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.rows[0][2], "Salut");
    assert_eq!(rebuilt.rows[1][2], "Au revoir");
}

#[test]
fn test_rebuild_tabular_overwriteAllMode_shouldReplaceEverything() {
    let document = sheet_with_french_column();
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &french_translations(),
        "fr-FR",
        OverwriteMode::OverwriteAll,
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.rows[0][2], "Bonjour");
    assert_eq!(rebuilt.rows[1][2], "Au revoir");
}

#[test]
fn test_rebuild_tabular_newLanguage_shouldAppendColumn() {
    let document = common::tabular_document("sheet", &["Hello", "Goodbye"]);
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &french_translations(),
        "fr-FR",
        // Keep applies to existing columns only; a fresh column is filled
        OverwriteMode::Keep,
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.header.last().map(|h| h.as_str()), Some("fr-FR"));
    assert_eq!(rebuilt.rows[0][2], "Bonjour");
    assert_eq!(rebuilt.rows[1][2], "Au revoir");
}

#[test]
fn test_rebuild_tabular_nonPlaceholderCells_shouldBeCopiedVerbatim() {
    let document = sheet_with_french_column();
    let extraction = document.extract().unwrap();

    let rebuilt = rebuild_document(
        &extraction.template,
        &extraction.segments,
        &french_translations(),
        "fr-FR",
        OverwriteMode::OverwriteAll,
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.rows[0][0], "k1");
    assert_eq!(rebuilt.rows[0][1], "Hello");
    assert_eq!(rebuilt.rows[1][0], "k2");
}

#[test]
fn test_expandToSegments_multiFile_shouldSeedEveryFile() {
    let first = common::tabular_document("a", &["Shared", "OnlyA"]).extract().unwrap();
    let second = common::tabular_document("b", &["Shared"]).extract().unwrap();
    let report = deduplicate(&[first.clone(), second.clone()], &DedupOptions::default());

    let shared = report.canonical.iter().find(|c| c.key == "Shared").unwrap();
    let texts = HashMap::from([(shared.id.clone(), "Partagé".to_string())]);
    let maps = expand_to_segments(&report.canonical, &texts, 2);

    // One canonical result reaches both files through their own templates
    assert_eq!(maps[0].get("T1").map(|s| s.as_str()), Some("Partagé"));
    assert_eq!(maps[1].get("T1").map(|s| s.as_str()), Some("Partagé"));

    let rebuilt = rebuild_document(
        &second.template,
        &second.segments,
        &maps[1],
        "fr-FR",
        OverwriteMode::default(),
    );
    let Document::Tabular(rebuilt) = &rebuilt else { panic!() };
    assert_eq!(rebuilt.rows[0][2], "Partagé");

    // The template itself records the original structure
    let Template::Tabular(template) = &second.template else { panic!() };
    assert_eq!(template.rows[0].cells[1], "Shared");
}
