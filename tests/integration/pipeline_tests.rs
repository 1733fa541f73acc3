/*!
 * End-to-end pipeline tests: extraction, deduplication, controlled
 * translation, and rebuild against mock providers
 */

use std::collections::HashMap;
use std::sync::Arc;

use transloom::app_config::RequestPacing;
use transloom::dedup::Glossary;
use transloom::document::{Document, JsonDocument, JsonSchema};
use transloom::pipeline::{BatchPipeline, TranslateOptions};
use transloom::providers::{MockProvider, ProviderOptions};
use transloom::review::apply_review;
use transloom::translation::{ControlHandle, ControlToken, RunState};

use crate::common;

fn options(targets: &[&str]) -> TranslateOptions {
    TranslateOptions {
        source_language: "en".to_string(),
        target_languages: targets.iter().map(|t| t.to_string()).collect(),
        do_not_translate: Vec::new(),
        glossary: Glossary::new(),
        pacing: RequestPacing::Fast,
        provider_options: ProviderOptions::default(),
        overwrite_modes: HashMap::new(),
    }
}

#[tokio::test]
async fn test_pipeline_specWorkedExample_sixCellsFromFourLookups() {
    common::init_test_logging();

    // 3 rows ("Hello", "Hello", "Goodbye"), 2 target languages: the provider
    // must see exactly 2 unique strings per language
    let provider = Arc::new(MockProvider::working().with_batch_size(1));
    let pipeline = BatchPipeline::new(provider.clone());
    let documents = vec![common::tabular_document("strings", &["Hello", "Hello", "Goodbye"])];

    let output = pipeline
        .run(
            &documents,
            &options(&["fr-FR", "de-DE"]),
            ControlToken::unsupervised(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(output.state, RunState::Completed);
    assert_eq!(output.dedup.total_count, 3);
    assert_eq!(output.dedup.unique_count, 2);
    assert_eq!(output.dedup.saved_count, 1);
    // 2 unique strings x 2 languages, one string per call
    assert_eq!(provider.call_count(), 4);

    // 6 populated cells across the two rebuilt sheets
    let translated = &output.documents[0];
    let mut populated = 0;
    for language in ["fr-FR", "de-DE"] {
        let Document::Tabular(sheet) = &translated.outputs[language] else { panic!() };
        let column = sheet.language_columns[language];
        for row in &sheet.rows {
            assert!(!row[column].is_empty());
            populated += 1;
        }
    }
    assert_eq!(populated, 6);

    let Document::Tabular(french) = &translated.outputs["fr-FR"] else { panic!() };
    assert_eq!(french.rows[0][2], "[fr-FR] Hello");
    assert_eq!(french.rows[1][2], "[fr-FR] Hello");
    assert_eq!(french.rows[2][2], "[fr-FR] Goodbye");
}

#[tokio::test]
async fn test_pipeline_multiFile_shouldTranslateSharedStringsOnce() {
    let provider = Arc::new(MockProvider::working().with_batch_size(10));
    let pipeline = BatchPipeline::new(provider.clone());
    let documents = vec![
        common::tabular_document("first", &["Shared", "Only first"]),
        common::tabular_document("second", &["Shared", "Only second"]),
    ];

    let output = pipeline
        .run(&documents, &options(&["fr-FR"]), ControlToken::unsupervised(), None)
        .await
        .unwrap();

    // "Shared" is requested exactly once despite appearing in both files
    let requested = provider.requested_strings();
    assert_eq!(requested.iter().filter(|s| s.as_str() == "Shared").count(), 1);

    for translated in &output.documents {
        let Document::Tabular(sheet) = &translated.outputs["fr-FR"] else { panic!() };
        assert_eq!(sheet.rows[0][2], "[fr-FR] Shared");
    }
}

#[tokio::test]
async fn test_pipeline_cancelAfterFirstLanguage_shouldKeepCompletedLanguageOnly() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = BatchPipeline::new(provider);
    let documents = vec![common::subtitle_document("episode")];

    let (handle, token) = ControlHandle::new();
    let observer = Arc::new(move |state: &transloom::ProgressState| {
        if state.current_language.as_deref() == Some("de-DE") {
            handle.cancel();
        }
    });

    let output = pipeline
        .run(
            &documents,
            &options(&["fr-FR", "de-DE", "es-ES"]),
            token,
            Some(observer),
        )
        .await
        .unwrap();

    assert_eq!(output.state, RunState::Cancelled);
    let translated = &output.documents[0];
    assert_eq!(translated.outputs.len(), 1);
    assert!(translated.outputs.contains_key("fr-FR"));
}

#[tokio::test]
async fn test_pipeline_malformedDocument_shouldFailBeforeAnyProviderCall() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = BatchPipeline::new(provider.clone());
    let documents = vec![Document::Json(JsonDocument::new(
        "broken",
        JsonSchema::new("page", vec!["missing.leaf".to_string()]),
        serde_json::json!({"title": "Hello"}),
    ))];

    let result = pipeline
        .run(&documents, &options(&["fr-FR"]), ControlToken::unsupervised(), None)
        .await;

    assert!(result.is_err());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_pipeline_dntAndGlossary_shouldBypassProviderButPopulateOutput() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = BatchPipeline::new(provider.clone());
    let documents = vec![common::tabular_document("strings", &["Acme", "Welcome", "Hello"])];

    let mut run_options = options(&["fr-FR"]);
    run_options.do_not_translate = vec!["Acme".to_string()];
    run_options.glossary.insert(
        "Welcome".to_string(),
        HashMap::from([("fr-FR".to_string(), "Bienvenue".to_string())]),
    );

    let output = pipeline
        .run(&documents, &run_options, ControlToken::unsupervised(), None)
        .await
        .unwrap();

    assert_eq!(provider.requested_strings(), vec!["Hello".to_string()]);

    let Document::Tabular(sheet) = &output.documents[0].outputs["fr-FR"] else { panic!() };
    // Do-not-translate rows are copied verbatim, glossary rows pre-resolved
    assert_eq!(sheet.rows[0][2], "Acme");
    assert_eq!(sheet.rows[1][2], "Bienvenue");
    assert_eq!(sheet.rows[2][2], "[fr-FR] Hello");
}

#[tokio::test]
async fn test_pipeline_htmlDocument_shouldPreserveMarkupInOutput() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = BatchPipeline::new(provider);
    let documents = vec![common::html_document("page")];

    let output = pipeline
        .run(&documents, &options(&["de-DE"]), ControlToken::unsupervised(), None)
        .await
        .unwrap();

    let Document::Text(page) = &output.documents[0].outputs["de-DE"] else { panic!() };
    assert_eq!(
        page.content,
        "<h1>[de-DE] Title</h1>\n<p>[de-DE] First paragraph.</p>\n<p>[de-DE] Second paragraph.</p>"
    );
}

#[tokio::test]
async fn test_pipeline_artifactReapply_shouldMatchPipelineOutput() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = BatchPipeline::new(provider);
    let documents = vec![common::tabular_document("strings", &["Hello", "Goodbye"])];

    let output = pipeline
        .run(&documents, &options(&["fr-FR"]), ControlToken::unsupervised(), None)
        .await
        .unwrap();

    let translated = &output.documents[0];

    // Export the review table, import it unchanged, and rebuild: the result
    // must match the pipeline's own output
    let mut buffer = Vec::new();
    translated.artifact.write_review_table(&mut buffer, "fr-FR").unwrap();
    let rows = transloom::review::read_review_table(buffer.as_slice()).unwrap();
    let rebuilt = apply_review(
        &translated.artifact,
        &HashMap::from([("fr-FR".to_string(), rows)]),
    );

    let Document::Tabular(first) = &translated.outputs["fr-FR"] else { panic!() };
    let Document::Tabular(second) = &rebuilt["fr-FR"] else { panic!() };
    assert_eq!(first.rows, second.rows);
}

#[tokio::test]
async fn test_pipeline_partialLanguageFailure_shouldStillProduceOtherLanguages() {
    let provider = Arc::new(MockProvider::failing_language("de-DE"));
    let pipeline = BatchPipeline::new(provider);
    let documents = vec![common::tabular_document("strings", &["Hello"])];

    let output = pipeline
        .run(
            &documents,
            &options(&["de-DE", "fr-FR"]),
            ControlToken::unsupervised(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(output.state, RunState::Completed);
    assert_eq!(output.report.failed_languages(), vec!["de-DE"]);
    assert_eq!(output.report.succeeded_languages(), vec!["fr-FR"]);

    let translated = &output.documents[0];
    let Document::Tabular(french) = &translated.outputs["fr-FR"] else { panic!() };
    assert_eq!(french.rows[0][2], "[fr-FR] Hello");

    // The failed language falls back to source text for its rebuilt cells
    let Document::Tabular(german) = &translated.outputs["de-DE"] else { panic!() };
    assert_eq!(german.rows[0][2], "Hello");
}
