/*!
 * Tests for the translation controller: sequencing, pause/resume/cancel,
 * failure semantics, and progress accounting
 */

use std::collections::HashMap;
use std::sync::Arc;

use transloom::app_config::RequestPacing;
use transloom::dedup::{deduplicate, DedupOptions, DedupReport, Glossary};
use transloom::errors::AppError;
use transloom::providers::{MockProvider, ProviderOptions};
use transloom::translation::{
    ControlHandle, ControlToken, InMemoryTranslationMemory, ProgressReporter, RunState,
    TranslationController, TranslationMemory,
};
use transloom::translation::controller::RunRequest;

use crate::common;

fn dedup_for(rows: &[&str], options: &DedupOptions) -> DedupReport {
    let document = common::tabular_document("sheet", rows);
    deduplicate(&[document.extract().unwrap()], options)
}

fn languages(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn request<'a>(
    dedup: &'a DedupReport,
    target_languages: &'a [String],
    glossary: &'a Glossary,
    provider_options: &'a ProviderOptions,
) -> RunRequest<'a> {
    RunRequest {
        dedup,
        source_language: "en",
        target_languages,
        glossary,
        pacing: RequestPacing::Fast,
        provider_options,
    }
}

#[tokio::test]
async fn test_run_withWorkingProvider_shouldTranslateEveryLanguage() {
    let provider = Arc::new(MockProvider::working().with_batch_size(2));
    let controller = TranslationController::new(provider.clone());

    let dedup = dedup_for(&["Hello", "Hello", "Goodbye"], &DedupOptions::default());
    let targets = languages(&["fr-FR", "de-DE"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let outcome = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.translations.len(), 2);
    // 2 unique strings, batch size 2: exactly one call per language
    assert_eq!(provider.call_count(), 2);
    assert_eq!(outcome.report.provider_calls, 2);
    assert!(outcome.report.failed_languages().is_empty());

    let fr = &outcome.translations["fr-FR"];
    assert_eq!(fr.len(), 2);
    assert!(fr.values().any(|t| t == "[fr-FR] Hello"));
}

#[tokio::test]
async fn test_run_progressUnits_shouldBeCanonicalTimesLanguages() {
    let provider = Arc::new(MockProvider::working().with_batch_size(1));
    let controller = TranslationController::new(provider);

    let dedup = dedup_for(&["One", "Two", "Three"], &DedupOptions::default());
    let targets = languages(&["fr-FR", "de-DE"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let reporter = ProgressReporter::default();
    controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &reporter,
        )
        .await
        .unwrap();

    let state = reporter.snapshot();
    assert_eq!(state.total, 6);
    assert_eq!(state.current, 6);
}

#[tokio::test]
async fn test_run_cancelAfterFirstLanguage_shouldKeepOnlyCompletedLanguages() {
    let provider = Arc::new(MockProvider::working());
    let controller = TranslationController::new(provider);

    let dedup = dedup_for(&["Hello", "Goodbye"], &DedupOptions::default());
    let targets = languages(&["fr-FR", "de-DE", "es-ES"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    // Cancel as soon as the controller moves on to the second language
    let (handle, token) = ControlHandle::new();
    let reporter = ProgressReporter::new(Some(Arc::new(move |state: &transloom::ProgressState| {
        if state.current_language.as_deref() == Some("de-DE") {
            handle.cancel();
        }
    })));

    let outcome = controller
        .run(request(&dedup, &targets, &glossary, &options), token, &reporter)
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Cancelled);
    assert_eq!(outcome.translations.len(), 1);
    assert!(outcome.translations.contains_key("fr-FR"));
    assert!(reporter.snapshot().cancelled);
}

#[tokio::test]
async fn test_run_withAuthError_shouldFailTheWholeRun() {
    let provider = Arc::new(MockProvider::auth_failure());
    let controller = TranslationController::new(provider.clone());

    let dedup = dedup_for(&["Hello"], &DedupOptions::default());
    let targets = languages(&["fr-FR", "de-DE"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let result = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Provider(_))));
    // No retry for authentication errors
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_run_withTransientError_shouldContinueWithRemainingLanguages() {
    let provider = Arc::new(MockProvider::failing_language("de-DE"));
    let controller = TranslationController::new(provider);

    let dedup = dedup_for(&["Hello", "Goodbye"], &DedupOptions::default());
    let targets = languages(&["de-DE", "fr-FR"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let outcome = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Completed);

    let de = outcome.report.languages.iter().find(|l| l.language == "de-DE").unwrap();
    assert!(de.error.is_some());
    assert_eq!(de.failed, 2);

    let fr = outcome.report.languages.iter().find(|l| l.language == "fr-FR").unwrap();
    assert!(fr.succeeded());
    assert_eq!(outcome.translations["fr-FR"].len(), 2);
    assert_eq!(outcome.report.summary(), "1/2 languages completed, 1 had failures");
}

#[tokio::test]
async fn test_run_withMissingKeys_shouldFallBackToSourceText() {
    let provider = Arc::new(MockProvider::missing_keys(2).with_batch_size(10));
    let controller = TranslationController::new(provider);

    let dedup = dedup_for(&["One", "Two", "Three"], &DedupOptions::default());
    let targets = languages(&["fr-FR"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let outcome = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    let fr = &outcome.translations["fr-FR"];
    // Every requested key resolves; the dropped one keeps its source text
    assert_eq!(fr.len(), 3);
    assert!(fr.values().any(|t| t == "Two"));

    let language = &outcome.report.languages[0];
    assert_eq!(language.translated, 2);
    assert_eq!(language.failed, 1);
}

#[tokio::test]
async fn test_run_withMemoryHit_shouldSkipProviderForThatString() {
    let memory: Arc<InMemoryTranslationMemory> = Arc::new(InMemoryTranslationMemory::new());
    memory.store("Hello", "en", "fr-FR", "Bonjour");

    let provider = Arc::new(MockProvider::working());
    let controller = TranslationController::new(provider.clone()).with_memory(memory);

    let dedup = dedup_for(&["Hello", "Goodbye"], &DedupOptions::default());
    let targets = languages(&["fr-FR"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let outcome = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.report.memory_hits, 1);
    assert!(!provider.requested_strings().contains(&"Hello".to_string()));
    assert!(outcome.translations["fr-FR"].values().any(|t| t == "Bonjour"));
}

#[tokio::test]
async fn test_run_withFreshTranslations_shouldStoreThemInMemory() {
    let memory: Arc<InMemoryTranslationMemory> = Arc::new(InMemoryTranslationMemory::new());
    let provider = Arc::new(MockProvider::working());
    let controller = TranslationController::new(provider).with_memory(memory.clone());

    let dedup = dedup_for(&["Hello"], &DedupOptions::default());
    let targets = languages(&["fr-FR"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        memory.lookup("Hello", "en", "fr-FR"),
        Some("[fr-FR] Hello".to_string())
    );
}

#[tokio::test]
async fn test_run_withGlossaryAndDnt_shouldNeverSendThemToProvider() {
    let provider = Arc::new(MockProvider::working());
    let controller = TranslationController::new(provider.clone());

    let mut glossary = Glossary::new();
    glossary.insert(
        "Welcome".to_string(),
        HashMap::from([("fr-FR".to_string(), "Bienvenue".to_string())]),
    );
    let dedup_options = DedupOptions {
        do_not_translate: vec!["Acme".to_string()],
        predefined_translations: glossary.clone(),
    };
    let dedup = dedup_for(&["Acme", "Welcome", "Hello"], &dedup_options);
    let targets = languages(&["fr-FR"]);
    let options = ProviderOptions::default();

    let outcome = controller
        .run(
            request(&dedup, &targets, &glossary, &options),
            ControlToken::unsupervised(),
            &ProgressReporter::default(),
        )
        .await
        .unwrap();

    let requested = provider.requested_strings();
    assert!(!requested.contains(&"Acme".to_string()));
    assert!(!requested.contains(&"Welcome".to_string()));
    assert_eq!(requested, vec!["Hello".to_string()]);

    assert_eq!(outcome.report.glossary_hits, 1);
    assert!(outcome.translations["fr-FR"].values().any(|t| t == "Bienvenue"));
}

#[tokio::test]
async fn test_run_pausedRun_shouldStallUntilResumed() {
    let provider = Arc::new(MockProvider::working());
    let controller = TranslationController::new(provider.clone());

    let dedup = dedup_for(&["Hello"], &DedupOptions::default());
    let targets = languages(&["fr-FR"]);
    let glossary = Glossary::new();
    let options = ProviderOptions::default();

    let (handle, token) = ControlHandle::new();
    handle.pause();

    let reporter = ProgressReporter::default();
    let driver = async {
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        // Nothing was dispatched while paused
        assert_eq!(provider.call_count(), 0);
        handle.resume();
    };
    let (outcome, _) = tokio::join!(
        controller.run(request(&dedup, &targets, &glossary, &options), token, &reporter),
        driver
    );

    let outcome = outcome.unwrap();
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.translations["fr-FR"].len(), 1);
}
