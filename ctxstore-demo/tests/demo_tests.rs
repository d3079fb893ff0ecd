use ctxstore_backend::{KeyValueBackend, MemoryBackend};
use ctxstore_demo::{open_backend, BackendKind, Demo, PromptsReport, ThemeReport};
use ctxstore_schema::slots::Theme;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

#[tokio::test]
async fn theme_scenario_report() {
    let demo = Demo::start(Arc::new(MemoryBackend::new())).unwrap();

    let report = demo.theme_scenario().await.unwrap();
    assert_eq!(
        report,
        ThemeReport {
            initial: Theme::Light,
            after_set: Some(Theme::Dark),
            seeded_in_content: Theme::Dark,
            after_remove: Theme::Light,
        }
    );
    demo.shutdown().await;
}

#[tokio::test]
async fn prompts_scenario_report() {
    let demo = Demo::start(Arc::new(MemoryBackend::new())).unwrap();

    let report = demo.prompts_scenario().await.unwrap();
    assert_eq!(
        report,
        PromptsReport {
            prompts_stored: 1,
            content_saw: Some(1),
            closed_popup_saw: None,
        }
    );
    assert_eq!(demo.hub().len(), 3);
    demo.shutdown().await;
}

#[tokio::test]
async fn file_backend_keeps_prompts_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.json");

    let first = Demo::start(open_backend(BackendKind::File, &path).await.unwrap()).unwrap();
    assert_eq!(first.prompts_scenario().await.unwrap().prompts_stored, 1);
    first.shutdown().await;

    let second = Demo::start(open_backend(BackendKind::File, &path).await.unwrap()).unwrap();
    let report = second.prompts_scenario().await.unwrap();
    assert_eq!(report.prompts_stored, 2);
    assert_eq!(report.content_saw, Some(2));
    second.shutdown().await;
}

#[tokio::test]
async fn memory_backend_ignores_data_file() {
    let backend = open_backend(BackendKind::Memory, Path::new("unused.json"))
        .await
        .unwrap();
    assert_eq!(backend.name(), "memory");
}
