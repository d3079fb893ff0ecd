//! Demo runtime for ctxstore.
//!
//! Starts one background, one content and one popup context on a single hub
//! and drives the theme and prompts scenarios through them.

use anyhow::{Context, Result};
use clap::ValueEnum;
use ctxstore_backend::{JsonFileBackend, KeyValueBackend, MemoryBackend};
use ctxstore_client::{BackgroundConfig, BackgroundContext, ClientConfig, ClientContext};
use ctxstore_rpc::Hub;
use ctxstore_schema::slots::{Prompt, Theme};
use ctxstore_schema::KeyRegistry;
use ctxstore_types::ContextKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// How long a watcher is given to see a change before it counts as missed.
const DELIVERY_WINDOW: Duration = Duration::from_millis(500);

/// Which backend the background context stores into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Memory,
    File,
}

/// Opens the chosen backend. `data_file` is only used by [`BackendKind::File`].
pub async fn open_backend(kind: BackendKind, data_file: &Path) -> Result<Arc<dyn KeyValueBackend>> {
    Ok(match kind {
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
        BackendKind::File => Arc::new(
            JsonFileBackend::open(data_file)
                .await
                .with_context(|| format!("Failed to open data file {}", data_file.display()))?,
        ),
    })
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ThemeReport {
    pub initial: Theme,
    pub after_set: Option<Theme>,
    pub seeded_in_content: Theme,
    pub after_remove: Theme,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PromptsReport {
    pub prompts_stored: usize,
    pub content_saw: Option<usize>,
    pub closed_popup_saw: Option<usize>,
}

/// A hub with one context of each kind.
pub struct Demo {
    hub: Hub,
    background: BackgroundContext,
    content: ClientContext,
    popup: ClientContext,
}

impl Demo {
    /// Must be called within a tokio runtime.
    pub fn start(backend: Arc<dyn KeyValueBackend>) -> Result<Self> {
        let hub = Hub::default();
        let registry = KeyRegistry::builtin().context("Failed to build key registry")?;
        let background =
            BackgroundContext::start(&hub, backend, registry, BackgroundConfig::default())
                .context("Failed to start background context")?;
        let content = ClientContext::connect(&hub, ContextKind::Content, ClientConfig::default())
            .context("Failed to connect content context")?;
        let popup = ClientContext::connect(&hub, ContextKind::Popup, ClientConfig::default())
            .context("Failed to connect popup context")?;

        info!("Hub '{}' running with {} contexts", hub.name(), hub.len());
        Ok(Self {
            hub,
            background,
            content,
            popup,
        })
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Default, set from the popup, seed a watcher in the page, remove.
    pub async fn theme_scenario(&self) -> Result<ThemeReport> {
        let theme = self.popup.storage().theme();

        let initial = theme.get_with_default().await;
        info!("Theme starts as {:?}", initial);

        theme.set(&Theme::Dark).await.context("Failed to set theme")?;
        let after_set = theme.get().await.context("Failed to read theme")?;
        info!("Popup set theme, reads back {:?}", after_set);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let watch = self
            .content
            .storage()
            .theme()
            .watch(move |t| {
                let _ = tx.send(t);
            })
            .await
            .context("Failed to watch theme")?;
        let seeded_in_content = rx.recv().await.unwrap_or_default();
        info!("Content watcher seeded with {:?}", seeded_in_content);
        watch.unsubscribe();

        theme.remove().await.context("Failed to remove theme")?;
        let after_remove = theme.get_with_default().await;
        info!("After remove, theme falls back to {:?}", after_remove);

        Ok(ThemeReport {
            initial,
            after_set,
            seeded_in_content,
            after_remove,
        })
    }

    /// Appends a prompt from the popup while the page watches and a second
    /// popup has already closed.
    pub async fn prompts_scenario(&self) -> Result<PromptsReport> {
        let (content_tx, mut content_rx) = mpsc::unbounded_channel();
        let content_watch = self
            .content
            .storage()
            .prompts()
            .watch(move |list: Vec<Prompt>| {
                let _ = content_tx.send(list.len());
            })
            .await
            .context("Failed to watch prompts in content")?;

        let closed = ClientContext::connect(&self.hub, ContextKind::Popup, ClientConfig::default())
            .context("Failed to connect second popup")?;
        let (closed_tx, mut closed_rx) = mpsc::unbounded_channel();
        let closed_watch = closed
            .storage()
            .prompts()
            .watch(move |list: Vec<Prompt>| {
                let _ = closed_tx.send(list.len());
            })
            .await
            .context("Failed to watch prompts in second popup")?;

        // Drop the seed values.
        content_rx.recv().await;
        closed_rx.recv().await;
        closed.close().await;
        info!("Second popup closed before the write");

        let prompts = self.popup.storage().prompts();
        let mut list = prompts.get_with_default().await;
        list.push(Prompt::new(
            "Summarise",
            "Summarise the selected text in three bullet points.",
            vec!["reading".to_string()],
        ));
        prompts.set(&list).await.context("Failed to save prompts")?;
        info!("Popup saved {} prompt(s)", list.len());

        let content_saw = tokio::time::timeout(DELIVERY_WINDOW, content_rx.recv())
            .await
            .ok()
            .flatten();
        let closed_popup_saw = tokio::time::timeout(DELIVERY_WINDOW, closed_rx.recv())
            .await
            .ok()
            .flatten();
        info!(
            "Content saw {:?} prompt(s), closed popup saw {:?}",
            content_saw, closed_popup_saw
        );

        content_watch.unsubscribe();
        closed_watch.unsubscribe();
        Ok(PromptsReport {
            prompts_stored: list.len(),
            content_saw,
            closed_popup_saw,
        })
    }

    /// Closes every context.
    pub async fn shutdown(self) {
        self.popup.close().await;
        self.content.close().await;
        self.background.close().await;
        info!("All contexts closed");
    }
}
