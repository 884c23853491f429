// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for controller and studio integration tests.
//!
//! `TestHarness` assembles a studio over a mock provider and an in-memory
//! (or temp SQLite) store, with a zero pacing delay by default.

use std::sync::Arc;
use std::time::Duration;

use packshot_config::model::StorageConfig;
use packshot_core::PackshotError;
use packshot_core::traits::BlobStore;
use packshot_core::types::{
    DataUri, GeneratedImage, GenerationSettings, ItemStatus, LogoEffectConfig, WorkItem, keys,
};
use packshot_storage::SqliteStore;
use packshot_studio::{AutomationController, Studio, StudioEvent, StudioOptions};
use tokio::sync::broadcast;

use crate::memory_store::MemoryStore;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    items: Option<Vec<WorkItem>>,
    seed_catalog: bool,
    settings: GenerationSettings,
    effects: LogoEffectConfig,
    logo: Option<DataUri>,
    outcomes: Vec<Result<GeneratedImage, PackshotError>>,
    provider_delay: Duration,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            items: None,
            seed_catalog: false,
            settings: GenerationSettings {
                delay_ms: 0,
                ..GenerationSettings::default()
            },
            effects: LogoEffectConfig::default(),
            logo: None,
            outcomes: Vec::new(),
            provider_delay: Duration::ZERO,
            sqlite: false,
        }
    }

    /// Start from exactly these items.
    pub fn with_items(mut self, items: Vec<WorkItem>) -> Self {
        self.items = Some(items);
        self
    }

    /// Start from the seeded 128-item catalog.
    pub fn with_seed_catalog(mut self) -> Self {
        self.seed_catalog = true;
        self
    }

    /// Adjust generation settings. The delay starts at zero.
    pub fn with_settings(mut self, f: impl FnOnce(&mut GenerationSettings)) -> Self {
        f(&mut self.settings);
        self
    }

    pub fn with_effects(mut self, effects: LogoEffectConfig) -> Self {
        self.effects = effects;
        self
    }

    /// Activate a logo.
    pub fn with_logo(mut self, logo: DataUri) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Set scripted provider outcomes.
    pub fn with_outcomes(mut self, outcomes: Vec<Result<GeneratedImage, PackshotError>>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Hold every provider call for `delay`.
    pub fn with_provider_delay(mut self, delay: Duration) -> Self {
        self.provider_delay = delay;
        self
    }

    /// Back the studio with SQLite in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Build the test harness.
    pub async fn build(self) -> Result<TestHarness, PackshotError> {
        let memory = Arc::new(MemoryStore::new());
        let mut temp_dir = None;
        let store: Arc<dyn BlobStore> = if self.sqlite {
            let dir =
                tempfile::TempDir::new().map_err(|e| PackshotError::Storage { source: e.into() })?;
            let sqlite = SqliteStore::new(StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            });
            sqlite.initialize().await?;
            temp_dir = Some(dir);
            Arc::new(sqlite)
        } else {
            memory.clone()
        };

        if let Some(items) = &self.items {
            let value = serde_json::to_value(items)
                .map_err(|e| PackshotError::Internal(e.to_string()))?;
            store.put_document(keys::WORK_ITEMS, &value).await?;
        }

        let studio = Arc::new(
            Studio::load(
                store.clone(),
                StudioOptions {
                    seed_catalog: self.seed_catalog,
                    settings: Some(self.settings),
                    effects: Some(self.effects),
                    logo: self.logo,
                },
            )
            .await?,
        );

        let provider =
            Arc::new(MockProvider::with_outcomes(self.outcomes).with_delay(self.provider_delay));
        let controller = Arc::new(AutomationController::new(studio.clone(), provider.clone()));

        Ok(TestHarness {
            studio,
            controller,
            provider,
            store,
            memory,
            _temp_dir: temp_dir,
        })
    }
}

/// A studio and controller wired to mock adapters.
pub struct TestHarness {
    pub studio: Arc<Studio>,
    pub controller: Arc<AutomationController>,
    pub provider: Arc<MockProvider>,
    /// The store the studio writes to.
    pub store: Arc<dyn BlobStore>,
    /// The in-memory store. Unused when built `with_sqlite`.
    pub memory: Arc<MemoryStore>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A pending item with a short prompt in the `pizza` category.
    pub fn item(id: &str) -> WorkItem {
        WorkItem::new(id, "pizza", id, format!("Mockup {id}"))
    }

    pub async fn get(&self, id: &str) -> Option<WorkItem> {
        self.studio.read(|s| s.item(id).cloned()).await
    }

    pub async fn status(&self, id: &str) -> Option<ItemStatus> {
        self.studio.read(|s| s.item(id).map(|i| i.status)).await
    }

    pub fn events(&self) -> broadcast::Receiver<StudioEvent> {
        self.studio.subscribe()
    }
}
