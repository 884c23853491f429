// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared studio handle: owned state, persistence, and event fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use packshot_config::PersistedLayer;
use packshot_config::model::PackshotConfig;
use packshot_core::PackshotError;
use packshot_core::traits::BlobStore;
use packshot_core::types::{
    Category, DataUri, GenerationSettings, ItemStatus, LogoEffectConfig, WorkItem, keys,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::catalog::download_file_name;
use crate::events::{EVENT_CHANNEL_CAPACITY, StudioEvent};
use crate::seed;
use crate::state::StudioState;

/// Startup inputs for [`Studio::load`].
#[derive(Debug, Clone, Default)]
pub struct StudioOptions {
    /// Seed the default catalog when nothing is persisted.
    pub seed_catalog: bool,
    /// Replaces the persisted settings. `None` restores them.
    pub settings: Option<GenerationSettings>,
    /// Replaces the persisted logo effects. `None` restores them.
    pub effects: Option<LogoEffectConfig>,
    /// Logo to activate on top of the persisted library.
    pub logo: Option<DataUri>,
}

impl StudioOptions {
    /// Builds options from loaded configuration. The logo file is read by
    /// the caller with [`load_logo_file`].
    ///
    /// Load the configuration with [`load_preferences`] as its persisted
    /// layer so saved preferences survive under the configured keys.
    pub fn from_config(config: &PackshotConfig, logo: Option<DataUri>) -> Self {
        Self {
            seed_catalog: config.studio.seed_catalog,
            settings: Some(config.generation.clone()),
            effects: Some(config.logo.effects.clone()),
            logo,
        }
    }
}

/// Owns the [`StudioState`] behind an async lock, mirrors it to a
/// [`BlobStore`], and broadcasts [`StudioEvent`]s.
pub struct Studio {
    state: RwLock<StudioState>,
    store: Arc<dyn BlobStore>,
    events: broadcast::Sender<StudioEvent>,
}

impl Studio {
    /// Restores persisted documents and blobs, then applies `options`.
    ///
    /// Settings and effects given in `options` replace the persisted ones;
    /// otherwise the persisted documents are used, then the defaults.
    /// Items left `Generating` by an interrupted run, and `Completed` items
    /// whose image blob is gone, come back as `Pending`.
    pub async fn load(
        store: Arc<dyn BlobStore>,
        options: StudioOptions,
    ) -> Result<Self, PackshotError> {
        let categories: Option<Vec<Category>> = get_json(&*store, keys::CATEGORIES).await?;
        let items: Option<Vec<WorkItem>> = get_json(&*store, keys::WORK_ITEMS).await?;
        let logo_library: Vec<DataUri> = get_json(&*store, keys::LOGO_LIBRARY)
            .await?
            .unwrap_or_default();
        let settings = match options.settings {
            Some(settings) => settings,
            None => get_json(&*store, keys::SETTINGS).await?.unwrap_or_default(),
        };
        let effects = match options.effects {
            Some(effects) => effects,
            None => get_json(&*store, keys::LOGO_EFFECTS)
                .await?
                .unwrap_or_default(),
        };

        let seeded = items.is_none() && options.seed_catalog;
        let mut items = match items {
            Some(items) => items,
            None if options.seed_catalog => seed::seed_items(),
            None => Vec::new(),
        };
        let categories = categories.unwrap_or_else(seed::default_categories);

        let mut restored = 0usize;
        for item in &mut items {
            match item.status {
                ItemStatus::Generating => item.reset(),
                ItemStatus::Completed => match store.get_blob(&item.id).await? {
                    Some(bytes) => {
                        item.result_image = Some(DataUri::from_bytes(sniff_mime(&bytes), &bytes));
                        restored += 1;
                    }
                    None => {
                        warn!(item_id = %item.id, "completed item has no stored image, resetting");
                        item.reset();
                    }
                },
                _ => item.result_image = None,
            }
        }

        let mut state = StudioState {
            items,
            categories,
            settings,
            effects,
            active_logo: logo_library.first().cloned(),
            logo_library,
        };
        if let Some(logo) = options.logo {
            state.add_logo(logo);
        }

        info!(
            items = state.items.len(),
            categories = state.categories.len(),
            images = restored,
            seeded,
            "studio loaded"
        );

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let studio = Self {
            state: RwLock::new(state),
            store,
            events,
        };
        studio.persist_all().await?;
        Ok(studio)
    }

    /// Runs `f` against a shared view of the state.
    pub async fn read<R>(&self, f: impl FnOnce(&StudioState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` against the state without persisting.
    pub async fn write<R>(&self, f: impl FnOnce(&mut StudioState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    /// Runs a fallible mutation and persists every document when it succeeds.
    ///
    /// Items that lose their result image in the mutation, by removal,
    /// reset, or overwrite, also lose their stored blob.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut StudioState) -> Result<R, PackshotError>,
    ) -> Result<R, PackshotError> {
        let (result, dropped) = self
            .write(|s| {
                let before: Vec<String> = s
                    .items
                    .iter()
                    .filter(|i| i.result_image.is_some())
                    .map(|i| i.id.clone())
                    .collect();
                let result = f(s)?;
                let dropped: Vec<String> = before
                    .into_iter()
                    .filter(|id| s.item(id).is_none_or(|i| i.result_image.is_none()))
                    .collect();
                Ok::<_, PackshotError>((result, dropped))
            })
            .await?;
        self.persist_all().await?;
        for id in &dropped {
            self.store.delete_blob(id).await?;
        }
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "stale images deleted");
        }
        Ok(result)
    }

    /// Clones the current state.
    pub async fn snapshot(&self) -> StudioState {
        self.read(|s| s.clone()).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }

    /// Broadcasts an event. Having no subscribers is not an error.
    pub fn emit(&self, event: StudioEvent) {
        let _ = self.events.send(event);
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Writes the work item document. Image bytes live in blobs.
    pub async fn persist_items(&self) -> Result<(), PackshotError> {
        let items = self.read(stripped_items).await;
        put_json(&*self.store, keys::WORK_ITEMS, &items).await
    }

    /// Writes every well-known document.
    pub async fn persist_all(&self) -> Result<(), PackshotError> {
        let (items, categories, settings, effects, library) = self
            .read(|s| {
                let mut settings = s.settings.clone();
                settings.api_key.clear();
                (
                    stripped_items(s),
                    s.categories.clone(),
                    settings,
                    s.effects.clone(),
                    s.logo_library.clone(),
                )
            })
            .await;

        put_json(&*self.store, keys::WORK_ITEMS, &items).await?;
        put_json(&*self.store, keys::CATEGORIES, &categories).await?;
        put_json(&*self.store, keys::SETTINGS, &settings).await?;
        put_json(&*self.store, keys::LOGO_EFFECTS, &effects).await?;
        put_json(&*self.store, keys::LOGO_LIBRARY, &library).await?;
        debug!(items = items.len(), "studio persisted");
        Ok(())
    }

    /// Writes the image of every selected, completed item into `dir`.
    ///
    /// Returns the written paths in list order.
    pub async fn download_selected(&self, dir: &Path) -> Result<Vec<PathBuf>, PackshotError> {
        let targets: Vec<(String, DataUri)> = self
            .read(|s| {
                s.items
                    .iter()
                    .filter(|i| i.selected && i.status == ItemStatus::Completed)
                    .filter_map(|i| Some((download_file_name(i), i.result_image.clone()?)))
                    .collect()
            })
            .await;

        tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        let mut written = Vec::with_capacity(targets.len());
        for (name, image) in targets {
            let path = dir.join(name);
            tokio::fs::write(&path, image.to_bytes()?)
                .await
                .map_err(io_error)?;
            written.push(path);
        }
        info!(count = written.len(), dir = %dir.display(), "downloaded selected mockups");
        Ok(written)
    }

    /// Wipes the backing store and drops every item and logo.
    ///
    /// Categories, settings, and effects survive and are written back.
    pub async fn clear_all(&self) -> Result<(), PackshotError> {
        self.store.clear_all().await?;
        self.write(|s| {
            s.clear_items();
            s.logo_library.clear();
            s.active_logo = None;
        })
        .await;
        self.persist_all().await?;
        warn!("all studio data cleared");
        Ok(())
    }
}

/// Reads the settings and logo effects a previous session saved, for use as
/// the persisted configuration layer.
pub async fn load_preferences(store: &dyn BlobStore) -> Result<PersistedLayer, PackshotError> {
    Ok(PersistedLayer {
        generation: get_json(store, keys::SETTINGS).await?,
        effects: get_json(store, keys::LOGO_EFFECTS).await?,
    })
}

/// Reads a logo image from disk as a data URI.
pub async fn load_logo_file(path: &Path) -> Result<DataUri, PackshotError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| PackshotError::NotFound {
        kind: "logo file",
        id: format!("{} ({e})", path.display()),
    })?;
    logo_from_bytes(&bytes)
}

/// Wraps raw logo bytes after checking for a supported image signature.
pub fn logo_from_bytes(bytes: &[u8]) -> Result<DataUri, PackshotError> {
    let mime = detect_mime(bytes)
        .ok_or_else(|| PackshotError::decode("logo is not a PNG, JPEG, or WebP image"))?;
    Ok(DataUri::from_bytes(mime, bytes))
}

/// MIME type from a file signature, if recognized.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Like [`detect_mime`], defaulting to PNG.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    detect_mime(bytes).unwrap_or("image/png")
}

fn stripped_items(state: &StudioState) -> Vec<WorkItem> {
    state
        .items
        .iter()
        .map(|item| WorkItem {
            result_image: None,
            ..item.clone()
        })
        .collect()
}

fn io_error(e: std::io::Error) -> PackshotError {
    PackshotError::Storage {
        source: Box::new(e),
    }
}

async fn get_json<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>, PackshotError> {
    match store.get_document(key).await? {
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable document");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

async fn put_json<T: Serialize + ?Sized>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), PackshotError> {
    let value = serde_json::to_value(value)
        .map_err(|e| PackshotError::Internal(format!("failed to serialize {key}: {e}")))?;
    store.put_document(key, &value).await
}
