// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared command context: configuration, storage, and the loaded studio.

use std::path::Path;
use std::sync::Arc;

use packshot_config::ConfigSource;
use packshot_config::model::PackshotConfig;
use packshot_core::PackshotError;
use packshot_core::traits::{BlobStore, PluginAdapter};
use packshot_storage::SqliteStore;
use packshot_studio::{Studio, StudioOptions, load_logo_file, load_preferences};
use tracing::debug;

pub struct App {
    pub config: PackshotConfig,
    store: Arc<SqliteStore>,
    pub studio: Arc<Studio>,
}

impl App {
    /// Opens the database and loads the studio, activating the configured
    /// logo if one is set.
    ///
    /// `config` locates the database. The final configuration is re-read
    /// from `source` with the preferences saved in that database as its
    /// persisted layer.
    pub async fn open(config: PackshotConfig, source: &ConfigSource) -> Result<Self, PackshotError> {
        let store = Arc::new(SqliteStore::new(config.storage.clone()));
        store.initialize().await?;

        let persisted = load_preferences(store.as_ref()).await?;
        let config = source.load(&persisted).map_err(|errors| {
            packshot_config::render_errors(&errors);
            PackshotError::Config(format!(
                "{} configuration error(s) over saved preferences",
                errors.len()
            ))
        })?;

        let logo = match &config.logo.path {
            Some(path) => Some(load_logo_file(Path::new(path)).await?),
            None => None,
        };

        let studio = Studio::load(store.clone(), StudioOptions::from_config(&config, logo)).await?;
        debug!(database = %config.storage.database_path, "app opened");
        Ok(Self {
            config,
            store,
            studio: Arc::new(studio),
        })
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub async fn close(&self) -> Result<(), PackshotError> {
        self.store.shutdown().await
    }
}
