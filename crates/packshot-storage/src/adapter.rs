// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the BlobStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use packshot_config::model::StorageConfig;
use packshot_core::{AdapterType, BlobStore, HealthStatus, PackshotError, PluginAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed key-value store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is lazily opened on the first call to
/// [`BlobStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`BlobStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PackshotError> {
        self.db.get().ok_or_else(|| PackshotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PackshotError> {
        let blobs = queries::blobs::count_blobs(self.db()?).await?;
        debug!(blobs, "storage health check");
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PackshotError> {
        if let Some(db) = self.db.get() {
            if self.config.wal_mode {
                db.checkpoint().await?;
                debug!("shutdown: WAL checkpoint complete");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn initialize(&self) -> Result<(), PackshotError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PackshotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn get_blob(&self, id: &str) -> Result<Option<Vec<u8>>, PackshotError> {
        queries::blobs::get_blob(self.db()?, id).await
    }

    async fn put_blob(&self, id: &str, bytes: &[u8]) -> Result<(), PackshotError> {
        queries::blobs::put_blob(self.db()?, id, bytes).await
    }

    async fn delete_blob(&self, id: &str) -> Result<(), PackshotError> {
        if queries::blobs::delete_blob(self.db()?, id).await? {
            debug!(id, "blob deleted");
        }
        Ok(())
    }

    async fn get_document(&self, key: &str) -> Result<Option<serde_json::Value>, PackshotError> {
        queries::documents::get_document(self.db()?, key).await
    }

    async fn put_document(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), PackshotError> {
        queries::documents::put_document(self.db()?, key, value).await
    }

    async fn clear_all(&self) -> Result<(), PackshotError> {
        queries::documents::clear_all(self.db()?).await?;
        debug!("storage cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packshot_core::types::keys;
    use serde_json::json;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_creates_database_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/packshot.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let store = SqliteStore::new(make_config("unused.db"));
        let err = store.get_blob("x").await.unwrap_err();
        assert!(err.to_string().contains("not initialized"), "got: {err}");
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("twice.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();

        {
            let store = SqliteStore::new(make_config(path));
            store.initialize().await.unwrap();
            store.put_blob("pizza-001", b"\x89PNG").await.unwrap();
            store
                .put_document(keys::SETTINGS, &json!({"delayMs": 500}))
                .await
                .unwrap();
            store.shutdown().await.unwrap();
        }

        let store = SqliteStore::new(make_config(path));
        store.initialize().await.unwrap();
        assert_eq!(store.get_blob("pizza-001").await.unwrap().unwrap(), b"\x89PNG");
        assert_eq!(
            store.get_document(keys::SETTINGS).await.unwrap(),
            Some(json!({"delayMs": 500}))
        );

        store.clear_all().await.unwrap();
        assert!(store.get_blob("pizza-001").await.unwrap().is_none());
    }
}
