// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `BlobStore` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use packshot_core::PackshotError;
use packshot_core::traits::{BlobStore, PluginAdapter};
use packshot_core::types::{AdapterType, HealthStatus};

#[derive(Default)]
struct Contents {
    blobs: HashMap<String, Vec<u8>>,
    documents: HashMap<String, Value>,
}

/// A `BlobStore` backed by hash maps, with optional write failures.
#[derive(Default)]
pub struct MemoryStore {
    contents: Mutex<Contents>,
    fail_blob_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> MutexGuard<'_, Contents> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every subsequent `put_blob` fail with a storage error.
    pub fn fail_blob_writes(&self, fail: bool) {
        self.fail_blob_writes.store(fail, Ordering::SeqCst);
    }

    pub fn blob(&self, id: &str) -> Option<Vec<u8>> {
        self.contents().blobs.get(id).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.contents().blobs.len()
    }

    pub fn document(&self, key: &str) -> Option<Value> {
        self.contents().documents.get(key).cloned()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PackshotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PackshotError> {
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn initialize(&self) -> Result<(), PackshotError> {
        Ok(())
    }

    async fn get_blob(&self, id: &str) -> Result<Option<Vec<u8>>, PackshotError> {
        Ok(self.blob(id))
    }

    async fn put_blob(&self, id: &str, bytes: &[u8]) -> Result<(), PackshotError> {
        if self.fail_blob_writes.load(Ordering::SeqCst) {
            return Err(PackshotError::Storage {
                source: "blob writes disabled".into(),
            });
        }
        self.contents().blobs.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn delete_blob(&self, id: &str) -> Result<(), PackshotError> {
        self.contents().blobs.remove(id);
        Ok(())
    }

    async fn get_document(&self, key: &str) -> Result<Option<Value>, PackshotError> {
        Ok(self.document(key))
    }

    async fn put_document(&self, key: &str, value: &Value) -> Result<(), PackshotError> {
        self.contents()
            .documents
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), PackshotError> {
        let mut contents = self.contents();
        contents.blobs.clear();
        contents.documents.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blobs_and_documents_round_trip_and_clear() {
        let store = MemoryStore::new();
        store.put_blob("a", b"123").await.unwrap();
        store
            .put_document("k", &serde_json::json!({"x": 1}))
            .await
            .unwrap();
        assert_eq!(store.get_blob("a").await.unwrap(), Some(b"123".to_vec()));
        assert_eq!(store.get_document("k").await.unwrap().unwrap()["x"], 1);

        store.clear_all().await.unwrap();
        assert_eq!(store.blob_count(), 0);
        assert!(store.document("k").is_none());
    }

    #[tokio::test]
    async fn injected_write_failure_surfaces_as_storage_error() {
        let store = MemoryStore::new();
        store.fail_blob_writes(true);
        assert!(matches!(
            store.put_blob("a", b"1").await,
            Err(PackshotError::Storage { .. })
        ));
    }
}
