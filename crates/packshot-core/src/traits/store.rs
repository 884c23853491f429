// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store trait for image blobs and JSON documents.

use async_trait::async_trait;

use crate::error::PackshotError;
use crate::traits::adapter::PluginAdapter;

/// Durable key-value storage.
///
/// Blobs hold generated images keyed by work item id. Documents hold JSON
/// state under the well-known keys in [`crate::types::keys`]. There are no
/// transactions; a single in-process caller is assumed.
#[async_trait]
pub trait BlobStore: PluginAdapter {
    /// Prepares the backend (schema, connections).
    async fn initialize(&self) -> Result<(), PackshotError>;

    async fn get_blob(&self, id: &str) -> Result<Option<Vec<u8>>, PackshotError>;

    async fn put_blob(&self, id: &str, bytes: &[u8]) -> Result<(), PackshotError>;

    /// Removes one blob. Deleting a missing blob is not an error.
    async fn delete_blob(&self, id: &str) -> Result<(), PackshotError>;

    async fn get_document(&self, key: &str) -> Result<Option<serde_json::Value>, PackshotError>;

    async fn put_document(&self, key: &str, value: &serde_json::Value) -> Result<(), PackshotError>;

    /// Removes every blob and document.
    async fn clear_all(&self) -> Result<(), PackshotError>;
}
