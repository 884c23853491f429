// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image provider adapter trait for generative-image services.

use async_trait::async_trait;

use crate::error::PackshotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GeneratedImage, GenerationRequest};

/// Adapter for an external generative-image provider.
///
/// One call issues one logical request and yields exactly one image or an
/// error. Failures must be classified into [`PackshotError::InvalidKey`],
/// [`PackshotError::QuotaExhausted`], or [`PackshotError::Provider`];
/// rate-limit retries happen inside the adapter.
#[async_trait]
pub trait ImageProvider: PluginAdapter {
    /// Generates a single image for the fully resolved request.
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage, PackshotError>;
}
