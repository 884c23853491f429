// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Packshot.
//!
//! This crate provides the error taxonomy, the domain types (work items,
//! categories, logo effects, generation settings), and the adapter traits
//! implemented by the provider and storage crates.

pub mod color;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{GenerationErrorKind, PackshotError};
pub use types::{
    AdapterType, Category, DataUri, GeneratedImage, GenerationRequest, GenerationSettings,
    HealthStatus, ItemStatus, LogoEffectConfig, WorkItem,
};

pub use traits::{BlobStore, ImageProvider, PluginAdapter};
