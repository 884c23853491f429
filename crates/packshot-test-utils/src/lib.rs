// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Packshot integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without the network.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted image provider that records requests
//! - [`MemoryStore`] - In-memory blob and document store
//! - [`TestHarness`] - Studio plus controller wired to the mocks

pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_provider;

pub use fixtures::{png_data_uri, solid_png};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_provider::MockProvider;
