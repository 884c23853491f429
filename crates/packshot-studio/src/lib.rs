// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Studio state and automation for Packshot.
//!
//! This crate owns the work item catalog and its persistence
//! ([`Studio`]), the catalog operations on [`StudioState`], and the
//! [`AutomationController`] that paces generation over eligible items.
//! State changes are broadcast as [`StudioEvent`]s.

pub mod catalog;
pub mod controller;
pub mod events;
pub mod seed;
pub mod shutdown;
pub mod state;
pub mod studio;

pub use catalog::{CatalogStats, ImportMode, ItemEdit, NewItem, ResetFilter};
pub use controller::{AutomationController, CycleOutcome, DispatchOutcome};
pub use events::{StopReason, StudioEvent};
pub use state::StudioState;
pub use studio::{Studio, StudioOptions, load_logo_file, load_preferences, logo_from_bytes};
