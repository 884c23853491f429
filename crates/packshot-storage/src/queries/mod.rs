// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the two storage tables.

pub mod blobs;
pub mod documents;
