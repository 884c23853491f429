// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Packshot.

use thiserror::Error;

/// The primary error type used across all Packshot adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PackshotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An input could not be decoded as a raster image.
    #[error("image decode error: {message}")]
    Decode { message: String },

    /// The provider rejected the API key or the project it references.
    #[error("invalid API key: {message}")]
    InvalidKey { message: String },

    /// A single provider call was rate limited. Retried inside the adapter.
    #[error("quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Rate limiting persisted through every retry.
    #[error("quota exhausted after {attempts} attempts: {message}")]
    QuotaExhausted { attempts: u32, message: String },

    /// Any other provider or transport failure.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Automation was asked to start with nothing to dispatch.
    #[error("no pending, failed, or selected items to generate")]
    NoEligibleItems,

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Bulk import payload could not be interpreted.
    #[error("import error: {0}")]
    Import(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Closed classification of generation failures that callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Key or project rejected. Requires user action.
    InvalidKey,
    /// Rate limiting outlasted the retry cap.
    QuotaExhausted,
    /// The generated or logo image could not be decoded.
    Decode,
    /// Everything else.
    Unknown,
}

impl GenerationErrorKind {
    /// Returns true when automation must stop regardless of `pause_on_error`.
    pub fn halts_automation(self) -> bool {
        matches!(self, Self::InvalidKey | Self::QuotaExhausted)
    }
}

impl PackshotError {
    /// Classifies this error for the automation controller.
    ///
    /// A bare `QuotaExceeded` only escapes an adapter that does not retry,
    /// so it is treated the same as exhausted retries.
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::InvalidKey { .. } => GenerationErrorKind::InvalidKey,
            Self::QuotaExceeded { .. } | Self::QuotaExhausted { .. } => {
                GenerationErrorKind::QuotaExhausted
            }
            Self::Decode { .. } => GenerationErrorKind::Decode,
            _ => GenerationErrorKind::Unknown,
        }
    }

    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
