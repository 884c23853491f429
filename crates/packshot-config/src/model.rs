// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Packshot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use packshot_core::types::{GenerationSettings, LogoEffectConfig};
use serde::{Deserialize, Serialize};

/// Top-level Packshot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackshotConfig {
    /// Studio-wide behavior.
    #[serde(default)]
    pub studio: StudioConfig,

    /// Generation settings applied to every dispatch.
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Image provider connection and retry settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Active logo and overlay effects.
    #[serde(default)]
    pub logo: LogoConfig,
}

/// Studio-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StudioConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed the default catalog when the store holds no work items.
    #[serde(default = "default_seed_catalog")]
    pub seed_catalog: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            seed_catalog: default_seed_catalog(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_seed_catalog() -> bool {
    true
}

/// Image provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Environment variable holding the fallback API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the models endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout for a single request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Automatic retries after a rate-limited response.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay of the exponential backoff.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Cap on the backoff exponent.
    #[serde(default = "default_max_backoff_exponent")]
    pub max_backoff_exponent: u32,

    /// Upper bound of the random jitter added to each backoff.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_exponent: default_max_backoff_exponent(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    2000
}

fn default_max_backoff_exponent() -> u32 {
    3
}

fn default_jitter_ms() -> u64 {
    1000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("packshot").join("packshot.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "packshot.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Logo overlay configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogoConfig {
    /// Image file added to the logo library and made active at startup.
    #[serde(default)]
    pub path: Option<String>,

    /// Overlay transform and effects.
    #[serde(default)]
    pub effects: LogoEffectConfig,
}
