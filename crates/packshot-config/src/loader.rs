// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./packshot.toml` > `~/.config/packshot/packshot.toml`
//! > `/etc/packshot/packshot.toml` with environment variable overrides via
//! `PACKSHOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use packshot_core::types::{GenerationSettings, LogoEffectConfig};

use crate::model::PackshotConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/packshot/packshot.toml";

/// Local config file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "packshot.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/packshot/packshot.toml` (system-wide)
/// 3. `~/.config/packshot/packshot.toml` (user XDG config)
/// 4. `./packshot.toml` (local directory)
/// 5. `PACKSHOT_*` environment variables
pub fn load_config() -> Result<PackshotConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PackshotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PackshotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a TOML string over persisted preferences (no XDG
/// lookup, no env).
pub fn load_layered_config_from_str(
    toml_content: &str,
    persisted: &PersistedLayer,
) -> Result<PackshotConfig, figment::Error> {
    defaults_with(persisted)
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from the XDG hierarchy plus an explicit file, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<PackshotConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Studio preferences saved by a previous session.
///
/// Merged over the compiled defaults and under every config file and the
/// environment, so configured keys still win field by field.
#[derive(Debug, Clone, Default)]
pub struct PersistedLayer {
    pub generation: Option<GenerationSettings>,
    pub effects: Option<LogoEffectConfig>,
}

/// Build the Figment used for config loading (exposed for diagnostic use).
///
/// An explicit `path` is merged after the local file and before the environment.
pub fn build_figment(path: Option<&Path>) -> Figment {
    build_layered_figment(path, &PersistedLayer::default())
}

/// [`build_figment`] with persisted preferences between the defaults and
/// the config files.
pub fn build_layered_figment(path: Option<&Path>, persisted: &PersistedLayer) -> Figment {
    let mut figment = defaults_with(persisted)
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Compiled defaults with persisted preferences merged over them.
fn defaults_with(persisted: &PersistedLayer) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(PackshotConfig::default()));
    if let Some(generation) = &persisted.generation {
        figment = figment.merge(Serialized::default("generation", generation));
    }
    if let Some(effects) = &persisted.effects {
        figment = figment.merge(Serialized::default("logo.effects", effects));
    }
    figment
}

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("packshot/packshot.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `PACKSHOT_GENERATION_DELAY_MS` must
/// map to `generation.delay_ms`, not `generation.delay.ms`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("PACKSHOT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["studio", "generation", "provider", "storage", "logo"];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
