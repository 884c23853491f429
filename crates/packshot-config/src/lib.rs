// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Packshot.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use packshot_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("delay: {} ms", config.generation.delay_ms);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{
    PersistedLayer, load_config, load_config_from_path, load_config_from_str,
    load_layered_config_from_str,
};
pub use model::PackshotConfig;

/// Load configuration from the XDG hierarchy (plus an optional explicit file) and validate it.
///
/// On Figment errors the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate(path: Option<&Path>) -> Result<PackshotConfig, Vec<ConfigError>> {
    let loaded = match path {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(path),
        )),
    }
}

/// [`load_and_validate`] with persisted studio preferences layered under
/// the config files.
pub fn load_and_validate_layered(
    path: Option<&Path>,
    persisted: &PersistedLayer,
) -> Result<PackshotConfig, Vec<ConfigError>> {
    match loader::build_layered_figment(path, persisted).extract::<PackshotConfig>() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(path),
        )),
    }
}

/// Where configuration is read from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// The XDG hierarchy plus an optional explicit file, with env overrides.
    Files(Option<PathBuf>),
    /// A TOML string only.
    Inline(String),
}

impl ConfigSource {
    /// Loads and validates with `persisted` under the configured values.
    pub fn load(&self, persisted: &PersistedLayer) -> Result<PackshotConfig, Vec<ConfigError>> {
        match self {
            Self::Files(path) => load_and_validate_layered(path.as_deref(), persisted),
            Self::Inline(toml) => match loader::load_layered_config_from_str(toml, persisted) {
                Ok(config) => {
                    validation::validate_config(&config)?;
                    Ok(config)
                }
                Err(err) => {
                    let sources = vec![("<inline>".to_string(), toml.clone())];
                    Err(diagnostic::figment_to_config_errors(err, &sources))
                }
            },
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PackshotConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    let candidates = [
        Some(Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf()),
        loader::user_config_path(),
        Some(local),
        explicit.map(Path::to_path_buf),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
