// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as effect ranges, parseable colors, and non-empty paths.

use packshot_core::color::parse_color;
use packshot_core::types::LogoEffectConfig;

use crate::diagnostic::ConfigError;
use crate::model::PackshotConfig;

/// Upper bound on automatic quota retries.
const MAX_PROVIDER_RETRIES: u32 = 10;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &PackshotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let base_url = config.provider.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "provider.base_url `{base_url}` must be an http(s) URL"
        )));
    }

    if config.provider.max_retries > MAX_PROVIDER_RETRIES {
        errors.push(ConfigError::validation(format!(
            "provider.max_retries must be at most {MAX_PROVIDER_RETRIES}, got {}",
            config.provider.max_retries
        )));
    }

    if config.generation.max_attempts_per_run < 1 {
        errors.push(ConfigError::validation(
            "generation.max_attempts_per_run must be at least 1",
        ));
    }

    validate_effects(&config.logo.effects, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_effects(effects: &LogoEffectConfig, errors: &mut Vec<ConfigError>) {
    let size_range = LogoEffectConfig::MIN_SIZE..=LogoEffectConfig::MAX_SIZE;
    if !size_range.contains(&effects.size) {
        errors.push(ConfigError::validation(format!(
            "logo.effects.size must be within {}..={}, got {}",
            LogoEffectConfig::MIN_SIZE,
            LogoEffectConfig::MAX_SIZE,
            effects.size
        )));
    }

    if !(0.0..=100.0).contains(&effects.opacity) {
        errors.push(ConfigError::validation(format!(
            "logo.effects.opacity must be within 0..=100, got {}",
            effects.opacity
        )));
    }

    if !effects.rotation.is_finite() {
        errors.push(ConfigError::validation(
            "logo.effects.rotation must be a finite number of degrees",
        ));
    }

    let colors = [
        ("shadow", &effects.shadow.color),
        ("border", &effects.border.color),
        ("glow", &effects.glow.color),
    ];
    for (effect, color) in colors {
        if parse_color(color).is_none() {
            errors.push(ConfigError::validation(format!(
                "logo.effects.{effect}.color `{color}` is not a valid color"
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&PackshotConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = PackshotConfig::default();
        config.storage.database_path = "  ".into();
        config.logo.effects.size = 80.0;
        config.logo.effects.opacity = -5.0;
        config.logo.effects.glow.color = "glowy".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {errors:?}");
    }

    #[test]
    fn rejects_zero_attempts_per_run() {
        let mut config = PackshotConfig::default();
        config.generation.max_attempts_per_run = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("max_attempts_per_run"));
    }
}
