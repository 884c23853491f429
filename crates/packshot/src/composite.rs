// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `packshot composite` command implementation.

use std::path::Path;

use colored::Colorize;
use packshot_core::PackshotError;
use packshot_core::types::LogoEffectConfig;
use tracing::info;

/// Overlays `logo` on `base` with `effects` and writes a PNG to `out`.
pub async fn run_composite(
    effects: &LogoEffectConfig,
    base: &Path,
    logo: &Path,
    out: &Path,
) -> Result<(), PackshotError> {
    let base_bytes = read(base).await?;
    let logo_bytes = read(logo).await?;
    let effects = effects.clone();

    let png = tokio::task::spawn_blocking(move || {
        packshot_compositor::apply_logo(&base_bytes, &logo_bytes, &effects)
    })
    .await
    .map_err(|e| PackshotError::Internal(format!("compositor task failed: {e}")))??;

    tokio::fs::write(out, &png)
        .await
        .map_err(|e| PackshotError::Storage { source: e.into() })?;
    info!(out = %out.display(), bytes = png.len(), "composite written");
    println!("{} {}", "wrote".green(), out.display());
    Ok(())
}

async fn read(path: &Path) -> Result<Vec<u8>, PackshotError> {
    tokio::fs::read(path).await.map_err(|e| PackshotError::NotFound {
        kind: "image file",
        id: format!("{} ({e})", path.display()),
    })
}
