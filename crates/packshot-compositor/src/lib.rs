// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logo compositing engine for Packshot.
//!
//! Overlays a logo onto a generated image according to a
//! [`LogoEffectConfig`]: size relative to the shorter base edge, one of nine
//! padded anchors, rotation about the logo center, a drop shadow (or glow),
//! an optional border stroke, and global opacity. Compositing is pure: the
//! same inputs always produce the same pixels, and the output keeps the
//! base image's dimensions.

mod effects;
pub mod placement;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops, imageops::FilterType};
use packshot_core::PackshotError;
use packshot_core::types::{DataUri, LogoEffectConfig};
use tracing::debug;

pub use placement::{Placement, logo_placement};

/// Decodes both inputs, composites, and re-encodes as PNG.
///
/// Fails with [`PackshotError::Decode`] when either input is not an image.
/// Out-of-range effect values are clamped, never rejected.
pub fn apply_logo(
    base: &[u8],
    logo: &[u8],
    effects: &LogoEffectConfig,
) -> Result<Vec<u8>, PackshotError> {
    let base = decode(base, "base image")?;
    let logo = decode(logo, "logo")?;
    encode_png(&composite(&base, &logo, effects))
}

/// [`apply_logo`] over data URIs. The result is always `image/png`.
pub fn apply_logo_to_uri(
    base: &DataUri,
    logo: &DataUri,
    effects: &LogoEffectConfig,
) -> Result<DataUri, PackshotError> {
    let bytes = apply_logo(&base.to_bytes()?, &logo.to_bytes()?, effects)?;
    Ok(DataUri::from_bytes("image/png", &bytes))
}

/// Composites already-decoded rasters.
pub fn composite(base: &RgbaImage, logo: &RgbaImage, effects: &LogoEffectConfig) -> RgbaImage {
    let mut out = base.clone();
    if logo.width() == 0 || logo.height() == 0 || base.width() == 0 || base.height() == 0 {
        return out;
    }

    let placement = logo_placement(
        base.width(),
        base.height(),
        logo.width(),
        logo.height(),
        effects,
    );
    let resized = imageops::resize(logo, placement.width, placement.height, FilterType::Lanczos3);

    let border_width = if effects.border.enabled {
        effects::radius(effects.border.width)
    } else {
        0.0
    };
    let margin = (border_width / 2.0).ceil() as u32;
    let mut sprite = effects::with_margin(&resized, margin);
    if border_width > 0.0 {
        let color = effects::color_or_black(&effects.border.color);
        effects::stroke_border(&mut sprite, margin, border_width, color);
    }
    effects::apply_opacity(&mut sprite, effects::opacity_factor(effects.opacity));
    let sprite = effects::rotate(&sprite, effects.rotation);

    let center_x = placement.x as f64 + f64::from(placement.width) / 2.0;
    let center_y = placement.y as f64 + f64::from(placement.height) / 2.0;
    let sprite_x = (center_x - f64::from(sprite.width()) / 2.0).round() as i64;
    let sprite_y = (center_y - f64::from(sprite.height()) / 2.0).round() as i64;

    let shadow = effects::shadow_params(effects);
    if let Some((layer, extra)) = effects::shadow_layer(&sprite, &shadow) {
        let x = sprite_x - i64::from(extra) + shadow.offset.x.round() as i64;
        let y = sprite_y - i64::from(extra) + shadow.offset.y.round() as i64;
        imageops::overlay(&mut out, &layer, x, y);
    }
    imageops::overlay(&mut out, &sprite, sprite_x, sprite_y);

    debug!(
        x = placement.x,
        y = placement.y,
        width = placement.width,
        height = placement.height,
        rotation = effects.rotation,
        "logo composited"
    );
    out
}

fn decode(bytes: &[u8], what: &str) -> Result<RgbaImage, PackshotError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| PackshotError::decode(format!("{what}: {e}")))
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PackshotError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| PackshotError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
