// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-logo raster effects: border, opacity, rotation, shadow.

use image::{Rgba, RgbaImage, imageops};
use packshot_core::color::parse_color;
use packshot_core::types::{LogoEffectConfig, Offset};
use tracing::warn;

/// Upper bound for blur radii and border widths, in pixels.
pub(crate) const MAX_EFFECT_RADIUS: f32 = 100.0;

/// Shadow drawn when the user has not enabled one.
const DEFAULT_SHADOW_BLUR: f32 = 15.0;
const DEFAULT_SHADOW_COLOR: [u8; 4] = [0, 0, 0, 102];
const DEFAULT_SHADOW_OFFSET: Offset = Offset { x: 5.0, y: 5.0 };

/// Resolved drop-shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShadowParams {
    pub blur: f32,
    pub color: [u8; 4],
    pub offset: Offset,
}

/// Resolves the shadow actually drawn.
///
/// A disabled shadow still yields the soft default. An enabled glow replaces
/// blur and color but keeps whichever offset the shadow step chose.
pub(crate) fn shadow_params(effects: &LogoEffectConfig) -> ShadowParams {
    let mut params = if effects.shadow.enabled {
        ShadowParams {
            blur: radius(effects.shadow.blur),
            color: color_or_black(&effects.shadow.color),
            offset: Offset {
                x: finite_or_zero(effects.shadow.offset.x),
                y: finite_or_zero(effects.shadow.offset.y),
            },
        }
    } else {
        ShadowParams {
            blur: DEFAULT_SHADOW_BLUR,
            color: DEFAULT_SHADOW_COLOR,
            offset: DEFAULT_SHADOW_OFFSET,
        }
    };
    if effects.glow.enabled {
        params.blur = radius(effects.glow.strength);
        params.color = color_or_black(&effects.glow.color);
    }
    params
}

/// Opacity as a 0..=1 factor.
pub(crate) fn opacity_factor(opacity: f32) -> f32 {
    if opacity.is_finite() {
        opacity.clamp(0.0, 100.0) / 100.0
    } else {
        1.0
    }
}

pub(crate) fn radius(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, MAX_EFFECT_RADIUS)
    } else {
        0.0
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

pub(crate) fn color_or_black(input: &str) -> [u8; 4] {
    parse_color(input).unwrap_or_else(|| {
        warn!(color = input, "unparseable effect color, using black");
        [0, 0, 0, 255]
    })
}

/// Places `logo` on a transparent canvas with `margin` pixels on every side.
pub(crate) fn with_margin(logo: &RgbaImage, margin: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(logo.width() + 2 * margin, logo.height() + 2 * margin);
    imageops::replace(&mut canvas, logo, i64::from(margin), i64::from(margin));
    canvas
}

/// Strokes a rectangle around the logo box inset by `margin`, centered on its edge.
pub(crate) fn stroke_border(sprite: &mut RgbaImage, margin: u32, width: f32, color: [u8; 4]) {
    if width <= 0.0 {
        return;
    }
    let half = f64::from(width) / 2.0;
    let left = f64::from(margin);
    let top = f64::from(margin);
    let right = f64::from(sprite.width() - margin);
    let bottom = f64::from(sprite.height() - margin);
    let stroke = Rgba(color);

    for (x, y, pixel) in sprite.enumerate_pixels_mut() {
        let cx = f64::from(x) + 0.5;
        let cy = f64::from(y) + 0.5;
        let in_outer =
            cx >= left - half && cx <= right + half && cy >= top - half && cy <= bottom + half;
        let in_inner =
            cx > left + half && cx < right - half && cy > top + half && cy < bottom - half;
        if in_outer && !in_inner {
            blend(pixel, stroke);
        }
    }
}

/// Multiplies every alpha value by `factor`.
pub(crate) fn apply_opacity(sprite: &mut RgbaImage, factor: f32) {
    if factor >= 1.0 {
        return;
    }
    for pixel in sprite.pixels_mut() {
        pixel.0[3] = (f32::from(pixel.0[3]) * factor).round() as u8;
    }
}

/// Rotates clockwise by `degrees` around the sprite center, growing the
/// canvas to the rotated bounding box.
pub(crate) fn rotate(sprite: &RgbaImage, degrees: f32) -> RgbaImage {
    let normalized = degrees.rem_euclid(360.0);
    if !degrees.is_finite() || normalized == 0.0 {
        return sprite.clone();
    }

    let (sin, cos) = f64::from(normalized).to_radians().sin_cos();
    let w = f64::from(sprite.width());
    let h = f64::from(sprite.height());
    // Trim float noise so right angles do not grow the canvas by a pixel.
    let out_w = (w * cos.abs() + h * sin.abs() - 1e-6).ceil().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs() - 1e-6).ceil().max(1.0) as u32;
    let (src_cx, src_cy) = (w / 2.0, h / 2.0);
    let (dst_cx, dst_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    RgbaImage::from_fn(out_w, out_h, |x, y| {
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;
        sample_bilinear(sprite, sx - 0.5, sy - 0.5)
    })
}

/// Samples with premultiplied bilinear filtering. Outside pixels are transparent.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1.0, y0, fx * (1.0 - fy)),
        (x0, y0 + 1.0, (1.0 - fx) * fy),
        (x0 + 1.0, y0 + 1.0, fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (tx, ty, weight) in taps {
        if weight == 0.0
            || tx < 0.0
            || ty < 0.0
            || tx >= f64::from(src.width())
            || ty >= f64::from(src.height())
        {
            continue;
        }
        let p = src.get_pixel(tx as u32, ty as u32).0;
        let alpha = f64::from(p[3]) / 255.0;
        for c in 0..3 {
            acc[c] += f64::from(p[c]) * alpha * weight;
        }
        acc[3] += alpha * weight;
    }

    if acc[3] <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |v: f64| (v / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Builds a blurred, tinted silhouette of `sprite`.
///
/// Returns the shadow image and the extra margin it carries on each side,
/// or `None` when the shadow would be invisible.
pub(crate) fn shadow_layer(sprite: &RgbaImage, params: &ShadowParams) -> Option<(RgbaImage, u32)> {
    if params.color[3] == 0 {
        return None;
    }
    let sigma = params.blur / 2.0;
    let margin = if sigma > 0.0 {
        (sigma * 3.0).ceil() as u32
    } else {
        0
    };

    let [r, g, b, a] = params.color;
    let tint = f32::from(a) / 255.0;
    let mut silhouette = RgbaImage::from_pixel(
        sprite.width() + 2 * margin,
        sprite.height() + 2 * margin,
        Rgba([r, g, b, 0]),
    );
    for (x, y, pixel) in sprite.enumerate_pixels() {
        let alpha = (f32::from(pixel.0[3]) * tint).round() as u8;
        silhouette.put_pixel(x + margin, y + margin, Rgba([r, g, b, alpha]));
    }

    if sigma > 0.0 {
        silhouette = imageops::blur(&silhouette, sigma);
    }
    Some((silhouette, margin))
}

/// Source-over blend of `top` onto `bottom` with straight alpha.
fn blend(bottom: &mut Rgba<u8>, top: Rgba<u8>) {
    let ta = f32::from(top.0[3]) / 255.0;
    if ta <= 0.0 {
        return;
    }
    let ba = f32::from(bottom.0[3]) / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    for c in 0..3 {
        let v = (f32::from(top.0[c]) * ta + f32::from(bottom.0[c]) * ba * (1.0 - ta)) / out_a;
        bottom.0[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    bottom.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use packshot_core::types::{GlowConfig, ShadowConfig};

    #[test]
    fn disabled_shadow_uses_soft_default() {
        let params = shadow_params(&LogoEffectConfig::default());
        assert_eq!(params.blur, 15.0);
        assert_eq!(params.color, [0, 0, 0, 102]);
        assert_eq!(params.offset, Offset { x: 5.0, y: 5.0 });
    }

    #[test]
    fn glow_replaces_blur_and_color_but_keeps_offset() {
        let effects = LogoEffectConfig {
            shadow: ShadowConfig {
                enabled: true,
                color: "#ff0000".into(),
                blur: 4.0,
                offset: Offset { x: -3.0, y: 7.0 },
            },
            glow: GlowConfig {
                enabled: true,
                color: "#00ff00".into(),
                strength: 12.0,
            },
            ..LogoEffectConfig::default()
        };
        let params = shadow_params(&effects);
        assert_eq!(params.blur, 12.0);
        assert_eq!(params.color, [0, 255, 0, 255]);
        assert_eq!(params.offset, Offset { x: -3.0, y: 7.0 });
    }

    #[test]
    fn bad_color_falls_back_to_black() {
        assert_eq!(color_or_black("chartreuse-ish"), [0, 0, 0, 255]);
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let sprite = RgbaImage::from_pixel(40, 10, Rgba([255, 0, 0, 255]));
        let rotated = rotate(&sprite, 90.0);
        assert_eq!(rotated.dimensions(), (10, 40));
        assert_eq!(rotated.get_pixel(5, 20).0[3], 255);
    }

    #[test]
    fn full_turn_is_identity() {
        let sprite = RgbaImage::from_pixel(7, 3, Rgba([1, 2, 3, 200]));
        assert_eq!(rotate(&sprite, 360.0), sprite);
    }

    #[test]
    fn opacity_scales_alpha_only() {
        let mut sprite = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
        apply_opacity(&mut sprite, 0.5);
        assert_eq!(sprite.get_pixel(0, 0).0, [10, 20, 30, 100]);
    }

    #[test]
    fn border_covers_edge_not_interior() {
        let logo = RgbaImage::new(20, 20);
        let mut sprite = with_margin(&logo, 2);
        stroke_border(&mut sprite, 2, 4.0, [255, 255, 255, 255]);
        assert_eq!(sprite.get_pixel(2, 12).0, [255, 255, 255, 255]);
        assert_eq!(sprite.get_pixel(12, 12).0[3], 0);
    }

    #[test]
    fn transparent_shadow_is_skipped() {
        let sprite = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let params = ShadowParams {
            blur: 3.0,
            color: [0, 0, 0, 0],
            offset: Offset::default(),
        };
        assert!(shadow_layer(&sprite, &params).is_none());
    }
}
