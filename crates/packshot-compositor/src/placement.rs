// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logo sizing and anchor resolution.

use packshot_core::types::{Anchor, LogoEffectConfig};

/// Fixed responsive margin, as a fraction of the shorter base edge.
pub const PADDING_RATIO: f64 = 0.05;

/// Where the logo rectangle lands on the base image, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Clamps `size` into the documented range. Non-finite values use the default.
pub(crate) fn effective_size(size: f32) -> f64 {
    if !size.is_finite() {
        return f64::from(LogoEffectConfig::default().size);
    }
    f64::from(size.clamp(LogoEffectConfig::MIN_SIZE, LogoEffectConfig::MAX_SIZE))
}

/// Computes the logo rectangle for a base of `base_w` x `base_h` and a logo
/// of `logo_w` x `logo_h`.
///
/// The width is `size` percent of the shorter base edge and the height keeps
/// the logo's aspect ratio. A logo too tall for the padded area is scaled
/// down until its height fits. Edge anchors pad by 5% of the shorter edge,
/// centered axes are not padded, and the result always lies inside the base.
pub fn logo_placement(
    base_w: u32,
    base_h: u32,
    logo_w: u32,
    logo_h: u32,
    effects: &LogoEffectConfig,
) -> Placement {
    let short_edge = f64::from(base_w.min(base_h));
    let pad = short_edge * PADDING_RATIO;
    let aspect = if logo_w == 0 {
        1.0
    } else {
        f64::from(logo_h) / f64::from(logo_w)
    };
    let mut width = short_edge * effective_size(effects.size) / 100.0;
    let max_height = (f64::from(base_h) - 2.0 * pad).max(1.0);
    if width * aspect > max_height {
        width = max_height / aspect;
    }
    let width = width.round().max(1.0);
    let height = (width * aspect).round().clamp(1.0, max_height.round());

    let (horizontal, vertical) = axes(effects.position);
    let x = resolve_axis(horizontal, f64::from(base_w), width, pad);
    let y = resolve_axis(vertical, f64::from(base_h), height, pad);

    Placement {
        x,
        y,
        width: width as u32,
        height: height as u32,
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Start,
    Center,
    End,
}

fn axes(anchor: Anchor) -> (Align, Align) {
    match anchor {
        Anchor::TopLeft => (Align::Start, Align::Start),
        Anchor::TopCenter => (Align::Center, Align::Start),
        Anchor::TopRight => (Align::End, Align::Start),
        Anchor::MiddleLeft => (Align::Start, Align::Center),
        Anchor::MiddleCenter => (Align::Center, Align::Center),
        Anchor::MiddleRight => (Align::End, Align::Center),
        Anchor::BottomLeft => (Align::Start, Align::End),
        Anchor::BottomCenter => (Align::Center, Align::End),
        Anchor::BottomRight => (Align::End, Align::End),
    }
}

fn resolve_axis(align: Align, extent: f64, length: f64, pad: f64) -> i64 {
    let raw = match align {
        Align::Start => pad,
        Align::Center => (extent - length) / 2.0,
        Align::End => extent - length - pad,
    };
    let max = (extent - length).max(0.0);
    raw.clamp(0.0, max).round() as i64
}
