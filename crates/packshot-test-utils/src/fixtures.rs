// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encoded image fixtures.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use packshot_core::types::DataUri;

/// A PNG of one solid color.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    // Encoding an in-memory RGBA buffer to PNG cannot fail.
    let _ = img.write_to(&mut out, ImageFormat::Png);
    out.into_inner()
}

/// [`solid_png`] wrapped as a data URI.
pub fn png_data_uri(width: u32, height: u32, rgba: [u8; 4]) -> DataUri {
    DataUri::from_bytes("image/png", &solid_png(width, height, rgba))
}
