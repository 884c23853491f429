// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSS-style color parsing for effect colors.
//!
//! Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
//! `rgba(r, g, b, a)` where `a` is a 0..=1 fraction.

/// Parses a color into straight (non-premultiplied) RGBA bytes.
pub fn parse_color(input: &str) -> Option<[u8; 4]> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(body) = lower.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
        return parse_functional(body, true);
    }
    if let Some(body) = lower.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
        return parse_functional(body, false);
    }
    None
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 255]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

fn parse_functional(body: &str, with_alpha: bool) -> Option<[u8; 4]> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let alpha = if with_alpha {
        let a = parts[3].parse::<f32>().ok()?;
        (a.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#000000"), Some([0, 0, 0, 255]));
        assert_eq!(parse_color("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#ff000080"), Some([255, 0, 0, 128]));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(parse_color("rgba(0, 0, 0, 0.4)"), Some([0, 0, 0, 102]));
        assert_eq!(parse_color("RGB(10,20,30)"), Some([10, 20, 30, 255]));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_color("glowy"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ééé"), None);
        assert_eq!(parse_color("rgba(1,2,3)"), None);
    }
}
