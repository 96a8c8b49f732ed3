// src/converters/color.rs

/// White, used for fills and backgrounds that cannot be resolved.
pub const WHITE: &str = "#ffffff";
/// Black, used for text and borders that cannot be resolved.
pub const BLACK: &str = "#000000";

const MODIFIER_SCALE: f64 = 100_000.0;

/// Normalizes a 6-digit (`RRGGBB`) or 8-digit ARGB (`AARRGGBB`) hex string to `#rrggbb`.
///
/// A leading `#` and surrounding whitespace are accepted. Returns `None` for any other length
/// or for non-hex content.
pub fn normalize_hex(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match digits.len() {
        6 => digits,
        8 => &digits[2..],
        _ => return None,
    };
    Some(format!("#{}", rgb.to_ascii_lowercase()))
}

/// Splits a 24-bit integer `0x00RRGGBB` into its channels.
pub fn decode_int(value: u32) -> (u8, u8, u8) {
    (
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    )
}

/// Formats channels as `#rrggbb`.
pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parses `#rrggbb` (or any form [`normalize_hex`] accepts) into channels.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let normalized = normalize_hex(hex)?;
    let value = u32::from_str_radix(&normalized[1..], 16).ok()?;
    Some(decode_int(value))
}

fn round_channel(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

fn map_channels(hex: &str, f: impl Fn(f64) -> f64) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => to_hex((
            round_channel(f(r as f64)),
            round_channel(f(g as f64)),
            round_channel(f(b as f64)),
        )),
        None => hex.to_string(),
    }
}

/// Lightens towards white: `new = old + (255 - old) * t`.
///
/// Malformed input is returned unchanged.
pub fn apply_tint(hex: &str, tint: i64) -> String {
    let t = tint as f64 / MODIFIER_SCALE;
    map_channels(hex, |old| old + (255.0 - old) * t)
}

/// Darkens towards black: `new = old * (1 - s)`.
///
/// Malformed input is returned unchanged.
pub fn apply_shade(hex: &str, shade: i64) -> String {
    let s = shade as f64 / MODIFIER_SCALE;
    map_channels(hex, |old| old * (1.0 - s))
}

/// Applies the optional modifiers of a scheme reference, tint first, then shade.
pub fn apply_modifiers(hex: &str, tint: Option<i64>, shade: Option<i64>) -> String {
    let tinted = match tint {
        Some(t) => apply_tint(hex, t),
        None => hex.to_string(),
    };
    match shade {
        Some(s) => apply_shade(&tinted, s),
        None => tinted,
    }
}
