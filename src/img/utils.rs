//! Low-level conversion utilities

use encoding_rs::WINDOWS_1252;

/// Convert a 24-bit map unit value to degrees.
///
/// A full circle is 2^24 units.
pub fn map_units_to_degrees(units: i32) -> f64 {
    units as f64 * 360.0 / (1u32 << 24) as f64
}

/// Decode a fixed-width Latin-1 text field and trim padding around it.
pub fn decode_latin1_trimmed(bytes: &[u8]) -> String {
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string()
}

/// Render an 8-byte directory name for display and map keys.
pub fn entry_name(name: &[u8; 8]) -> String {
    decode_latin1_trimmed(name)
}
