//! Hex conversion and similarity scoring for dominant-color samples.
//!
//! Similarity is plain Euclidean distance in 8-bit RGB, normalized by the
//! maximum possible distance. This is a rough perceptual approximation, not
//! a calibrated color-difference model (no CIELAB / delta-E); it is kept
//! because the reference thresholds were tuned against it.

use crate::error::EngineError;

/// Maximum Euclidean distance between two colors in 8-bit RGB space.
const MAX_RGB_DISTANCE: f64 = 441.6729559300637; // sqrt(3 * 255^2)

/// Quantize one channel to 8 bits.
///
/// Vision providers report channels either as unit-range floats or as 8-bit
/// values; anything <= 1.0 across the sample is treated as unit range by the
/// caller. Truncation, not rounding — the similarity thresholds were tuned
/// against truncated values.
fn quantize_channel(value: f32, unit_range: bool) -> u8 {
    let scaled = if unit_range { value * 255.0 } else { value };
    scaled.clamp(0.0, 255.0) as u8
}

/// Convert an RGB triplet to a lowercase, zero-padded `#rrggbb` string.
pub fn to_hex(red: f32, green: f32, blue: f32) -> String {
    let unit_range = red <= 1.0 && green <= 1.0 && blue <= 1.0;
    format!(
        "#{:02x}{:02x}{:02x}",
        quantize_channel(red, unit_range),
        quantize_channel(green, unit_range),
        quantize_channel(blue, unit_range),
    )
}

/// Parse a `#rrggbb` (or `rrggbb`) string into 8-bit channels.
pub fn parse_hex(hex: &str) -> Result<[u8; 3], EngineError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(EngineError::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| EngineError::InvalidColor(hex.to_string()))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Score similarity between two hex colors in `[0.0, 1.0]`.
///
/// 1.0 means identical, 0.0 means maximally distant (black vs. white).
pub fn similarity(hex_a: &str, hex_b: &str) -> Result<f64, EngineError> {
    let a = parse_hex(hex_a)?;
    let b = parse_hex(hex_b)?;
    let distance = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt();
    Ok(1.0 - distance / MAX_RGB_DISTANCE)
}
