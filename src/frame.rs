//! Wire-format constants and the fixed-point quantization shared by the
//! encoder and decoder.

use crate::error::PushError;

/// Size in bytes of the header written by the first `push`.
pub const HEADER_LEN: usize = 12;

/// Fixed-point scale factor: coordinates are stored as `round(degrees * SCALE)`.
/// This is a wire-format constant, not a runtime tunable — changing it breaks
/// compatibility with already-encoded buffers.
pub const SCALE: f64 = 100_000.0;

/// Quantizes a coordinate in degrees to the fixed-point `i32` representation
/// used on the wire.
///
/// Returns [`PushError::QuantizationOverflow`] if `coord * SCALE` does not
/// fit in a signed 32-bit integer (well outside the supported domain of
/// `|lat| <= 90`, `|lng| <= 180`).
pub fn quantize(coord: f64) -> Result<i32, PushError> {
    let scaled = (coord * SCALE).round();
    if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(PushError::QuantizationOverflow { value: coord });
    }
    Ok(scaled as i32)
}

/// Converts a quantized fixed-point coordinate back to degrees.
pub fn dequantize(icoord: i32) -> f64 {
    icoord as f64 / SCALE
}
