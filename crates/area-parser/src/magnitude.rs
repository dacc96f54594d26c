//! Two-byte "semi-float" sample encoding used by the radar composites.
//!
//! The high nibble of the first (most significant) byte is an exponent, the
//! remaining 12 bits a mantissa. A non-zero exponent adds an implicit 13th
//! bit and shifts the mantissa left by `exponent - 1`. The result is scaled
//! by 1/1000. `0xFFFF` is reserved for "no data".

use area_common::NULL_VALUE;

use crate::reader::ByteOrder;

/// The reserved no-data pattern.
pub const NULL_SAMPLE: [u8; 2] = [0xFF, 0xFF];

const SCALE: f64 = 1000.0;

/// Decode a sample given its most significant byte first.
pub fn decode_magnitude(byte0: u8, byte1: u8) -> f32 {
    if byte0 == 0xFF && byte1 == 0xFF {
        return NULL_VALUE;
    }

    let exponent = u32::from(byte0 >> 4);
    let mut mantissa = (u32::from(byte0 & 0x0F) << 8) | u32::from(byte1);

    if exponent != 0 {
        mantissa |= 0x1000;
        mantissa <<= exponent - 1;
    }

    (mantissa as f64 / SCALE) as f32
}

/// Decode a sample pair as stored in the file.
///
/// Big-endian files store the most significant byte first; little-endian
/// files store it second.
pub fn decode_sample(pair: [u8; 2], byte_order: ByteOrder) -> f32 {
    match byte_order {
        ByteOrder::BigEndian => decode_magnitude(pair[0], pair[1]),
        ByteOrder::LittleEndian => decode_magnitude(pair[1], pair[0]),
    }
}
