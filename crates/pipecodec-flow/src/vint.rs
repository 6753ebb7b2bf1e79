//! Hadoop `WritableUtils` variable-length integers.
//!
//! Values in `-112..=127` take a single byte. Anything else is a lead byte
//! followed by 1 to 8 big-endian magnitude bytes. The lead byte encodes both
//! the sign and the magnitude width:
//!
//! ```text
//! -113 ..= -120   positive, 1..=8 magnitude bytes
//! -121 ..= -128   negative (one's complement), 1..=8 magnitude bytes
//! ```

use bytes::BufMut;

/// Largest encoded size of a VLong.
pub const MAX_VLONG_SIZE: usize = 9;

/// Append the VLong encoding of `value` to `dst`.
pub fn put_vlong(dst: &mut impl BufMut, value: i64) {
    if (-112..=127).contains(&value) {
        dst.put_i8(value as i8);
        return;
    }

    let (magnitude, mut lead) = if value < 0 {
        (value ^ -1, -120i8)
    } else {
        (value, -112i8)
    };

    let mut tmp = magnitude;
    while tmp != 0 {
        tmp >>= 8;
        lead -= 1;
    }
    dst.put_i8(lead);

    let width = magnitude_width(lead);
    for idx in (0..width).rev() {
        dst.put_u8((magnitude >> (idx * 8)) as u8);
    }
}

/// Total encoded size (lead byte included) implied by a lead byte.
pub fn decode_size(lead: i8) -> usize {
    if lead >= -112 {
        1
    } else if lead < -120 {
        (-119 - i32::from(lead)) as usize
    } else {
        (-111 - i32::from(lead)) as usize
    }
}

/// Whether a lead byte denotes a negative value.
pub fn is_negative(lead: i8) -> bool {
    lead < -120 || (-112..0).contains(&lead)
}

/// Rebuild a value from its lead byte and the magnitude bytes that follow it.
///
/// `rest` must hold exactly `decode_size(lead) - 1` bytes.
pub fn decode_vlong(lead: i8, rest: &[u8]) -> i64 {
    if decode_size(lead) == 1 {
        return i64::from(lead);
    }
    let magnitude = rest
        .iter()
        .fold(0i64, |acc, b| (acc << 8) | i64::from(*b));
    if is_negative(lead) {
        magnitude ^ -1
    } else {
        magnitude
    }
}

/// Encoded size of `value`.
pub fn encoded_len(value: i64) -> usize {
    if (-112..=127).contains(&value) {
        return 1;
    }
    let magnitude = if value < 0 { value ^ -1 } else { value };
    let bits = 64 - magnitude.leading_zeros() as usize;
    1 + bits.div_ceil(8)
}

fn magnitude_width(lead: i8) -> u32 {
    if lead < -120 {
        (-(i32::from(lead) + 120)) as u32
    } else {
        (-(i32::from(lead) + 112)) as u32
    }
}
