// src/rpc/encoding.rs

//! Base-64 style encoding of `long` values.
//!
//! The remote endpoint reads these tokens positionally, so the group layout
//! and the leading-zero suppression must match exactly: a 4-bit group for
//! bits 60..64, then ten 6-bit groups, most significant first.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789$_";

/// Bit offsets of the groups, most significant first.
const GROUP_SHIFTS: [u32; 11] = [60, 54, 48, 42, 36, 30, 24, 18, 12, 6, 0];

/// Encode a non-negative 64-bit integer (typically epoch milliseconds).
///
/// Zero groups are skipped until the first non-zero group; after that every
/// group is written. The last group is always written, so `0` encodes as
/// `"A"`.
pub fn encode_long(value: u64) -> String {
    let mut out = String::with_capacity(GROUP_SHIFTS.len());
    let mut seen_non_zero = false;

    for (i, shift) in GROUP_SHIFTS.iter().enumerate() {
        let digit = ((value >> shift) & 0x3f) as usize;
        let last = i == GROUP_SHIFTS.len() - 1;

        if digit > 0 {
            seen_non_zero = true;
        }
        if seen_non_zero || last {
            out.push(ALPHABET[digit] as char);
        }
    }
    out
}

/// Encode epoch milliseconds. Pre-epoch instants clamp to zero.
pub fn encode_millis(millis: i64) -> String {
    encode_long(u64::try_from(millis).unwrap_or(0))
}
