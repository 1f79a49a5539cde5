//! Murmur3 hashing for the Iceberg `bucket[N]` transform.
//!
//! Iceberg defines bucket hashes as the 32-bit x86 variant of Murmur3 with
//! seed 0, applied to a fixed binary encoding of each value type. Writers in
//! every language must agree on these bytes, otherwise rows for the same key
//! land in different buckets.

use std::io;

/// Murmur3 x86 32-bit hash with seed 0, returned as a signed value.
///
/// # Errors
///
/// Propagates read errors from the hasher; reading an in-memory slice does
/// not fail in practice.
#[allow(clippy::cast_possible_wrap)]
pub fn murmur3_32(data: &[u8]) -> io::Result<i32> {
    let mut reader = data;
    murmur3::murmur3_32(&mut reader, 0).map(|h| h as i32)
}

/// Hashes an `int`; Iceberg hashes ints as longs so promotion keeps buckets stable.
///
/// # Errors
///
/// See [`murmur3_32`].
pub fn hash_int(value: i32) -> io::Result<i32> {
    hash_long(i64::from(value))
}

/// Hashes a `long` as 8 little-endian bytes.
///
/// # Errors
///
/// See [`murmur3_32`].
pub fn hash_long(value: i64) -> io::Result<i32> {
    murmur3_32(&value.to_le_bytes())
}

/// Hashes a string as its UTF-8 bytes.
///
/// # Errors
///
/// See [`murmur3_32`].
pub fn hash_str(value: &str) -> io::Result<i32> {
    murmur3_32(value.as_bytes())
}

/// Hashes raw bytes (binary, fixed and uuid values).
///
/// # Errors
///
/// See [`murmur3_32`].
pub fn hash_bytes(value: &[u8]) -> io::Result<i32> {
    murmur3_32(value)
}

/// Hashes a decimal by its unscaled value.
///
/// The scale is not hashed, so `1.0` and `1.00` land in different buckets.
///
/// # Errors
///
/// See [`murmur3_32`].
pub fn hash_decimal(unscaled: i128) -> io::Result<i32> {
    murmur3_32(&decimal_bytes(unscaled))
}

/// Minimal big-endian two's-complement encoding of an unscaled decimal.
#[must_use]
pub fn decimal_bytes(unscaled: i128) -> Vec<u8> {
    let bytes = unscaled.to_be_bytes();
    let mut start = 0;
    // A leading byte is redundant when it only repeats the sign of the next one.
    while start + 1 < bytes.len() {
        let sign_bit = bytes[start + 1] & 0x80;
        match bytes[start] {
            0x00 if sign_bit == 0 => start += 1,
            0xff if sign_bit != 0 => start += 1,
            _ => break,
        }
    }
    bytes[start..].to_vec()
}

/// Maps a hash to a bucket in `[0, num_buckets)`.
///
/// The sign bit is masked off before the modulo. `num_buckets` must be in
/// `1..=i32::MAX`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn bucket_of(hash: i32, num_buckets: u32) -> i32 {
    (hash & i32::MAX) % (num_buckets as i32)
}
