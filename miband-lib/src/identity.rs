//! User identity derivation from a display alias.
//!
//! The band stores a 32-bit user id and an 8-byte alias field. Both are
//! derived from the alias the user chose: numeric aliases are used as the id
//! directly, everything else goes through the Java `String.hashCode()`
//! polynomial hash that the official app uses.

use crate::constants::ALIAS_SIZE;

/// Derive the numeric user id for `alias`.
///
/// A leading base-10 integer (optional whitespace and sign, trailing text
/// ignored) is used as-is, wrapped to 32 bits. Any other alias falls back to
/// [`hash_code`].
pub fn compute_uid(alias: &str) -> i32 {
    match leading_integer(alias) {
        Some(value) => value as i32,
        None => hash_code(alias),
    }
}

/// Java-compatible `String.hashCode()`: `h = 31*h + c` over UTF-16 code units,
/// wrapping in signed 32-bit arithmetic.
pub fn hash_code(alias: &str) -> i32 {
    alias
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Normalize `alias` into the fixed 8-byte field of the authentication packet.
///
/// Takes the low byte of the first eight UTF-16 code units, left aligned and
/// zero filled. Longer aliases are truncated.
pub fn normalize(alias: &str) -> [u8; ALIAS_SIZE] {
    let mut field = [0u8; ALIAS_SIZE];
    for (slot, unit) in field.iter_mut().zip(alias.encode_utf16()) {
        *slot = unit as u8;
    }
    field
}

/// Parse a leading decimal integer the way the official app does.
fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value.wrapping_mul(10).wrapping_add((digit - b'0') as i64);
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { value.wrapping_neg() } else { value })
}
