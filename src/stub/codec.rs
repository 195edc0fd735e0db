//! Low level packet encoding: hex conversions, checksums and binary escaping.

use crate::stub::error::Error;

/// Longest hex field (address, length, register number) accepted in a command.
/// A field of this many characters or more is rejected as too long.
pub const FIELD_CAPACITY: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Escape prefix used in binary (qXfer) payloads.
pub const ESCAPE: u8 = b'}';

/// Convert an ASCII hex digit (`0-9a-fA-F`) into its value.
pub fn hex_digit_value(c: u8) -> Result<u8, Error> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::InvalidHexDigit(c)),
    }
}

/// Encode a byte as two lowercase hex characters.
pub fn encode_byte_hex(b: u8) -> [u8; 2] {
    [HEX_DIGITS[(b >> 4) as usize], HEX_DIGITS[(b & 0x0f) as usize]]
}

/// Decode two hex characters into a byte.
pub fn decode_hex_byte(hi: u8, lo: u8) -> Result<u8, Error> {
    Ok(hex_digit_value(hi)? << 4 | hex_digit_value(lo)?)
}

/// Calculate the packet checksum: the sum of all bytes modulo 256.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc.wrapping_add(b))
}

/// Bytes that must never appear raw inside a binary payload.
pub fn needs_escape(b: u8) -> bool {
    matches!(b, b'}' | b'#' | b'$' | b'*')
}

/// Escape a byte of a qXfer object-read payload.
///
/// Returns the bytes to put on the wire and how many of them are meaningful.
pub fn escape_qxfer_byte(b: u8) -> ([u8; 2], usize) {
    if needs_escape(b) {
        ([ESCAPE, b ^ 0x20], 2)
    } else {
        ([b, 0], 1)
    }
}

/// Parse a hex number with no `0x` prefix.
///
/// `name` is used for error reporting only.
pub fn parse_hex_u64(field: &[u8], name: &'static str) -> Result<u64, Error> {
    if field.is_empty() {
        return Err(Error::MalformedField(name));
    }
    field.iter().try_fold(0u64, |acc, &c| {
        let digit = hex_digit_value(c)?;
        if acc >> 60 != 0 {
            return Err(Error::FieldOverflow(name));
        }
        Ok(acc << 4 | digit as u64)
    })
}

/// Split `input` at the first `delim`, returning the parts before and after it.
pub fn split_once(input: &[u8], delim: u8) -> Option<(&[u8], &[u8])> {
    let pos = input.iter().position(|&b| b == delim)?;
    Some((&input[..pos], &input[pos + 1..]))
}

/// Decode a hex string into `dst`. `src` must hold exactly `2 * dst.len()` characters.
pub fn decode_hex_into(src: &[u8], dst: &mut [u8]) -> Result<(), Error> {
    debug_assert_eq!(src.len(), dst.len() * 2);
    for (pair, out) in src.chunks_exact(2).zip(dst.iter_mut()) {
        *out = decode_hex_byte(pair[0], pair[1])?;
    }
    Ok(())
}
