//! Hexadecimal encoding and decoding.
//!
//! Engine ids and context engine ids arrive hex-encoded in the parameter map,
//! and show up hex-encoded in diagnostics and logs.

use std::fmt;

/// Encode bytes as lowercase hex string.
///
/// ```
/// use snmp_wire::format::hex::encode;
///
/// assert_eq!(encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode a hex string to bytes. Either case is accepted.
///
/// ```
/// use snmp_wire::format::hex::decode;
///
/// assert_eq!(decode("80001F88").unwrap(), vec![0x80, 0x00, 0x1f, 0x88]);
/// assert!(decode("abc").is_err());
/// ```
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    if !s.len().is_multiple_of(2) {
        return Err(DecodeError::OddLength);
    }
    s.as_bytes()
        .chunks_exact(2)
        .map(|pair| Ok((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

fn nibble(c: u8) -> Result<u8, DecodeError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(DecodeError::InvalidChar),
    }
}

/// Error type for hex decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input has odd length
    #[error("odd number of hex digits")]
    OddLength,
    /// Invalid hexadecimal character
    #[error("invalid hex character")]
    InvalidChar,
}

/// Lazy hex formatter for log fields.
///
/// ```
/// use snmp_wire::format::hex::Bytes;
///
/// assert_eq!(format!("{}", Bytes(&[0x80, 0x00])), "8000");
/// ```
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decode a hex fixture, panicking on malformed input.
#[cfg(any(test, feature = "testing"))]
pub fn fixture(s: &str) -> Vec<u8> {
    let cleaned: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match decode(&cleaned) {
        Ok(bytes) => bytes,
        Err(e) => panic!("bad hex fixture {s:?}: {e}"),
    }
}
