//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): Rejected

use crate::error::{DecodeErrorKind, Error, Result};

/// Maximum length accepted by the decoder.
///
/// Far above any legal SNMP message (UDP caps at 65507 octets), but still a
/// sanity bound on attacker-controlled length fields.
pub const MAX_LENGTH: usize = 0x200000; // 2MB

/// Encode a length value, returning bytes in reverse order for prepending.
///
/// Uses short form for lengths <= 127, long form otherwise.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= 127 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut n = 0;
    let mut rest = len;
    while rest > 0 && n < 4 {
        buf[n] = rest as u8;
        rest >>= 8;
        n += 1;
    }
    buf[n] = 0x80 | n as u8;
    (buf, n + 1)
}

/// Number of bytes [`encode_length`] produces for `len`.
#[inline]
pub const fn length_encoded_len(len: usize) -> usize {
    if len <= 0x7F {
        1
    } else if len <= 0xFF {
        2
    } else if len <= 0xFFFF {
        3
    } else if len <= 0xFF_FFFF {
        4
    } else {
        5
    }
}

/// Decode a length from bytes, returning (length, bytes_consumed)
///
/// `base_offset` is the absolute position of `data[0]`, used for error offsets.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %base_offset, kind = %DecodeErrorKind::TruncatedData }, "missing length byte");
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %base_offset, kind = %DecodeErrorKind::IndefiniteLength }, "indefinite length rejected");
        return Err(Error::decode(base_offset, DecodeErrorKind::IndefiniteLength));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;

    if num_octets > 4 {
        let kind = DecodeErrorKind::LengthTooLong { octets: num_octets };
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %base_offset, kind = %kind }, "length encoding too long");
        return Err(Error::decode(base_offset, kind));
    }

    let Some(octets) = data.get(1..1 + num_octets) else {
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %base_offset, kind = %DecodeErrorKind::TruncatedData }, "length field cut off");
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    let len = octets
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        let kind = DecodeErrorKind::LengthExceedsMax {
            length: len,
            max: MAX_LENGTH,
        };
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %base_offset, kind = %kind }, "length exceeds maximum");
        return Err(Error::decode(base_offset, kind));
    }

    Ok((len, 1 + num_octets))
}
