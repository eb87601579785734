//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations. Every read is bounds
//! checked against the remaining input; a declared length that overruns the
//! buffer is a decode error.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
///
/// Sub-decoders created for nested constructs remember their absolute
/// position so error offsets always refer to the outermost buffer.
#[derive(Debug)]
pub struct Decoder {
    data: Bytes,
    offset: usize,
    base: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Current offset relative to this decoder's own input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current offset relative to the outermost buffer.
    pub fn absolute_offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn fail(&self, at: usize, kind: DecodeErrorKind) -> Error {
        let offset = self.base + at;
        tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %offset, kind = %kind }, "decode failed");
        Error::decode(offset, kind)
    }

    /// Build a logged decode error at the current position.
    pub(crate) fn error(&self, kind: DecodeErrorKind) -> Error {
        self.fail(self.offset, kind)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(self.fail(self.offset, DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let rest = self.data.get(self.offset..).unwrap_or_default();
        let (len, consumed) = decode_length(rest, self.absolute_offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            let kind = DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            };
            return Err(self.fail(self.offset, kind));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let at = self.offset;
        let actual = self.read_tag()?;
        if actual != expected {
            let kind = if actual == tag::universal::OCTET_STRING_CONSTRUCTED
                && expected == tag::universal::OCTET_STRING
            {
                DecodeErrorKind::ConstructedOctetString
            } else {
                DecodeErrorKind::UnexpectedTag { expected, actual }
            };
            return Err(self.fail(at, kind));
        }
        self.read_length()
    }

    /// Read a BER integer (signed).
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read integer value given the length.
    ///
    /// Redundant leading sign bytes are tolerated, but the value itself must
    /// fit in 32 bits.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        let at = self.offset;
        if len == 0 {
            return Err(self.fail(at, DecodeErrorKind::ZeroLengthInteger));
        }
        let bytes = self.read_bytes(len)?;

        let negative = bytes[0] & 0x80 != 0;
        let pad = if negative { 0xFF } else { 0x00 };
        let significant = bytes.iter().position(|&b| b != pad).unwrap_or(len);
        // keep one sign byte when the first significant byte has the wrong top bit
        let start = match bytes.get(significant) {
            Some(&b) if (b & 0x80 != 0) != negative => significant.saturating_sub(1),
            Some(_) => significant,
            None => len - 1,
        };
        if len - start > 4 {
            return Err(self.fail(at, DecodeErrorKind::IntegerOverflow));
        }

        let mut value: i32 = if negative { -1 } else { 0 };
        for &byte in &bytes[start..] {
            value = (value << 8) | (byte as i32);
        }
        Ok(value)
    }

    /// Read a 64-bit unsigned integer (Counter64).
    pub fn read_integer64(&mut self, expected_tag: u8) -> Result<u64> {
        let len = self.expect_tag(expected_tag)?;
        self.read_integer64_value(len)
    }

    /// Read 64-bit unsigned integer value given the length.
    pub fn read_integer64_value(&mut self, len: usize) -> Result<u64> {
        self.read_unsigned_value(len, 8)
    }

    /// Read an unsigned 32-bit integer with specific tag.
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        let len = self.expect_tag(expected_tag)?;
        self.read_unsigned32_value(len)
    }

    /// Read unsigned 32-bit integer value given length.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        self.read_unsigned_value(len, 4).map(|v| v as u32)
    }

    fn read_unsigned_value(&mut self, len: usize, width: usize) -> Result<u64> {
        let at = self.offset;
        if len == 0 {
            return Err(self.fail(at, DecodeErrorKind::ZeroLengthInteger));
        }
        if width == 8 && len > 9 {
            return Err(self.fail(at, DecodeErrorKind::Integer64TooLong { length: len }));
        }
        let bytes = self.read_bytes(len)?;
        let significant = bytes.iter().position(|&b| b != 0).unwrap_or(len);
        if len - significant > width {
            return Err(self.fail(at, DecodeErrorKind::IntegerOverflow));
        }
        Ok(bytes[significant..]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(self.fail(self.offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read an OID given a pre-read length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let at = self.absolute_offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => {
                tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %(at + offset), kind = %kind }, "invalid OID");
                Error::decode(at + offset, kind)
            }
            other => other,
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Read an IP address.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let len = self.expect_tag(tag::application::IP_ADDRESS)?;
        self.read_ip_address_value(len)
    }

    /// Read an IP address given a pre-read length.
    pub fn read_ip_address_value(&mut self, len: usize) -> Result<[u8; 4]> {
        if len != 4 {
            return Err(self.fail(
                self.offset,
                DecodeErrorKind::InvalidIpAddressLength { length: len },
            ));
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Skip a TLV (tag-length-value) without parsing.
    pub fn skip_tlv(&mut self) -> Result<()> {
        let _tag = self.read_tag()?;
        let len = self.read_length()?;
        let new_offset = self.offset.saturating_add(len);
        if new_offset > self.data.len() {
            return Err(self.fail(self.offset, DecodeErrorKind::TlvOverflow));
        }
        self.offset = new_offset;
        Ok(())
    }

    /// Create a sub-decoder for the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.absolute_offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
        })
    }

    /// Fail unless every byte has been consumed.
    pub fn expect_end(&self) -> Result<()> {
        if !self.is_empty() {
            let kind = DecodeErrorKind::TrailingData {
                count: self.remaining(),
            };
            return Err(self.fail(self.offset, kind));
        }
        Ok(())
    }

    /// Get the underlying bytes for the entire buffer.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Get remaining data as a slice.
    pub fn remaining_slice(&self) -> &[u8] {
        self.data.get(self.offset..).unwrap_or_default()
    }
}
