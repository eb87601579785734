//! BER encoding.
//!
//! [`EncodeBuf`] writes back to front: content is pushed first, then its
//! length, then its tag. Nested structures therefore never need a length
//! pre-pass, and the final byte order is restored once in [`EncodeBuf::finish`].

use super::length::{encode_length, length_encoded_len};
use super::tag;
use crate::oid::Oid;
use bytes::Bytes;

/// Reverse-order BER encoder.
///
/// Children of a constructed value must be pushed last-to-first.
#[derive(Debug, Default)]
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing allocation. Its contents are discarded.
    pub fn from_vec(mut buf: Vec<u8>) -> Self {
        buf.clear();
        Self { buf }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push a single raw byte.
    #[inline]
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Push raw bytes, preserving their forward order in the output.
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buf.extend(data.iter().rev());
    }

    /// Push a tag byte.
    #[inline]
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Push a length field.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, n) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..n]);
    }

    /// Push a SEQUENCE whose content is written by `f`.
    pub fn push_sequence(&mut self, f: impl FnOnce(&mut Self)) {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Push a constructed value with an arbitrary tag.
    pub fn push_constructed(&mut self, tag: u8, f: impl FnOnce(&mut Self)) {
        let start = self.buf.len();
        f(self);
        let content_len = self.buf.len() - start;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Push an INTEGER in minimal two's-complement form.
    pub fn push_integer(&mut self, value: i32) {
        self.push_signed(tag::universal::INTEGER, value);
    }

    /// Push a signed integer under an arbitrary tag.
    pub fn push_signed(&mut self, tag: u8, value: i32) {
        let bytes = value.to_be_bytes();
        let content = minimal_signed(&bytes);
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Push an unsigned 32-bit value (Counter32, Gauge32, TimeTicks).
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        let bytes = (value as u64).to_be_bytes();
        let content = minimal_unsigned(&bytes[3..]);
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Push a Counter64.
    pub fn push_integer64(&mut self, value: u64) {
        let mut bytes = [0u8; 9];
        bytes[1..].copy_from_slice(&value.to_be_bytes());
        let content = minimal_unsigned(&bytes);
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag::application::COUNTER64);
    }

    /// Push an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_bytes(data);
        self.push_length(data.len());
        self.push_tag(tag::universal::OCTET_STRING);
    }

    /// Push a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Push an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        let content = oid.to_ber_smallvec();
        self.push_bytes(&content);
        self.push_length(content.len());
        self.push_tag(tag::universal::OBJECT_IDENTIFIER);
    }

    /// Push an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_bytes(&addr);
        self.push_length(4);
        self.push_tag(tag::application::IP_ADDRESS);
    }

    /// Finish encoding and return the bytes in wire order.
    pub fn finish(self) -> Bytes {
        Bytes::from(self.finish_vec())
    }

    /// Finish encoding into a plain `Vec`, keeping its allocation.
    pub fn finish_vec(mut self) -> Vec<u8> {
        self.buf.reverse();
        self.buf
    }
}

/// Strip redundant sign-extension bytes from a big-endian two's-complement value.
fn minimal_signed(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (b, next) = (bytes[start], bytes[start + 1]);
        if (b == 0x00 && next & 0x80 == 0) || (b == 0xFF && next & 0x80 != 0) {
            start += 1;
        } else {
            break;
        }
    }
    &bytes[start..]
}

/// Same as [`minimal_signed`] for a value known to be non-negative.
///
/// `bytes` must begin with a zero byte so large values keep a positive sign.
fn minimal_unsigned(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() && bytes[start] == 0 && bytes[start + 1] & 0x80 == 0 {
        start += 1;
    }
    &bytes[start..]
}

/// Content length of a minimally encoded INTEGER.
pub fn integer_content_len(value: i32) -> usize {
    minimal_signed(&value.to_be_bytes()).len()
}

/// Content length of a minimally encoded unsigned 32-bit value.
pub fn unsigned32_content_len(value: u32) -> usize {
    let bytes = (value as u64).to_be_bytes();
    minimal_unsigned(&bytes[3..]).len()
}

/// Content length of a minimally encoded Counter64.
pub fn unsigned64_content_len(value: u64) -> usize {
    let mut bytes = [0u8; 9];
    bytes[1..].copy_from_slice(&value.to_be_bytes());
    minimal_unsigned(&bytes).len()
}

/// Full TLV length for content of `content_len` bytes with a one-byte tag.
#[inline]
pub fn tlv_len(content_len: usize) -> usize {
    1 + length_encoded_len(content_len) + content_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::hex::encode as hex;

    fn int(v: i32) -> String {
        let mut buf = EncodeBuf::new();
        buf.push_integer(v);
        hex(&buf.finish())
    }

    #[test]
    fn test_integer_minimal() {
        assert_eq!(int(0), "020100");
        assert_eq!(int(-1), "0201ff");
        assert_eq!(int(127), "02017f");
        assert_eq!(int(128), "02020080");
        assert_eq!(int(-128), "020180");
        assert_eq!(int(-129), "0202ff7f");
        assert_eq!(int(256), "02020100");
        assert_eq!(int(i32::MAX), "02047fffffff");
        assert_eq!(int(i32::MIN), "020480000000");
    }

    #[test]
    fn test_unsigned32() {
        let mut buf = EncodeBuf::new();
        buf.push_unsigned32(tag::application::COUNTER32, u32::MAX);
        assert_eq!(hex(&buf.finish()), "410500ffffffff");

        let mut buf = EncodeBuf::new();
        buf.push_unsigned32(tag::application::GAUGE32, 0);
        assert_eq!(hex(&buf.finish()), "420100");
    }

    #[test]
    fn test_counter64() {
        let mut buf = EncodeBuf::new();
        buf.push_integer64(u64::MAX);
        assert_eq!(hex(&buf.finish()), "460900ffffffffffffffff");

        let mut buf = EncodeBuf::new();
        buf.push_integer64(1);
        assert_eq!(hex(&buf.finish()), "460101");
    }

    #[test]
    fn test_content_len_helpers() {
        for v in [0, 1, -1, 127, 128, -128, -129, 65535, i32::MAX, i32::MIN] {
            let mut buf = EncodeBuf::new();
            buf.push_integer(v);
            assert_eq!(buf.len(), 2 + integer_content_len(v), "v={v}");
        }
        assert_eq!(unsigned32_content_len(0x80), 2);
        assert_eq!(unsigned32_content_len(u32::MAX), 5);
        assert_eq!(unsigned64_content_len(u64::MAX), 9);
        assert_eq!(unsigned64_content_len(0), 1);
    }

    #[test]
    fn test_sequence_children_reverse_order() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_integer(2);
            buf.push_integer(1);
        });
        assert_eq!(hex(&buf.finish()), "3006020101020102");
    }

    #[test]
    fn test_octet_string_and_null() {
        let mut buf = EncodeBuf::new();
        buf.push_null();
        buf.push_octet_string(b"public");
        assert_eq!(hex(&buf.finish()), "04067075626c69630500");
    }

    #[test]
    fn test_long_form_length() {
        let data = vec![0xAB; 200];
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(&data);
        let out = buf.finish();
        assert_eq!(&out[..3], &[0x04, 0x81, 200]);
        assert_eq!(out.len(), tlv_len(200));
    }
}
