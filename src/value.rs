//! SNMP value types.
//!
//! [`Value`] is closed: the decoder accepts exactly the SMIv2 base types and
//! the three varbind exceptions, and rejects any other tag.

use crate::ber::{
    Decoder, EncodeBuf, integer_content_len, tag, tlv_len, unsigned32_content_len,
    unsigned64_content_len,
};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER (signed 32-bit)
    Integer(i32),

    /// OCTET STRING (arbitrary bytes)
    OctetString(Bytes),

    /// NULL, used as the placeholder value in requests
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, network order)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32
    Gauge32(u32),

    /// TimeTicks (hundredths of a second)
    TimeTicks(u32),

    /// Opaque (arbitrary BER-wrapped bytes)
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping). Not valid in SNMPv1 PDUs.
    Counter64(u64),

    /// noSuchObject exception
    NoSuchObject,

    /// noSuchInstance exception
    NoSuchInstance,

    /// endOfMibView exception, the normal end of a walk
    EndOfMibView,
}

impl Value {
    /// Get as i32 if this is an Integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as u32 for Counter32, Gauge32, TimeTicks, or a non-negative Integer.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Get as u64 for Counter64 or any 32-bit unsigned type.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            other => other.as_u32().map(u64::from),
        }
    }

    /// Get the raw bytes of an OctetString or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(data) | Value::Opaque(data) => Some(data),
            _ => None,
        }
    }

    /// Get an OctetString as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(data) => std::str::from_utf8(data).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(bytes) => Some(std::net::Ipv4Addr::from(*bytes)),
            _ => None,
        }
    }

    /// Check if this is an exception value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Returns the total BER-encoded length (tag + length + content).
    pub fn ber_encoded_len(&self) -> usize {
        match self {
            Value::Integer(v) => tlv_len(integer_content_len(*v)),
            Value::OctetString(data) | Value::Opaque(data) => tlv_len(data.len()),
            Value::Null => 2,
            Value::ObjectIdentifier(oid) => oid.ber_encoded_len(),
            Value::IpAddress(_) => 6,
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                tlv_len(unsigned32_content_len(*v))
            }
            Value::Counter64(v) => tlv_len(unsigned64_content_len(*v)),
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => 2,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => {
                buf.push_bytes(data);
                buf.push_length(data.len());
                buf.push_tag(tag::application::OPAQUE);
            }
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => push_exception(buf, tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => push_exception(buf, tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => push_exception(buf, tag::context::END_OF_MIB_VIEW),
        }
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let at = decoder.absolute_offset();
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match tag {
            tag::universal::INTEGER => decoder.read_integer_value(len).map(Value::Integer),
            tag::universal::OCTET_STRING => decoder.read_bytes(len).map(Value::OctetString),
            tag::universal::NULL => {
                if len != 0 {
                    return Err(reject(at, DecodeErrorKind::InvalidNull));
                }
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                decoder.read_oid_value(len).map(Value::ObjectIdentifier)
            }
            tag::application::IP_ADDRESS => {
                decoder.read_ip_address_value(len).map(Value::IpAddress)
            }
            tag::application::COUNTER32 => decoder.read_unsigned32_value(len).map(Value::Counter32),
            tag::application::GAUGE32 => decoder.read_unsigned32_value(len).map(Value::Gauge32),
            tag::application::TIMETICKS => decoder.read_unsigned32_value(len).map(Value::TimeTicks),
            tag::application::OPAQUE => decoder.read_bytes(len).map(Value::Opaque),
            tag::application::COUNTER64 => decoder.read_integer64_value(len).map(Value::Counter64),
            tag::context::NO_SUCH_OBJECT => read_exception(decoder, len, Value::NoSuchObject),
            tag::context::NO_SUCH_INSTANCE => read_exception(decoder, len, Value::NoSuchInstance),
            tag::context::END_OF_MIB_VIEW => read_exception(decoder, len, Value::EndOfMibView),
            tag::universal::OCTET_STRING_CONSTRUCTED => {
                Err(reject(at, DecodeErrorKind::ConstructedOctetString))
            }
            other => Err(reject(at, DecodeErrorKind::UnknownValueTag(other))),
        }
    }
}

fn push_exception(buf: &mut EncodeBuf, tag: u8) {
    buf.push_length(0);
    buf.push_tag(tag);
}

fn read_exception(decoder: &mut Decoder, len: usize, value: Value) -> Result<Value> {
    // exception content is meaningless; skip whatever the agent sent
    if len != 0 {
        decoder.read_bytes(len)?;
    }
    Ok(value)
}

fn reject(offset: usize, kind: DecodeErrorKind) -> Error {
    tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %offset, kind = %kind }, "invalid value");
    Error::decode(offset, kind)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "0x{}", hex::encode(data)),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) | Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::Opaque(data) => write!(f, "Opaque(0x{})", hex::encode(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Counter64(v)
    }
}
