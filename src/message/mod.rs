//! SNMP message envelopes.
//!
//! Messages wrap a PDU body with version and security information.
//!
//! # Message Types
//!
//! - [`CommunityMessage`] - V1/V2c messages with community string auth
//! - [`V3Message`] - V3 messages with USM security

mod community;
mod v3;

pub use community::CommunityMessage;
pub use v3::{MsgFlags, MsgGlobalData, ScopedPdu, V3Message, V3MessageData};

use crate::ber::Decoder;
use crate::error::{DecodeErrorKind, Result};
use crate::version::Version;
use bytes::Bytes;

/// Decoded SNMP message (any version).
#[derive(Debug, Clone)]
pub enum Message {
    /// SNMPv1 or SNMPv2c message with community string
    Community(CommunityMessage),
    /// SNMPv3 message with USM security
    V3(V3Message),
}

impl Message {
    /// Get the SNMP version.
    pub fn version(&self) -> Version {
        match self {
            Message::Community(m) => m.version,
            Message::V3(_) => Version::V3,
        }
    }

    /// Decode a message from bytes.
    ///
    /// Detects the version and parses accordingly. Bytes after the outer
    /// SEQUENCE are rejected.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        decoder.expect_end()?;

        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| seq.error(DecodeErrorKind::UnknownVersion(version_num)))?;

        match version {
            Version::V1 | Version::V2c => {
                let msg = CommunityMessage::decode_from_sequence(&mut seq, version)?;
                Ok(Message::Community(msg))
            }
            Version::V3 => {
                let msg = V3Message::decode_from_sequence(&mut seq)?;
                Ok(Message::V3(msg))
            }
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        match self {
            Message::Community(m) => m.encode(),
            Message::V3(m) => m.encode(),
        }
    }
}

impl From<CommunityMessage> for Message {
    fn from(msg: CommunityMessage) -> Self {
        Message::Community(msg)
    }
}

impl From<V3Message> for Message {
    fn from(msg: V3Message) -> Self {
        Message::V3(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use crate::error::Error;
    use crate::format::hex::fixture;

    #[test]
    fn test_dispatch_on_version() {
        let v2c = fixture("3018 020101 0406 7075626c6963 a00b 020101 020100 020100 3000");
        let msg = Message::decode(v2c.into()).unwrap();
        assert_eq!(msg.version(), Version::V2c);
        assert!(matches!(msg, Message::Community(_)));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let data = fixture("3018 020102 0406 7075626c6963 a00b 020101 020100 020100 3000");
        let err = Message::decode(data.into()).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::UnknownVersion(2),
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let data = fixture("3018 020101 0406 7075626c6963 a00b 020101 020100 020100 3000 00");
        let err = Message::decode(data.into()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::MalformedEncoding);
    }

    #[test]
    fn test_truncated_length_field() {
        // long-form length announcing two octets, only one present
        let err = Message::decode(fixture("30 82 01").into()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::MalformedEncoding);
    }
}
