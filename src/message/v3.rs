//! SNMPv3 message format (RFC 3412).
//!
//! V3 messages have a more complex structure than v1/v2c:
//! ```text
//! SEQUENCE {
//!     INTEGER version (3)
//!     SEQUENCE msgGlobalData {
//!         INTEGER msgID
//!         INTEGER msgMaxSize
//!         OCTET STRING msgFlags (1 byte)
//!         INTEGER msgSecurityModel
//!     }
//!     OCTET STRING msgSecurityParameters (opaque, USM-encoded)
//!     msgData (ScopedPDU or encrypted OCTET STRING)
//! }
//! ```
//!
//! The msgData field is either:
//! - A plaintext ScopedPDU (SEQUENCE) for noAuthNoPriv/authNoPriv
//! - An encrypted OCTET STRING for authPriv (decrypts to ScopedPDU)

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Result};
use crate::pdu::RawPdu;
use crate::v3::{SecurityLevel, SecurityModel};
use crate::version::Version;

const FLAG_AUTH: u8 = 0x01;
const FLAG_PRIV: u8 = 0x02;
const FLAG_REPORTABLE: u8 = 0x04;

/// RFC 3412 HeaderData: msgMaxSize INTEGER (484..2147483647)
pub const MSG_MAX_SIZE_MINIMUM: i32 = 484;

/// Message flags (RFC 3412 Section 6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgFlags {
    /// Security level
    pub security_level: SecurityLevel,
    /// Whether a report PDU may be sent on error
    pub reportable: bool,
}

impl MsgFlags {
    pub fn new(security_level: SecurityLevel, reportable: bool) -> Self {
        Self {
            security_level,
            reportable,
        }
    }

    /// Decode from the single msgFlags byte. Privacy without
    /// authentication is invalid. Unknown high bits are ignored.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let security_level = match (byte & FLAG_AUTH != 0, byte & FLAG_PRIV != 0) {
            (false, false) => SecurityLevel::NoAuthNoPriv,
            (true, false) => SecurityLevel::AuthNoPriv,
            (true, true) => SecurityLevel::AuthPriv,
            (false, true) => return None,
        };
        Some(Self {
            security_level,
            reportable: byte & FLAG_REPORTABLE != 0,
        })
    }

    pub fn to_byte(self) -> u8 {
        let mut flags = match self.security_level {
            SecurityLevel::NoAuthNoPriv => 0,
            SecurityLevel::AuthNoPriv => FLAG_AUTH,
            SecurityLevel::AuthPriv => FLAG_AUTH | FLAG_PRIV,
        };
        if self.reportable {
            flags |= FLAG_REPORTABLE;
        }
        flags
    }
}

/// Message global data header (msgGlobalData).
#[derive(Debug, Clone, PartialEq)]
pub struct MsgGlobalData {
    /// Message identifier for request/response correlation
    pub msg_id: i32,
    /// Maximum message size the sender can accept
    pub msg_max_size: i32,
    /// Message flags (security level + reportable)
    pub msg_flags: MsgFlags,
    /// Security model (always USM)
    pub msg_security_model: SecurityModel,
}

impl MsgGlobalData {
    pub fn new(msg_id: i32, msg_max_size: i32, msg_flags: MsgFlags) -> Self {
        Self {
            msg_id,
            msg_max_size,
            msg_flags,
            msg_security_model: SecurityModel::Usm,
        }
    }

    /// Encode to buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_integer(self.msg_security_model.as_i32());
            // msgFlags is a 1-byte OCTET STRING
            buf.push_octet_string(&[self.msg_flags.to_byte()]);
            buf.push_integer(self.msg_max_size);
            buf.push_integer(self.msg_id);
        });
    }

    /// Decode from decoder.
    ///
    /// Validates that:
    /// - `msgID` is in range 0..2147483647
    /// - `msgMaxSize` is in range 484..2147483647
    /// - `msgFlags` is one byte and not priv-without-auth
    /// - `msgSecurityModel` is USM
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let msg_id = seq.read_integer()?;
        if msg_id < 0 {
            return Err(seq.error(DecodeErrorKind::InvalidMsgId(msg_id)));
        }

        let msg_max_size = seq.read_integer()?;
        if msg_max_size < MSG_MAX_SIZE_MINIMUM {
            return Err(seq.error(DecodeErrorKind::MsgMaxSizeTooSmall {
                value: msg_max_size,
                minimum: MSG_MAX_SIZE_MINIMUM,
            }));
        }

        let flags_bytes = seq.read_octet_string()?;
        let msg_flags = match flags_bytes.as_ref() {
            [byte] => MsgFlags::from_byte(*byte),
            _ => None,
        }
        .ok_or_else(|| seq.error(DecodeErrorKind::InvalidMsgFlags))?;

        let model = seq.read_integer()?;
        let msg_security_model = SecurityModel::from_i32(model)
            .ok_or_else(|| seq.error(DecodeErrorKind::UnknownSecurityModel(model)))?;
        seq.expect_end()?;

        Ok(Self {
            msg_id,
            msg_max_size,
            msg_flags,
            msg_security_model,
        })
    }
}

/// Scoped PDU (contextEngineID + contextName + PDU).
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedPdu {
    /// Context engine ID (typically same as authoritative engine ID)
    pub context_engine_id: Bytes,
    /// Context name (typically empty string)
    pub context_name: Bytes,
    /// The PDU body
    pub pdu: RawPdu,
}

impl ScopedPdu {
    pub fn new(
        context_engine_id: impl Into<Bytes>,
        context_name: impl Into<Bytes>,
        pdu: RawPdu,
    ) -> Self {
        Self {
            context_engine_id: context_engine_id.into(),
            context_name: context_name.into(),
            pdu,
        }
    }

    /// Encode to buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.context_name);
            buf.push_octet_string(&self.context_engine_id);
        });
    }

    /// Encode to bytes, as handed to the privacy transform.
    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    /// Decode from decoder.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let context_engine_id = seq.read_octet_string()?;
        let context_name = seq.read_octet_string()?;
        let pdu = RawPdu::decode(&mut seq)?;
        seq.expect_end()?;

        Ok(Self {
            context_engine_id,
            context_name,
            pdu,
        })
    }

    /// Decode a decrypted scoped PDU. Cipher padding after the SEQUENCE
    /// is ignored.
    pub fn decode_plaintext(plaintext: Bytes) -> Result<Self> {
        Self::decode(&mut Decoder::new(plaintext))
    }
}

/// SNMPv3 message.
#[derive(Debug, Clone, PartialEq)]
pub struct V3Message {
    /// Global data (header)
    pub global_data: MsgGlobalData,
    /// Security parameters (opaque, USM-encoded)
    pub security_params: Bytes,
    /// Message data - either plaintext ScopedPdu or encrypted bytes
    pub data: V3MessageData,
}

/// Message data payload.
#[derive(Debug, Clone, PartialEq)]
pub enum V3MessageData {
    /// Plaintext scoped PDU (noAuthNoPriv or authNoPriv)
    Plaintext(ScopedPdu),
    /// Encrypted scoped PDU (authPriv) - raw ciphertext
    Encrypted(Bytes),
}

impl V3MessageData {
    /// Decode msgData, which must be encrypted exactly when `level`
    /// requires privacy.
    pub fn decode(decoder: &mut Decoder, level: SecurityLevel) -> Result<Self> {
        let encrypted = level.requires_priv();
        match decoder.peek_tag() {
            Some(tag::universal::OCTET_STRING) if encrypted => {
                Ok(Self::Encrypted(decoder.read_octet_string()?))
            }
            Some(tag::universal::SEQUENCE) if !encrypted => {
                Ok(Self::Plaintext(ScopedPdu::decode(decoder)?))
            }
            Some(tag::universal::SEQUENCE) => {
                Err(decoder.error(DecodeErrorKind::ExpectedEncryption))
            }
            Some(tag::universal::OCTET_STRING) => {
                Err(decoder.error(DecodeErrorKind::UnexpectedEncryption))
            }
            Some(actual) => {
                let expected = if encrypted {
                    tag::universal::OCTET_STRING
                } else {
                    tag::universal::SEQUENCE
                };
                Err(decoder.error(DecodeErrorKind::UnexpectedTag { expected, actual }))
            }
            None => Err(decoder.error(DecodeErrorKind::TruncatedData)),
        }
    }
}

impl V3Message {
    pub fn new(global_data: MsgGlobalData, security_params: Bytes, data: V3MessageData) -> Self {
        Self {
            global_data,
            security_params,
            data,
        }
    }

    /// Get the scoped PDU if available (plaintext only).
    pub fn scoped_pdu(&self) -> Option<&ScopedPdu> {
        match &self.data {
            V3MessageData::Plaintext(pdu) => Some(pdu),
            V3MessageData::Encrypted(_) => None,
        }
    }

    pub fn msg_id(&self) -> i32 {
        self.global_data.msg_id
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.global_data.msg_flags.security_level
    }

    /// Encode to BER.
    ///
    /// For authenticated messages the auth params inside `security_params`
    /// must be a zero placeholder; the MAC is written over it afterwards.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode_to(&mut buf);
        buf.finish()
    }

    /// Encode into a caller-supplied buffer.
    pub fn encode_to(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            match &self.data {
                V3MessageData::Plaintext(scoped_pdu) => scoped_pdu.encode(buf),
                V3MessageData::Encrypted(ciphertext) => buf.push_octet_string(ciphertext),
            }
            buf.push_octet_string(&self.security_params);
            self.global_data.encode(buf);
            buf.push_integer(Version::V3.as_i32());
        });
    }

    /// Decode from BER.
    ///
    /// For encrypted messages, returns `V3MessageData::Encrypted` with the
    /// raw ciphertext; USM decrypts it.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        decoder.expect_end()?;

        let version = seq.read_integer()?;
        if version != Version::V3.as_i32() {
            return Err(seq.error(DecodeErrorKind::UnknownVersion(version)));
        }

        Self::decode_from_sequence(&mut seq)
    }

    /// Decode from a sequence decoder where version has already been read.
    pub(crate) fn decode_from_sequence(seq: &mut Decoder) -> Result<Self> {
        let global_data = MsgGlobalData::decode(seq)?;
        let security_params = seq.read_octet_string()?;

        let data = V3MessageData::decode(seq, global_data.msg_flags.security_level)?;
        seq.expect_end()?;

        Ok(Self {
            global_data,
            security_params,
            data,
        })
    }
}
