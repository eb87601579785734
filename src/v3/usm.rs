//! User-based Security Model (USM) parameters (RFC 3414).
//!
//! USM security parameters are encoded as an OCTET STRING containing
//! a BER-encoded SEQUENCE:
//!
//! ```text
//! UsmSecurityParameters ::= SEQUENCE {
//!     msgAuthoritativeEngineID     OCTET STRING,
//!     msgAuthoritativeEngineBoots  INTEGER (0..2147483647),
//!     msgAuthoritativeEngineTime   INTEGER (0..2147483647),
//!     msgUserName                  OCTET STRING (SIZE(0..32)),
//!     msgAuthenticationParameters  OCTET STRING,
//!     msgPrivacyParameters         OCTET STRING
//! }
//! ```

use bytes::Bytes;

use super::engine::MAX_ENGINE_ID_LEN;
use super::security::MAX_USER_NAME_LEN;
use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};

/// USM security parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsmSecurityParams {
    /// Authoritative engine ID
    pub engine_id: Bytes,
    /// Engine boot count
    pub engine_boots: u32,
    /// Engine time (seconds since last boot)
    pub engine_time: u32,
    /// Username
    pub username: Bytes,
    /// Authentication parameters (HMAC digest, or empty)
    pub auth_params: Bytes,
    /// Privacy parameters (salt/IV, or empty)
    pub priv_params: Bytes,
}

impl UsmSecurityParams {
    pub fn new(
        engine_id: impl Into<Bytes>,
        engine_boots: u32,
        engine_time: u32,
        username: impl Into<Bytes>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            engine_boots,
            engine_time,
            username: username.into(),
            auth_params: Bytes::new(),
            priv_params: Bytes::new(),
        }
    }

    /// Empty parameters, as sent by a discovery request.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_priv_params(mut self, priv_params: impl Into<Bytes>) -> Self {
        self.priv_params = priv_params.into();
        self
    }

    /// Zero-filled auth params; the MAC is written over them once the
    /// whole message is encoded.
    pub fn with_auth_placeholder(mut self, mac_len: usize) -> Self {
        self.auth_params = Bytes::from(vec![0u8; mac_len]);
        self
    }

    /// Encode to BER bytes.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode_to_buf(&mut buf);
        buf.finish()
    }

    pub fn encode_to_buf(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_octet_string(&self.priv_params);
            buf.push_octet_string(&self.auth_params);
            buf.push_octet_string(&self.username);
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_time);
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_boots);
            buf.push_octet_string(&self.engine_id);
        });
    }

    /// Decode the contents of msgSecurityParameters.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let params = Self::decode_from(&mut decoder)?;
        decoder.expect_end()?;
        Ok(params)
    }

    pub fn decode_from(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;

        let engine_id = seq.read_octet_string()?;
        if engine_id.len() > MAX_ENGINE_ID_LEN {
            return Err(Error::field_too_large(
                "engine id",
                engine_id.len(),
                MAX_ENGINE_ID_LEN,
            ));
        }

        let raw_boots = seq.read_integer()?;
        if raw_boots < 0 {
            return Err(seq.error(DecodeErrorKind::InvalidEngineBoots(raw_boots)));
        }

        let raw_time = seq.read_integer()?;
        if raw_time < 0 {
            return Err(seq.error(DecodeErrorKind::InvalidEngineTime(raw_time)));
        }

        let username = seq.read_octet_string()?;
        if username.len() > MAX_USER_NAME_LEN {
            return Err(Error::field_too_large(
                "user name",
                username.len(),
                MAX_USER_NAME_LEN,
            ));
        }
        let auth_params = seq.read_octet_string()?;
        let priv_params = seq.read_octet_string()?;
        seq.expect_end()?;

        Ok(Self {
            engine_id,
            engine_boots: raw_boots as u32,
            engine_time: raw_time as u32,
            username,
            auth_params,
            priv_params,
        })
    }

    /// Locate msgAuthenticationParameters inside a whole encoded v3 message.
    ///
    /// Returns the absolute offset of the field's content and its length.
    pub fn find_auth_params_offset(encoded_msg: &[u8]) -> Option<(usize, usize)> {
        let mut outer = Decoder::from_slice(encoded_msg);
        let mut msg = outer.read_sequence().ok()?;
        msg.read_integer().ok()?; // msgVersion
        msg.skip_tlv().ok()?; // msgGlobalData
        let len = msg.expect_tag(tag::universal::OCTET_STRING).ok()?;
        let mut usm = msg.sub_decoder(len).ok()?.read_sequence().ok()?;
        for _ in 0..4 {
            usm.skip_tlv().ok()?; // engine id, boots, time, user name
        }
        let auth_len = usm.expect_tag(tag::universal::OCTET_STRING).ok()?;
        let start = usm.absolute_offset();
        (start + auth_len <= encoded_msg.len()).then_some((start, auth_len))
    }
}
