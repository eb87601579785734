//! Community-based SNMP message format (v1/v2c).
//!
//! V1 and V2c messages share the same structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Result};
use crate::pdu::RawPdu;
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    /// SNMP version (V1 or V2c)
    pub version: Version,
    /// Community string
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: RawPdu,
}

impl CommunityMessage {
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: RawPdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode_to(&mut buf);
        buf.finish()
    }

    /// Encode into a caller-supplied buffer.
    pub fn encode_to(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
    }

    /// Decode from BER.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        decoder.expect_end()?;

        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .filter(|v| v.is_community())
            .ok_or_else(|| seq.error(DecodeErrorKind::UnknownVersion(version_num)))?;

        Self::decode_from_sequence(&mut seq, version)
    }

    /// Decode from a sequence decoder where version has already been read.
    pub(crate) fn decode_from_sequence(seq: &mut Decoder, version: Version) -> Result<Self> {
        if !version.is_community() {
            return Err(seq.error(DecodeErrorKind::UnknownVersion(version.as_i32())));
        }

        let community = seq.read_octet_string()?;
        let pdu = RawPdu::decode(seq)?;
        seq.expect_end()?;

        Ok(CommunityMessage {
            version,
            community,
            pdu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use crate::oid;
    use crate::pdu::PduType;
    use crate::varbind::VarBindList;

    fn get(request_id: i32) -> RawPdu {
        RawPdu::assemble(
            PduType::GetRequest,
            request_id,
            (ErrorStatus::NoError, 0),
            (0, 0),
            VarBindList::from_oids(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]).unwrap(),
        )
    }

    #[test]
    fn test_v1_roundtrip() {
        let msg = CommunityMessage::new(Version::V1, b"public".as_slice(), get(42));

        let decoded = CommunityMessage::decode(msg.encode()).unwrap();

        assert_eq!(decoded.version, Version::V1);
        assert_eq!(decoded.community.as_ref(), b"public");
        assert_eq!(decoded.pdu.request_id, 42);
    }

    #[test]
    fn test_v2c_roundtrip() {
        let msg = CommunityMessage::new(Version::V2c, b"private".as_slice(), get(123));
        assert_eq!(CommunityMessage::decode(msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_v3_version_rejected() {
        let mut msg = CommunityMessage::new(Version::V2c, b"public".as_slice(), get(1));
        msg.version = Version::V3;
        assert!(CommunityMessage::decode(msg.encode()).is_err());
    }
}
