//! SNMP Protocol Data Units (PDUs).
//!
//! [`RawPdu`] is the tagged body exactly as it appears on the wire.
//! [`V2cPdu`] and [`V3Pdu`] are the typed, version-specific views built on
//! top of it, and [`Pdu`] is the sum of the two.

mod v2c;
mod v3;

pub use v2c::{MAX_COMMUNITY_LEN, V2cPdu};
pub use v3::{MAX_CONTEXT_NAME_LEN, V3Pdu};

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{Error, ErrorStatus, Result};
use crate::varbind::VarBindList;
use crate::version::Version;

/// PDU type tag.
///
/// The SNMPv1 Trap PDU (0xA4) has a different body layout and is not
/// supported; decoding it fails with `UnsupportedOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    Response = 0xA2,
    SetRequest = 0xA3,
    GetBulkRequest = 0xA5,
    InformRequest = 0xA6,
    TrapV2 = 0xA7,
    Report = 0xA8,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xA0 => Some(Self::GetRequest),
            0xA1 => Some(Self::GetNextRequest),
            0xA2 => Some(Self::Response),
            0xA3 => Some(Self::SetRequest),
            0xA5 => Some(Self::GetBulkRequest),
            0xA6 => Some(Self::InformRequest),
            0xA7 => Some(Self::TrapV2),
            0xA8 => Some(Self::Report),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn is_get_bulk(self) -> bool {
        self == Self::GetBulkRequest
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
            Self::InformRequest => write!(f, "InformRequest"),
            Self::TrapV2 => write!(f, "Trap"),
            Self::Report => write!(f, "Report"),
        }
    }
}

/// PDU body as carried on the wire.
///
/// For GetBulk the two middle integers hold non-repeaters and
/// max-repetitions instead of error-status and error-index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    pub error_status: i32,
    pub error_index: i32,
    pub varbinds: VarBindList,
}

impl RawPdu {
    /// Lay out the header fields for `pdu_type`, dropping the pair that
    /// does not apply to it.
    pub(crate) fn assemble(
        pdu_type: PduType,
        request_id: i32,
        error: (ErrorStatus, i32),
        bulk: (i32, i32),
        varbinds: VarBindList,
    ) -> Self {
        let (error_status, error_index) = if pdu_type.is_get_bulk() {
            bulk
        } else {
            (error.0.as_i32(), error.1)
        };
        Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        }
    }

    /// Error status and index; zero for GetBulk.
    pub fn error_fields(&self) -> (ErrorStatus, i32) {
        if self.pdu_type.is_get_bulk() {
            (ErrorStatus::NoError, 0)
        } else {
            (ErrorStatus::from_i32(self.error_status), self.error_index)
        }
    }

    /// Non-repeaters and max-repetitions; zero unless GetBulk.
    pub fn bulk_fields(&self) -> (i32, i32) {
        if self.pdu_type.is_get_bulk() {
            (self.error_status, self.error_index)
        } else {
            (0, 0)
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            self.varbinds.encode(buf);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag = decoder.peek_tag().ok_or_else(|| {
            decoder.error(crate::error::DecodeErrorKind::TruncatedData)
        })?;
        let Some(pdu_type) = PduType::from_tag(tag) else {
            tracing::debug!(target: "snmp_wire::ber", { snmp.offset = %decoder.absolute_offset(), tag }, "unsupported PDU type");
            return Err(Error::UnsupportedOperation { tag });
        };

        let mut body = decoder.read_constructed(tag)?;
        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = VarBindList::decode(&mut body)?;
        body.expect_end()?;

        Ok(Self {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

/// A PDU of either protocol family.
#[derive(Debug, Clone)]
pub enum Pdu {
    /// SNMPv1/v2c, community based
    V2c(V2cPdu),
    /// SNMPv3, USM secured
    V3(V3Pdu),
}

impl Pdu {
    pub fn version(&self) -> Version {
        match self {
            Self::V2c(pdu) => pdu.version(),
            Self::V3(_) => Version::V3,
        }
    }

    pub fn request_id(&self) -> i32 {
        match self {
            Self::V2c(pdu) => pdu.request_id(),
            Self::V3(pdu) => pdu.request_id(),
        }
    }

    pub fn set_request_id(&mut self, request_id: i32) {
        match self {
            Self::V2c(pdu) => pdu.set_request_id(request_id),
            Self::V3(pdu) => pdu.set_request_id(request_id),
        }
    }

    pub fn op(&self) -> PduType {
        match self {
            Self::V2c(pdu) => pdu.op(),
            Self::V3(pdu) => pdu.op(),
        }
    }

    pub fn set_op(&mut self, op: PduType) {
        match self {
            Self::V2c(pdu) => pdu.set_op(op),
            Self::V3(pdu) => pdu.set_op(op),
        }
    }

    pub fn error_status(&self) -> ErrorStatus {
        match self {
            Self::V2c(pdu) => pdu.error_status(),
            Self::V3(pdu) => pdu.error_status(),
        }
    }

    pub fn set_error_status(&mut self, status: ErrorStatus) {
        match self {
            Self::V2c(pdu) => pdu.set_error_status(status),
            Self::V3(pdu) => pdu.set_error_status(status),
        }
    }

    pub fn error_index(&self) -> i32 {
        match self {
            Self::V2c(pdu) => pdu.error_index(),
            Self::V3(pdu) => pdu.error_index(),
        }
    }

    pub fn varbinds(&self) -> &VarBindList {
        match self {
            Self::V2c(pdu) => pdu.varbinds(),
            Self::V3(pdu) => pdu.varbinds(),
        }
    }

    pub fn varbinds_mut(&mut self) -> &mut VarBindList {
        match self {
            Self::V2c(pdu) => pdu.varbinds_mut(),
            Self::V3(pdu) => pdu.varbinds_mut(),
        }
    }

    pub fn max_msg_size(&self) -> u32 {
        match self {
            Self::V2c(pdu) => pdu.max_msg_size(),
            Self::V3(pdu) => pdu.max_msg_size(),
        }
    }

    pub fn as_v2c(&self) -> Option<&V2cPdu> {
        match self {
            Self::V2c(pdu) => Some(pdu),
            Self::V3(_) => None,
        }
    }

    pub fn as_v3(&self) -> Option<&V3Pdu> {
        match self {
            Self::V3(pdu) => Some(pdu),
            Self::V2c(_) => None,
        }
    }
}

impl From<V2cPdu> for Pdu {
    fn from(pdu: V2cPdu) -> Self {
        Self::V2c(pdu)
    }
}

impl From<V3Pdu> for Pdu {
    fn from(pdu: V3Pdu) -> Self {
        Self::V3(pdu)
    }
}

impl std::fmt::Display for Pdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V2c(pdu) => pdu.fmt(f),
            Self::V3(pdu) => pdu.fmt(f),
        }
    }
}

/// Shared tail of the diagnostic string: error status and the GetBulk pair.
fn fmt_status_tail(
    f: &mut std::fmt::Formatter<'_>,
    op: PduType,
    error_status: ErrorStatus,
    bulk: (i32, i32),
) -> std::fmt::Result {
    write!(f, " and error_status='{}", error_status.as_i32())?;
    if op.is_get_bulk() {
        write!(
            f,
            "' and max_repetitions='{}' and non_repeaters='{}",
            bulk.1, bulk.0
        )?;
    }
    f.write_str("'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use crate::format::hex::fixture;
    use crate::oid;
    use crate::varbind::VarBind;
    use bytes::Bytes;

    fn body(pdu_type: PduType) -> RawPdu {
        let varbinds = VarBindList::from_oids(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]).unwrap();
        RawPdu::assemble(
            pdu_type,
            42,
            (ErrorStatus::NoSuchName, 1),
            (2, 10),
            varbinds,
        )
    }

    fn roundtrip(pdu: &RawPdu) -> RawPdu {
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        RawPdu::decode(&mut Decoder::new(buf.finish())).unwrap()
    }

    #[test]
    fn test_pdu_type_tags() {
        for tag in 0xA0..=0xA8u8 {
            match PduType::from_tag(tag) {
                Some(t) => assert_eq!(t.tag(), tag),
                None => assert_eq!(tag, 0xA4),
            }
        }
        assert_eq!(PduType::from_tag(0x30), None);
    }

    #[test]
    fn test_raw_pdu_slots() {
        let get = body(PduType::GetRequest);
        assert_eq!((get.error_status, get.error_index), (2, 1));
        assert_eq!(get.bulk_fields(), (0, 0));

        let bulk = body(PduType::GetBulkRequest);
        assert_eq!((bulk.error_status, bulk.error_index), (2, 10));
        assert_eq!(bulk.error_fields(), (ErrorStatus::NoError, 0));
        assert_eq!(roundtrip(&bulk).bulk_fields(), (2, 10));
    }

    #[test]
    fn test_raw_pdu_roundtrip() {
        let mut pdu = body(PduType::SetRequest);
        pdu.varbinds.clear();
        pdu.varbinds
            .push(VarBind::new(
                oid!(1, 3, 6, 1),
                crate::Value::OctetString(Bytes::from_static(b"x")),
            ))
            .unwrap();
        assert_eq!(roundtrip(&pdu), pdu);
    }

    #[test]
    fn test_raw_pdu_fixed_encoding() {
        let pdu = RawPdu::assemble(
            PduType::GetRequest,
            1,
            (ErrorStatus::NoError, 0),
            (0, 0),
            VarBindList::from_oids(&[oid!(1, 3, 6, 1)]).unwrap(),
        );
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        assert_eq!(
            buf.finish(),
            Bytes::from(fixture("a0 13 020101 020100 020100 3008 3006 06022b06 0500"))
        );
    }

    #[test]
    fn test_trap_v1_unsupported() {
        let data = fixture("a4 0b 020101 020100 020100 3000");
        let err = RawPdu::decode(&mut Decoder::from_slice(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { tag: 0xA4 }));
        assert_eq!(err.class(), ErrorClass::UnsupportedOperation);
    }

    #[test]
    fn test_unknown_tag_unsupported() {
        let data = fixture("a9 00");
        let err = RawPdu::decode(&mut Decoder::from_slice(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { tag: 0xA9 }));
    }

    #[test]
    fn test_truncated_body() {
        let data = fixture("a0 13 020101 0201");
        let err = RawPdu::decode(&mut Decoder::from_slice(&data)).unwrap_err();
        assert_eq!(err.class(), ErrorClass::MalformedEncoding);
    }
}
