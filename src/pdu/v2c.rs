//! Community-based PDU (SNMPv1 and SNMPv2c).

use bytes::Bytes;

use super::{PduType, RawPdu, fmt_status_tail};
use crate::error::{EncodeErrorKind, Error, ErrorStatus, Result};
use crate::message::CommunityMessage;
use crate::v3::DEFAULT_MSG_MAX_SIZE;
use crate::varbind::VarBindList;
use crate::version::Version;

/// Maximum community string length in bytes.
pub const MAX_COMMUNITY_LEN: usize = 128;

/// A v1/v2c PDU together with its community envelope fields.
///
/// ```
/// use snmp_wire::pdu::{PduType, V2cPdu};
///
/// let mut pdu = V2cPdu::new(PduType::GetBulkRequest, "public").unwrap();
/// pdu.set_request_id(7);
/// pdu.set_non_repeaters(2);
/// pdu.set_max_repetitions(10);
/// assert_eq!(pdu.community().as_ref(), b"public");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct V2cPdu {
    version: Version,
    op: PduType,
    request_id: i32,
    community: Bytes,
    max_msg_size: u32,
    error_status: ErrorStatus,
    error_index: i32,
    non_repeaters: i32,
    max_repetitions: i32,
    varbinds: VarBindList,
}

impl V2cPdu {
    /// Create an SNMPv2c PDU.
    ///
    /// Fails with `FieldTooLarge` if the community exceeds 128 bytes.
    pub fn new(op: PduType, community: impl Into<Bytes>) -> Result<Self> {
        let community = community.into();
        check_community(&community)?;
        Ok(Self {
            version: Version::V2c,
            op,
            request_id: 0,
            community,
            max_msg_size: DEFAULT_MSG_MAX_SIZE,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds: VarBindList::new(),
        })
    }

    /// Build from a decoded community message.
    pub fn from_message(msg: CommunityMessage) -> Result<Self> {
        check_community(&msg.community)?;
        let (error_status, error_index) = msg.pdu.error_fields();
        let (non_repeaters, max_repetitions) = msg.pdu.bulk_fields();
        Ok(Self {
            version: msg.version,
            op: msg.pdu.pdu_type,
            request_id: msg.pdu.request_id,
            community: msg.community,
            max_msg_size: DEFAULT_MSG_MAX_SIZE,
            error_status,
            error_index,
            non_repeaters,
            max_repetitions,
            varbinds: msg.pdu.varbinds,
        })
    }

    /// Build the wire envelope for this PDU.
    ///
    /// GetBulk does not exist in SNMPv1 and fails with `VersionMismatch`.
    pub fn to_message(&self) -> Result<CommunityMessage> {
        if self.version == Version::V1 && self.op.is_get_bulk() {
            return Err(Error::encode(EncodeErrorKind::VersionMismatch));
        }
        let pdu = RawPdu::assemble(
            self.op,
            self.request_id,
            (self.error_status, self.error_index),
            (self.non_repeaters, self.max_repetitions),
            self.varbinds.clone(),
        );
        Ok(CommunityMessage::new(self.version, self.community.clone(), pdu))
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Switch between v1 and v2c. A community PDU cannot become v3.
    pub fn set_version(&mut self, version: Version) -> Result<()> {
        if !version.is_community() {
            return Err(Error::config(format!(
                "version '{}' cannot carry a community PDU",
                version
            )));
        }
        self.version = version;
        Ok(())
    }

    pub fn op(&self) -> PduType {
        self.op
    }

    pub fn set_op(&mut self, op: PduType) {
        self.op = op;
    }

    pub fn request_id(&self) -> i32 {
        self.request_id
    }

    pub fn set_request_id(&mut self, request_id: i32) {
        self.request_id = request_id;
    }

    pub fn community(&self) -> &Bytes {
        &self.community
    }

    pub fn set_community(&mut self, community: impl Into<Bytes>) -> Result<()> {
        let community = community.into();
        check_community(&community)?;
        self.community = community;
        Ok(())
    }

    /// Largest message this side is willing to send or receive.
    pub fn max_msg_size(&self) -> u32 {
        self.max_msg_size
    }

    pub fn set_max_msg_size(&mut self, size: u32) {
        self.max_msg_size = size;
    }

    pub fn error_status(&self) -> ErrorStatus {
        self.error_status
    }

    pub fn set_error_status(&mut self, status: ErrorStatus) {
        self.error_status = status;
    }

    pub fn error_index(&self) -> i32 {
        self.error_index
    }

    pub fn set_error_index(&mut self, index: i32) {
        self.error_index = index;
    }

    /// Only serialized for GetBulk.
    pub fn non_repeaters(&self) -> i32 {
        self.non_repeaters
    }

    pub fn set_non_repeaters(&mut self, n: i32) {
        self.non_repeaters = n;
    }

    /// Only serialized for GetBulk.
    pub fn max_repetitions(&self) -> i32 {
        self.max_repetitions
    }

    pub fn set_max_repetitions(&mut self, n: i32) {
        self.max_repetitions = n;
    }

    pub fn varbinds(&self) -> &VarBindList {
        &self.varbinds
    }

    pub fn varbinds_mut(&mut self) -> &mut VarBindList {
        &mut self.varbinds
    }

    pub fn set_varbinds(&mut self, varbinds: VarBindList) {
        self.varbinds = varbinds;
    }
}

impl std::fmt::Display for V2cPdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} variableBindings{} with community = '{}' and requestId='{}' and version='{}'",
            self.op,
            self.varbinds,
            String::from_utf8_lossy(&self.community),
            self.request_id,
            self.version
        )?;
        fmt_status_tail(
            f,
            self.op,
            self.error_status,
            (self.non_repeaters, self.max_repetitions),
        )
    }
}

fn check_community(community: &[u8]) -> Result<()> {
    if community.len() > MAX_COMMUNITY_LEN {
        return Err(Error::field_too_large(
            "community",
            community.len(),
            MAX_COMMUNITY_LEN,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use crate::oid;

    #[test]
    fn test_community_bound() {
        assert!(V2cPdu::new(PduType::GetRequest, vec![b'c'; 128]).is_ok());
        let err = V2cPdu::new(PduType::GetRequest, vec![b'c'; 129]).unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);

        let mut pdu = V2cPdu::new(PduType::GetRequest, "public").unwrap();
        assert!(pdu.set_community(vec![b'c'; 129]).is_err());
        assert_eq!(pdu.community().as_ref(), b"public");
    }

    #[test]
    fn test_set_version() {
        let mut pdu = V2cPdu::new(PduType::GetRequest, "public").unwrap();
        pdu.set_version(Version::V1).unwrap();
        assert_eq!(pdu.version(), Version::V1);
        let err = pdu.set_version(Version::V3).unwrap_err();
        assert_eq!(err.class(), ErrorClass::ConfigurationInvalid);
        assert_eq!(pdu.version(), Version::V1);
    }

    #[test]
    fn test_get_bulk_in_v1_rejected() {
        let mut pdu = V2cPdu::new(PduType::GetBulkRequest, "public").unwrap();
        pdu.set_version(Version::V1).unwrap();
        assert!(pdu.to_message().is_err());
    }

    #[test]
    fn test_message_roundtrip_keeps_bulk_fields() {
        let mut pdu = V2cPdu::new(PduType::GetBulkRequest, "public").unwrap();
        pdu.set_request_id(99);
        pdu.set_non_repeaters(2);
        pdu.set_max_repetitions(10);
        pdu.set_varbinds(VarBindList::from_oids(&[oid!(1, 3, 6, 1, 2, 1, 2)]).unwrap());

        let msg = pdu.to_message().unwrap();
        assert_eq!((msg.pdu.error_status, msg.pdu.error_index), (2, 10));

        let back = V2cPdu::from_message(CommunityMessage::decode(msg.encode()).unwrap()).unwrap();
        assert_eq!(back, pdu);
    }

    #[test]
    fn test_non_bulk_ignores_bulk_fields() {
        let mut pdu = V2cPdu::new(PduType::GetRequest, "public").unwrap();
        pdu.set_non_repeaters(2);
        pdu.set_max_repetitions(10);
        let msg = pdu.to_message().unwrap();
        assert_eq!((msg.pdu.error_status, msg.pdu.error_index), (0, 0));
    }

    #[test]
    fn test_display() {
        let mut pdu = V2cPdu::new(PduType::GetRequest, "public").unwrap();
        pdu.set_request_id(5);
        pdu.set_varbinds(VarBindList::from_oids(&[oid!(1, 3, 6, 1)]).unwrap());
        assert_eq!(
            pdu.to_string(),
            "GetRequest variableBindings[1.3.6.1=NULL] with community = 'public' and \
             requestId='5' and version='v2c' and error_status='0'"
        );

        pdu.set_op(PduType::GetBulkRequest);
        pdu.set_non_repeaters(2);
        pdu.set_max_repetitions(10);
        assert!(
            pdu.to_string()
                .ends_with("error_status='0' and max_repetitions='10' and non_repeaters='2'")
        );
    }
}
