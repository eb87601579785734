//! USM-secured PDU (SNMPv3).

use std::sync::Arc;

use bytes::Bytes;

use super::{PduType, RawPdu, fmt_status_tail};
use crate::error::{Error, ErrorStatus, Result};
use crate::format::hex;
use crate::v3::{
    DEFAULT_MSG_MAX_SIZE, EngineRecord, MAX_ENGINE_ID_LEN, ReportKind, SecurityLevel,
    SecurityParameters,
};
use crate::varbind::VarBindList;
use crate::version::Version;

/// Maximum context name length in bytes.
pub const MAX_CONTEXT_NAME_LEN: usize = 32;

/// Identifier value meaning "use the request id as msgID".
const UNSET_IDENTIFIER: i32 = -1;

/// A v3 PDU with its scoped-PDU context and security references.
///
/// The credentials are shared: many PDUs for the same user point at one
/// [`SecurityParameters`].
#[derive(Debug, Clone)]
pub struct V3Pdu {
    op: PduType,
    request_id: i32,
    identifier: i32,
    max_msg_size: u32,
    context_name: Bytes,
    context_engine: Option<Bytes>,
    security: Arc<SecurityParameters>,
    engine: Option<EngineRecord>,
    reportable: bool,
    error_status: ErrorStatus,
    error_index: i32,
    non_repeaters: i32,
    max_repetitions: i32,
    varbinds: VarBindList,
}

impl V3Pdu {
    /// Create a PDU for the given credentials. Requests are reportable.
    pub fn new(op: PduType, security: Arc<SecurityParameters>) -> Self {
        Self {
            op,
            request_id: 0,
            identifier: UNSET_IDENTIFIER,
            max_msg_size: DEFAULT_MSG_MAX_SIZE,
            context_name: Bytes::new(),
            context_engine: None,
            security,
            engine: None,
            reportable: is_confirmed(op),
            error_status: ErrorStatus::NoError,
            error_index: 0,
            non_repeaters: 0,
            max_repetitions: 0,
            varbinds: VarBindList::new(),
        }
    }

    /// The engine discovery request: an empty, reportable, noAuthNoPriv
    /// GetRequest with empty engine id and user name.
    pub fn discovery(request_id: i32) -> Result<Self> {
        let mut pdu = Self::new(
            PduType::GetRequest,
            Arc::new(SecurityParameters::discovery()?),
        );
        pdu.set_request_id(request_id);
        Ok(pdu)
    }

    /// Build from the decoded scoped PDU and header fields.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        pdu: RawPdu,
        msg_id: i32,
        max_msg_size: u32,
        reportable: bool,
        context_engine: Bytes,
        context_name: Bytes,
        security: Arc<SecurityParameters>,
        engine: Option<EngineRecord>,
    ) -> Result<Self> {
        check_bound("context name", &context_name, MAX_CONTEXT_NAME_LEN)?;
        check_bound("context engine", &context_engine, MAX_ENGINE_ID_LEN)?;
        let (error_status, error_index) = pdu.error_fields();
        let (non_repeaters, max_repetitions) = pdu.bulk_fields();
        Ok(Self {
            op: pdu.pdu_type,
            request_id: pdu.request_id,
            identifier: msg_id,
            max_msg_size,
            context_name,
            context_engine: (!context_engine.is_empty()).then_some(context_engine),
            security,
            engine,
            reportable,
            error_status,
            error_index,
            non_repeaters,
            max_repetitions,
            varbinds: pdu.varbinds,
        })
    }

    /// Wire body of this PDU.
    pub(crate) fn raw(&self) -> RawPdu {
        RawPdu::assemble(
            self.op,
            self.request_id,
            (self.error_status, self.error_index),
            (self.non_repeaters, self.max_repetitions),
            self.varbinds.clone(),
        )
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

    /// Set the request id. The message identifier follows it.
    pub fn set_request_id(&mut self, request_id: i32) {
        self.request_id = request_id;
        self.identifier = request_id;
    }

    /// The raw identifier; -1 when unset.
    pub fn identifier(&self) -> i32 {
        self.identifier
    }

    pub fn set_identifier(&mut self, identifier: i32) {
        self.identifier = identifier;
    }

    /// msgID as it goes on the wire.
    pub fn msg_id(&self) -> i32 {
        if self.identifier == UNSET_IDENTIFIER {
            self.request_id
        } else {
            self.identifier
        }
    }

    pub fn max_msg_size(&self) -> u32 {
        self.max_msg_size
    }

    pub fn set_max_msg_size(&mut self, size: u32) {
        self.max_msg_size = size;
    }

    pub fn context_name(&self) -> &Bytes {
        &self.context_name
    }

    pub fn set_context_name(&mut self, name: impl Into<Bytes>) -> Result<()> {
        let name = name.into();
        check_bound("context name", &name, MAX_CONTEXT_NAME_LEN)?;
        self.context_name = name;
        Ok(())
    }

    pub fn context_engine(&self) -> Option<&Bytes> {
        self.context_engine.as_ref()
    }

    pub fn set_context_engine(&mut self, engine_id: Option<Bytes>) -> Result<()> {
        if let Some(id) = &engine_id {
            check_bound("context engine", id, MAX_ENGINE_ID_LEN)?;
        }
        self.context_engine = engine_id;
        Ok(())
    }

    pub fn security(&self) -> &Arc<SecurityParameters> {
        &self.security
    }

    pub fn level(&self) -> SecurityLevel {
        self.security.level()
    }

    /// The authoritative engine this PDU is addressed to or came from.
    pub fn engine(&self) -> Option<&EngineRecord> {
        self.engine.as_ref()
    }

    pub fn set_engine(&mut self, engine: Option<EngineRecord>) {
        self.engine = engine;
    }

    pub fn reportable(&self) -> bool {
        self.reportable
    }

    pub fn set_reportable(&mut self, reportable: bool) {
        self.reportable = reportable;
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

    pub fn non_repeaters(&self) -> i32 {
        self.non_repeaters
    }

    pub fn set_non_repeaters(&mut self, n: i32) {
        self.non_repeaters = n;
    }

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

    pub fn version(&self) -> Version {
        Version::V3
    }

    /// Which usmStats counter a Report carries, if any.
    pub fn report_kind(&self) -> Option<ReportKind> {
        (self.op == PduType::Report)
            .then(|| ReportKind::classify(&self.varbinds))
            .flatten()
    }
}

impl std::fmt::Display for V3Pdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} variableBindings{} with {} and contextName='{}' and contextEngine=",
            self.op,
            self.varbinds,
            self.security,
            String::from_utf8_lossy(&self.context_name)
        )?;
        match &self.context_engine {
            Some(id) => write!(f, "'{}'", hex::Bytes(id))?,
            None => f.write_str("nil")?,
        }
        write!(
            f,
            " and requestId='{}' and identifier='{}' and version='{}'",
            self.request_id,
            self.identifier,
            Version::V3
        )?;
        fmt_status_tail(
            f,
            self.op,
            self.error_status,
            (self.non_repeaters, self.max_repetitions),
        )
    }
}

/// Confirmed-class PDUs expect a response and so allow reports.
fn is_confirmed(op: PduType) -> bool {
    !matches!(op, PduType::Response | PduType::TrapV2 | PduType::Report)
}

fn check_bound(field: &'static str, value: &[u8], max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::field_too_large(field, value.len(), max));
    }
    Ok(())
}
