//! Configuration.
//!
//! [`PduConfig`] turns the request builder's string parameter map into
//! typed PDU settings. [`CodecConfig`] holds codec-wide knobs.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::format::hex;
use crate::pdu::{Pdu, PduType, V2cPdu, V3Pdu};
use crate::v3::{
    AuthProtocol, DEFAULT_MSG_MAX_SIZE, EngineRecord, PrivProtocol, SecurityModel,
    SecurityParameters,
};
use crate::version::Version;

/// Parameter map keys.
pub mod keys {
    pub const VERSION: &str = "snmp.version";
    pub const MAX_MSG_SIZE: &str = "snmp.max_msg_size";
    pub const MAX_REPETITIONS: &str = "snmp.max_repetitions";
    pub const NON_REPEATERS: &str = "snmp.non_repeaters";
    pub const COMMUNITY: &str = "snmp.community";
    pub const CONTEXT_NAME: &str = "snmp.context_name";
    pub const CONTEXT_ENGINE: &str = "snmp.context_engine";
    pub const IDENTIFIER: &str = "snmp.identifier";
    pub const ENGINE_ID: &str = "snmp.engine_id";
    pub const ENGINE_BOOTS: &str = "snmp.engine_boots";
    pub const ENGINE_TIME: &str = "snmp.engine_time";
    pub const SECMODEL: &str = "snmp.secmodel";
    pub const SECNAME: &str = "snmp.secname";
    pub const AUTH_PASS: &str = "snmp.auth_pass";
    pub const PRIV_PASS: &str = "snmp.priv_pass";
}

/// Typed PDU settings from the collaborator's parameter map.
///
/// ```
/// use std::collections::HashMap;
/// use snmp_wire::config::PduConfig;
/// use snmp_wire::pdu::PduType;
///
/// let params = HashMap::from([
///     ("snmp.version".to_string(), "v2c".to_string()),
///     ("snmp.community".to_string(), "public".to_string()),
///     ("snmp.max_repetitions".to_string(), "10".to_string()),
/// ]);
/// let config = PduConfig::from_map(&params).unwrap();
/// let pdu = config.build(PduType::GetBulkRequest).unwrap();
/// assert_eq!(pdu.as_v2c().unwrap().max_repetitions(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct PduConfig {
    pub version: Version,
    pub max_msg_size: u32,
    pub max_repetitions: i32,
    pub non_repeaters: i32,
    /// v1/v2c only
    pub community: Option<Bytes>,
    pub context_name: Option<Bytes>,
    pub context_engine: Option<Bytes>,
    /// -1 when unset
    pub identifier: i32,
    pub engine: Option<EngineRecord>,
    pub security: Option<Arc<SecurityParameters>>,
}

impl Default for PduConfig {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            max_msg_size: DEFAULT_MSG_MAX_SIZE,
            max_repetitions: 0,
            non_repeaters: 0,
            community: None,
            context_name: None,
            context_engine: None,
            identifier: -1,
            engine: None,
            security: None,
        }
    }
}

impl PduConfig {
    /// Parse the parameter map.
    ///
    /// Unparseable sizes and repetition counts keep their defaults. A
    /// missing community, bad hex, or an unparseable identifier or engine
    /// field is a `Config` error naming the key.
    pub fn from_map(params: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| params.get(key).map(String::as_str);
        let mut config = Self::default();

        if let Some(v) = get(keys::VERSION) {
            config.version = v.parse()?;
        }
        if let Some(n) = get(keys::MAX_MSG_SIZE).and_then(|v| v.trim().parse().ok()) {
            config.max_msg_size = n;
        }
        if let Some(n) = get(keys::MAX_REPETITIONS).and_then(|v| v.trim().parse().ok()) {
            config.max_repetitions = n;
        }
        if let Some(n) = get(keys::NON_REPEATERS).and_then(|v| v.trim().parse().ok()) {
            config.non_repeaters = n;
        }

        if config.version.is_community() {
            match get(keys::COMMUNITY) {
                Some(c) if !c.is_empty() => {
                    config.community = Some(Bytes::copy_from_slice(c.as_bytes()))
                }
                _ => return Err(Error::config("community is empty.")),
            }
            tracing::trace!(target: "snmp_wire::config", version = %config.version, "community config parsed");
            return Ok(config);
        }

        if let Some(name) = get(keys::CONTEXT_NAME) {
            config.context_name = Some(Bytes::copy_from_slice(name.as_bytes()));
            if let Some(engine) = get(keys::CONTEXT_ENGINE) {
                config.context_engine = Some(decode_hex("context_engine", engine)?);
            }
        }

        if let Some(id) = get(keys::IDENTIFIER) {
            config.identifier = parse_field("identifier", id)?;
        }

        if let Some(id) = get(keys::ENGINE_ID) {
            let engine_id = decode_hex("engine_id", id)?;
            let boots = match get(keys::ENGINE_BOOTS) {
                Some(value) => parse_field("engine_boots", value)?,
                None => 0,
            };
            let time = match get(keys::ENGINE_TIME) {
                Some(value) => parse_field("engine_time", value)?,
                None => 0,
            };
            config.engine = Some(EngineRecord::new(engine_id, boots, time)?);
        }

        if let Some(model) = get(keys::SECMODEL) {
            SecurityModel::from_str(model)?;
        }

        let user = get(keys::SECNAME).unwrap_or("");
        let mut security = SecurityParameters::new(Bytes::copy_from_slice(user.as_bytes()))?;
        if let Some(value) = get(keys::AUTH_PASS) {
            let (protocol, password) = split_pass("auth_pass", value)?;
            let protocol = AuthProtocol::from_str(protocol)
                .map_err(|e| Error::config(format!("'auth_pass' {}", e)))?;
            security = security.with_auth(protocol, password.as_bytes())?;
        }
        if let Some(value) = get(keys::PRIV_PASS) {
            let (protocol, password) = split_pass("priv_pass", value)?;
            let protocol = PrivProtocol::from_str(protocol)
                .map_err(|e| Error::config(format!("'priv_pass' {}", e)))?;
            security = security.with_privacy(protocol, password.as_bytes())?;
        }
        tracing::trace!(target: "snmp_wire::config", security = %security, "v3 config parsed");
        config.security = Some(Arc::new(security));

        Ok(config)
    }

    /// Build an empty PDU of type `op` carrying these settings.
    pub fn build(&self, op: PduType) -> Result<Pdu> {
        if self.version.is_community() {
            let community = self
                .community
                .clone()
                .ok_or_else(|| Error::config("community is empty."))?;
            let mut pdu = V2cPdu::new(op, community)?;
            pdu.set_version(self.version)?;
            pdu.set_max_msg_size(self.max_msg_size);
            pdu.set_non_repeaters(self.non_repeaters);
            pdu.set_max_repetitions(self.max_repetitions);
            return Ok(pdu.into());
        }

        let security = match &self.security {
            Some(security) => Arc::clone(security),
            None => Arc::new(SecurityParameters::discovery()?),
        };
        let mut pdu = V3Pdu::new(op, security);
        pdu.set_identifier(self.identifier);
        pdu.set_max_msg_size(self.max_msg_size);
        pdu.set_non_repeaters(self.non_repeaters);
        pdu.set_max_repetitions(self.max_repetitions);
        if let Some(name) = &self.context_name {
            pdu.set_context_name(name.clone())?;
        }
        pdu.set_context_engine(self.context_engine.clone())?;
        pdu.set_engine(self.engine.clone());
        Ok(pdu.into())
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Bytes> {
    hex::decode(value)
        .map(Bytes::from)
        .map_err(|_| Error::config(format!("'{}' decode failed", field)))
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("'{}' decode failed", field)))
}

/// Split `<protocol>-<password>` at the first dash.
fn split_pass<'a>(field: &str, value: &'a str) -> Result<(&'a str, &'a str)> {
    value
        .split_once('-')
        .ok_or_else(|| Error::config(format!("'{}' must be <protocol>-<password>", field)))
}

/// Codec-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Largest message this engine sends or accepts.
    pub max_msg_size: u32,
    /// Engines idle longer than this fall back to unauthenticated.
    pub engine_idle_timeout: Option<Duration>,
    /// Also cap outgoing v3 messages at the remote's advertised msgMaxSize.
    pub enforce_remote_max_size: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_msg_size: DEFAULT_MSG_MAX_SIZE,
            engine_idle_timeout: None,
            enforce_remote_max_size: true,
        }
    }
}

impl CodecConfig {
    pub fn with_max_msg_size(mut self, size: u32) -> Self {
        self.max_msg_size = size;
        self
    }

    pub fn with_engine_idle_timeout(mut self, idle: Duration) -> Self {
        self.engine_idle_timeout = Some(idle);
        self
    }

    pub fn with_enforce_remote_max_size(mut self, enforce: bool) -> Self {
        self.enforce_remote_max_size = enforce;
        self
    }
}
