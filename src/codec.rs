//! PDU to wire and back.
//!
//! [`Codec`] is the boundary the transport collaborator talks to:
//! [`Codec::encode`] turns a [`Pdu`] into datagram bytes and
//! [`Codec::decode`] turns received bytes back into a [`Pdu`].
//!
//! For v3 the outbound order is encrypt, then authenticate; inbound is the
//! reverse. The [`EngineCache`] is the only state shared between calls and
//! is written only after a message has fully decoded.

use std::sync::Arc;

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::config::CodecConfig;
use crate::error::{
    AuthErrorKind, CryptoErrorKind, DecodeErrorKind, EncodeErrorKind, Error, ErrorClass, Result,
};
use crate::format::hex;
use crate::message::{
    CommunityMessage, MsgFlags, MsgGlobalData, ScopedPdu, V3Message, V3MessageData,
};
use crate::metrics::{CodecMetrics, NoopMetrics};
use crate::pdu::{Pdu, PduType, V2cPdu, V3Pdu};
use crate::pool::{BufferPool, DEFAULT_POOL_CAPACITY, PooledBuf};
use crate::v3::{
    EngineCache, EngineRecord, LocalizedKeys, ReportKind, SecurityParameters, UsmSecurityParams,
};
use crate::varbind::VarBindList;
use crate::version::Version;

/// Upper bound on the encoded size of everything around the varbinds:
/// message header, USM parameters, context and PDU fields.
const ENVELOPE_OVERHEAD: usize = 512;

/// Encoder/decoder for SNMP messages.
///
/// Cheap to share: wrap it in an `Arc` or clone the engine cache handle
/// into several codecs.
///
/// ```
/// use snmp_wire::codec::Codec;
/// use snmp_wire::pdu::{PduType, V2cPdu};
/// use snmp_wire::v3::SecurityParameters;
/// use std::sync::Arc;
///
/// let codec = Codec::default();
/// let mut pdu = V2cPdu::new(PduType::GetRequest, "public").unwrap();
/// pdu.set_request_id(1);
///
/// let wire = codec.encode(&pdu.into()).unwrap();
/// let user = Arc::new(SecurityParameters::discovery().unwrap());
/// let back = codec.decode(wire, &user).unwrap();
/// assert_eq!(back.request_id(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Codec {
    config: CodecConfig,
    engines: Arc<EngineCache>,
    metrics: Arc<dyn CodecMetrics>,
    pool: BufferPool,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec {
    /// Create a codec with its own engine cache.
    pub fn new(config: CodecConfig) -> Self {
        let engines = match config.engine_idle_timeout {
            Some(idle) => EngineCache::with_idle_timeout(idle),
            None => EngineCache::new(),
        };
        let metrics: Arc<dyn CodecMetrics> = Arc::new(NoopMetrics);
        Self {
            config,
            engines: Arc::new(engines),
            pool: BufferPool::with_metrics(DEFAULT_POOL_CAPACITY, Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Share an engine cache with other codecs.
    pub fn with_engine_cache(mut self, engines: Arc<EngineCache>) -> Self {
        self.engines = engines;
        self
    }

    /// Report events to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn CodecMetrics>) -> Self {
        self.pool = BufferPool::with_metrics(self.pool.capacity(), Arc::clone(&metrics));
        self.metrics = metrics;
        self
    }

    /// Keep up to `capacity` idle encode buffers.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool = BufferPool::with_metrics(capacity, Arc::clone(&self.metrics));
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn engines(&self) -> &Arc<EngineCache> {
        &self.engines
    }

    /// Drop engines idle past the configured period.
    pub fn evict_idle(&self) -> usize {
        self.engines.evict_idle()
    }

    /// Encode a PDU to wire bytes.
    ///
    /// Fails with `MessageTooLarge` rather than truncating. No shared state
    /// is modified.
    pub fn encode(&self, pdu: &Pdu) -> Result<Bytes> {
        let out = match pdu {
            Pdu::V2c(pdu) => self.encode_v2c(pdu)?,
            Pdu::V3(pdu) => self.encode_v3(pdu)?,
        };
        self.metrics.message_encoded(pdu.version(), out.len());
        Ok(out)
    }

    /// Decode received bytes.
    ///
    /// `security` holds the local credentials used to verify and decrypt
    /// v3 messages; it is ignored for v1/v2c.
    pub fn decode(&self, data: Bytes, security: &Arc<SecurityParameters>) -> Result<Pdu> {
        let len = data.len();
        match self.decode_inner(data, security) {
            Ok(pdu) => {
                self.metrics.message_decoded(pdu.version(), len);
                Ok(pdu)
            }
            Err(err) => {
                match err.class() {
                    ErrorClass::AuthenticationFailed => self.metrics.auth_failed(),
                    ErrorClass::NotInTimeWindow => self.metrics.not_in_time_window(),
                    _ => {}
                }
                self.metrics.decode_failed(err.class());
                Err(err)
            }
        }
    }

    fn encode_v2c(&self, pdu: &V2cPdu) -> Result<Bytes> {
        let msg = pdu.to_message()?;
        let limit = self.config.max_msg_size.min(pdu.max_msg_size());

        let mut pooled = self.checkout_for(pdu.varbinds());
        let mut buf = EncodeBuf::from_vec(std::mem::take(&mut *pooled));
        msg.encode_to(&mut buf);
        *pooled = buf.finish_vec();

        check_size(pooled.len(), limit)?;
        tracing::trace!(
            target: "snmp_wire::codec",
            version = %pdu.version(),
            op = %pdu.op(),
            request_id = pdu.request_id(),
            bytes = pooled.len(),
            "encoded community message"
        );
        Ok(Bytes::copy_from_slice(&pooled))
    }

    /// A pooled buffer already large enough for a message carrying
    /// `varbinds`, so encoding never reallocates it.
    fn checkout_for(&self, varbinds: &VarBindList) -> PooledBuf {
        self.pool.checkout_with_capacity(varbinds.encoded_size() + ENVELOPE_OVERHEAD)
    }

    /// The engine header values for an outgoing v3 message.
    ///
    /// The cache's estimate wins over the PDU's own record. An
    /// authenticated message needs a known engine.
    fn resolve_engine(&self, pdu: &V3Pdu) -> Result<EngineRecord> {
        let engine_id = pdu
            .engine()
            .map(|e| e.engine_id().clone())
            .or_else(|| pdu.context_engine().cloned());

        if let Some(id) = &engine_id
            && let Some(cached) = self.engines.get(id)
        {
            return Ok(cached);
        }
        if let Some(engine) = pdu.engine()
            && !engine.engine_id().is_empty()
        {
            return Ok(engine.clone());
        }
        if pdu.level().requires_auth() {
            return Err(Error::UnknownEngine {
                engine_id: engine_id.unwrap_or_default(),
            });
        }
        Ok(EngineRecord::default())
    }

    fn encode_v3(&self, pdu: &V3Pdu) -> Result<Bytes> {
        let security = pdu.security();
        let level = security.level();
        let engine = self.resolve_engine(pdu)?;

        let msg_id = pdu.msg_id();
        if msg_id < 0 {
            return Err(Error::encode(EncodeErrorKind::NegativeValue));
        }

        let mut limit = self.config.max_msg_size.min(pdu.max_msg_size());
        if self.config.enforce_remote_max_size
            && let Some(remote) = self.engines.msg_max_size(engine.engine_id())
        {
            limit = limit.min(remote);
        }

        let keys = if level.requires_auth() {
            security.localize(engine.engine_id())
        } else {
            LocalizedKeys::default()
        };

        let context_engine = pdu
            .context_engine()
            .cloned()
            .unwrap_or_else(|| engine.engine_id().clone());
        let scoped = ScopedPdu::new(context_engine, pdu.context_name().clone(), pdu.raw());

        let mut usm = UsmSecurityParams::new(
            engine.engine_id().clone(),
            engine.engine_boots,
            engine.engine_time,
            security.user_name().clone(),
        );

        let data = if level.requires_priv() {
            let priv_key = keys
                .privacy
                .as_ref()
                .ok_or_else(|| Error::encode(EncodeErrorKind::NoPrivKey))?;

            let mut plain = self.checkout_for(pdu.varbinds());
            let mut buf = EncodeBuf::from_vec(std::mem::take(&mut *plain));
            scoped.encode(&mut buf);
            *plain = buf.finish_vec();

            let (ciphertext, priv_params) = priv_key.encrypt(
                &plain,
                engine.engine_boots,
                engine.engine_time,
                security.next_salt(),
            )?;
            tracing::trace!(
                target: "snmp_wire::codec",
                protocol = %priv_key.protocol(),
                plaintext_len = plain.len(),
                ciphertext_len = ciphertext.len(),
                "encrypted scoped PDU"
            );
            usm = usm.with_priv_params(priv_params);
            V3MessageData::Encrypted(ciphertext)
        } else {
            V3MessageData::Plaintext(scoped)
        };

        if let Some(auth_key) = &keys.auth {
            usm = usm.with_auth_placeholder(auth_key.mac_len());
        }

        let advertised = i32::try_from(pdu.max_msg_size().min(self.config.max_msg_size))
            .unwrap_or(i32::MAX);
        let msg = V3Message::new(
            MsgGlobalData::new(msg_id, advertised, MsgFlags::new(level, pdu.reportable())),
            usm.encode(),
            data,
        );

        let mut pooled = self.checkout_for(pdu.varbinds());
        let mut buf = EncodeBuf::from_vec(std::mem::take(&mut *pooled));
        msg.encode_to(&mut buf);
        *pooled = buf.finish_vec();
        check_size(pooled.len(), limit)?;

        if level.requires_auth() {
            let auth_key = keys
                .auth
                .as_ref()
                .ok_or_else(|| Error::encode(EncodeErrorKind::MissingAuthKey))?;
            let (offset, _) = UsmSecurityParams::find_auth_params_offset(&pooled)
                .ok_or_else(|| Error::encode(EncodeErrorKind::MissingAuthParams))?;
            auth_key.sign_message(&mut pooled, offset)?;
        }

        tracing::trace!(
            target: "snmp_wire::codec",
            op = %pdu.op(),
            msg_id,
            level = %level,
            engine_id = %hex::Bytes(engine.engine_id()),
            bytes = pooled.len(),
            "encoded v3 message"
        );
        Ok(Bytes::copy_from_slice(&pooled))
    }

    fn decode_inner(&self, data: Bytes, security: &Arc<SecurityParameters>) -> Result<Pdu> {
        check_size(data.len(), self.config.max_msg_size)?;

        let mut decoder = Decoder::new(data.clone());
        let mut seq = decoder.read_sequence()?;
        decoder.expect_end()?;

        let version_num = seq.read_integer()?;
        let version = Version::from_i32(version_num)
            .ok_or_else(|| seq.error(DecodeErrorKind::UnknownVersion(version_num)))?;

        match version {
            Version::V1 | Version::V2c => {
                let msg = CommunityMessage::decode_from_sequence(&mut seq, version)?;
                let pdu = V2cPdu::from_message(msg)?;
                tracing::trace!(
                    target: "snmp_wire::codec",
                    version = %version,
                    op = %pdu.op(),
                    request_id = pdu.request_id(),
                    "decoded community message"
                );
                Ok(pdu.into())
            }
            Version::V3 => Ok(self.decode_v3(&data, &mut seq, security)?.into()),
        }
    }

    fn decode_v3(
        &self,
        whole: &[u8],
        seq: &mut Decoder,
        security: &Arc<SecurityParameters>,
    ) -> Result<V3Pdu> {
        let global = MsgGlobalData::decode(seq)?;
        let usm = UsmSecurityParams::decode(seq.read_octet_string()?)?;
        let level = global.msg_flags.security_level;
        let configured = security.level();

        if level.requires_auth() && !configured.requires_auth() {
            return Err(Error::auth(AuthErrorKind::NoAuthKey));
        }
        if level.requires_priv() && !configured.requires_priv() {
            return Err(Error::decrypt(CryptoErrorKind::NoPrivKey));
        }

        let keys = if level.requires_auth() {
            self.authenticate(whole, &usm, security)?
        } else {
            LocalizedKeys::default()
        };

        let scoped = match V3MessageData::decode(seq, level)? {
            V3MessageData::Plaintext(scoped) => scoped,
            V3MessageData::Encrypted(ciphertext) => {
                let priv_key = keys
                    .privacy
                    .as_ref()
                    .ok_or_else(|| Error::decrypt(CryptoErrorKind::NoPrivKey))?;
                let plaintext = priv_key.decrypt(
                    &ciphertext,
                    usm.engine_boots,
                    usm.engine_time,
                    &usm.priv_params,
                )?;
                ScopedPdu::decode_plaintext(plaintext).map_err(|err| {
                    tracing::debug!(target: "snmp_wire::usm", error = %err, "decrypted scoped PDU did not decode");
                    Error::decrypt(CryptoErrorKind::InvalidPlaintext)
                })?
            }
        };
        seq.expect_end()?;

        let op = scoped.pdu.pdu_type;
        if level < configured && op != PduType::Report {
            tracing::debug!(
                target: "snmp_wire::usm",
                received = %level,
                required = %configured,
                "security level below configuration"
            );
            return Err(Error::auth(AuthErrorKind::UnsupportedSecurityLevel));
        }

        let engine = if usm.engine_id.is_empty() {
            None
        } else {
            Some(EngineRecord::new(
                usm.engine_id.clone(),
                usm.engine_boots,
                usm.engine_time,
            )?)
        };
        let msg_max_size = u32::try_from(global.msg_max_size).unwrap_or(0);
        let pdu = V3Pdu::from_parts(
            scoped.pdu,
            global.msg_id,
            msg_max_size,
            global.msg_flags.reportable,
            scoped.context_engine_id,
            scoped.context_name,
            Arc::clone(security),
            engine,
        )?;

        // everything decoded; now the engine cache may change
        if level.requires_auth() {
            if pdu.report_kind() == Some(ReportKind::NotInTimeWindows) {
                self.engines.accept_time_sync(
                    &usm.engine_id,
                    usm.engine_boots,
                    usm.engine_time,
                    msg_max_size,
                )?;
            } else {
                self.engines.accept_authenticated(
                    &usm.engine_id,
                    usm.engine_boots,
                    usm.engine_time,
                    msg_max_size,
                )?;
            }
        } else if op == PduType::Report
            && let Some(record) = pdu.engine()
            && self.engines.record_discovery(record, msg_max_size)
        {
            self.metrics.engine_discovered();
        }

        tracing::trace!(
            target: "snmp_wire::codec",
            op = %op,
            msg_id = global.msg_id,
            level = %level,
            engine_id = %hex::Bytes(&usm.engine_id),
            "decoded v3 message"
        );
        Ok(pdu)
    }

    /// Verify the user and MAC of an authenticated message.
    ///
    /// The time window is checked at commit, once the PDU type is known.
    fn authenticate(
        &self,
        whole: &[u8],
        usm: &UsmSecurityParams,
        security: &SecurityParameters,
    ) -> Result<LocalizedKeys> {
        if usm.username != *security.user_name() {
            tracing::debug!(
                target: "snmp_wire::usm",
                user = %String::from_utf8_lossy(&usm.username),
                "unknown user name"
            );
            return Err(Error::auth(AuthErrorKind::UnknownUser));
        }
        if usm.engine_id.is_empty() {
            return Err(Error::UnknownEngine {
                engine_id: Bytes::new(),
            });
        }

        let keys = security.localize(&usm.engine_id);
        let auth_key = keys
            .auth
            .as_ref()
            .ok_or_else(|| Error::auth(AuthErrorKind::NoAuthKey))?;

        let (offset, len) = UsmSecurityParams::find_auth_params_offset(whole)
            .ok_or_else(|| Error::auth(AuthErrorKind::AuthParamsNotFound))?;
        if len != auth_key.mac_len() {
            return Err(Error::auth(AuthErrorKind::WrongMacLength {
                expected: auth_key.mac_len(),
                actual: len,
            }));
        }
        auth_key.verify_message(whole, offset)?;
        Ok(keys)
    }
}

fn check_size(size: usize, max: u32) -> Result<()> {
    let max = max as usize;
    if size > max {
        tracing::debug!(target: "snmp_wire::codec", size, max, "message too large");
        return Err(Error::MessageTooLarge { size, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::AtomicMetrics;
    use crate::oid;
    use crate::v3::{AuthProtocol, PrivProtocol, SecurityLevel};
    use crate::value::Value;
    use crate::varbind::VarBind;

    const ENGINE_ID: &[u8] = b"\x80\x00\x1f\x88\x04remote";

    fn user(level: SecurityLevel) -> Arc<SecurityParameters> {
        let mut user = SecurityParameters::new(b"admin".as_slice()).unwrap();
        if level.requires_auth() {
            user = user.with_auth(AuthProtocol::Sha256, b"authpass1").unwrap();
        }
        if level.requires_priv() {
            user = user.with_privacy(PrivProtocol::Aes128, b"privpass1").unwrap();
        }
        Arc::new(user.with_salt(1))
    }

    fn request(security: &Arc<SecurityParameters>) -> V3Pdu {
        let mut pdu = V3Pdu::new(PduType::GetRequest, Arc::clone(security));
        pdu.set_request_id(1234);
        pdu.set_varbinds(VarBindList::from_oids(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]).unwrap());
        pdu.set_engine(Some(EngineRecord::new(ENGINE_ID, 5, 1000).unwrap()));
        pdu
    }

    #[test]
    fn test_v3_roundtrip_all_levels() {
        for level in [
            SecurityLevel::NoAuthNoPriv,
            SecurityLevel::AuthNoPriv,
            SecurityLevel::AuthPriv,
        ] {
            let codec = Codec::default();
            let security = user(level);
            let wire = codec.encode(&request(&security).into()).unwrap();
            let pdu = codec.decode(wire, &security).unwrap();
            let pdu = pdu.as_v3().unwrap();
            assert_eq!(pdu.request_id(), 1234, "{level}");
            assert_eq!(pdu.msg_id(), 1234);
            assert_eq!(pdu.varbinds().len(), 1);
            assert_eq!(pdu.engine().unwrap().engine_id().as_ref(), ENGINE_ID);
        }
    }

    #[test]
    fn test_authenticated_encode_needs_engine() {
        let codec = Codec::default();
        let security = user(SecurityLevel::AuthNoPriv);
        let mut pdu = request(&security);
        pdu.set_engine(None);
        let err = codec.encode(&pdu.into()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::UnknownEngine);
    }

    #[test]
    fn test_authenticated_decode_synchronizes_engine() {
        let codec = Codec::default();
        let security = user(SecurityLevel::AuthNoPriv);
        let wire = codec.encode(&request(&security).into()).unwrap();
        codec.decode(wire, &security).unwrap();
        assert_eq!(
            codec.engines().state(ENGINE_ID),
            crate::v3::EngineState::Synchronized
        );
    }

    #[test]
    fn test_level_mismatch() {
        let codec = Codec::default();
        let plain = user(SecurityLevel::NoAuthNoPriv);
        let authed = user(SecurityLevel::AuthNoPriv);

        let wire = codec.encode(&request(&plain).into()).unwrap();
        let err = codec.decode(wire, &authed).unwrap_err();
        assert!(matches!(
            err,
            Error::AuthenticationFailed {
                kind: AuthErrorKind::UnsupportedSecurityLevel
            }
        ));

        let wire = codec.encode(&request(&authed).into()).unwrap();
        let err = codec.decode(wire, &plain).unwrap_err();
        assert!(matches!(
            err,
            Error::AuthenticationFailed {
                kind: AuthErrorKind::NoAuthKey
            }
        ));
    }

    #[test]
    fn test_wrong_user_rejected() {
        let codec = Codec::default();
        let sender = user(SecurityLevel::AuthNoPriv);
        let receiver = Arc::new(
            SecurityParameters::new(b"other".as_slice())
                .unwrap()
                .with_auth(AuthProtocol::Sha256, b"authpass1")
                .unwrap(),
        );
        let wire = codec.encode(&request(&sender).into()).unwrap();
        let err = codec.decode(wire, &receiver).unwrap_err();
        assert!(matches!(
            err,
            Error::AuthenticationFailed {
                kind: AuthErrorKind::UnknownUser
            }
        ));
    }

    #[test]
    fn test_message_too_large() {
        let codec = Codec::new(CodecConfig::default().with_max_msg_size(484));
        let mut pdu = V2cPdu::new(PduType::SetRequest, "public").unwrap();
        let mut varbinds = VarBindList::new();
        for i in 0..40 {
            varbinds
                .push(VarBind::new(
                    oid!(1, 3, 6, 1, 4, 1, 99999, i),
                    Value::OctetString(Bytes::from_static(b"0123456789")),
                ))
                .unwrap();
        }
        pdu.set_varbinds(varbinds);
        let err = codec.encode(&pdu.into()).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { max: 484, .. }));
    }

    #[test]
    fn test_metrics_reported() {
        let metrics = Arc::new(AtomicMetrics::new());
        let codec = Codec::default().with_metrics(metrics.clone());
        let security = user(SecurityLevel::AuthNoPriv);

        let wire = codec.encode(&request(&security).into()).unwrap();
        let mut tampered = wire.to_vec();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        assert!(codec.decode(tampered.into(), &security).is_err());
        codec.decode(wire, &security).unwrap();

        let snap = metrics.snapshot();
        assert_eq!(snap.encoded, 1);
        assert_eq!(snap.decoded, 1);
        assert_eq!(snap.auth_failures, 1);
        assert_eq!(snap.decode_failures, 1);
        assert!(snap.buffers_allocated >= 1);
    }

    #[test]
    fn test_large_message_fits_reserved_buffer() {
        let codec = Codec::default();
        let mut varbinds = VarBindList::new();
        for i in 0..30 {
            varbinds
                .push(VarBind::new(
                    oid!(1, 3, 6, 1, 4, 1, 8072, 2, i),
                    Value::OctetString(Bytes::from(vec![b'x'; 100])),
                ))
                .unwrap();
        }
        let reserved = varbinds.encoded_size() + ENVELOPE_OVERHEAD;

        let security = user(SecurityLevel::AuthPriv);
        let mut pdu = request(&security);
        pdu.set_varbinds(varbinds.clone());
        let wire = codec.encode(&pdu.into()).unwrap();
        assert!(wire.len() > 1500);
        assert!(wire.len() <= reserved);

        let mut pdu = V2cPdu::new(PduType::Response, vec![b'c'; 128]).unwrap();
        pdu.set_varbinds(varbinds);
        let wire = codec.encode(&pdu.into()).unwrap();
        assert!(wire.len() <= reserved);

        // the scoped PDU buffer went back before the message buffer was taken
        assert_eq!(codec.pool.available(), 1);
        assert!(codec.pool.checkout().capacity() >= reserved);
    }

    #[test]
    fn test_negative_msg_id_rejected() {
        let codec = Codec::default();
        let security = user(SecurityLevel::NoAuthNoPriv);
        let mut pdu = request(&security);
        pdu.set_request_id(-5);
        let err = codec.encode(&pdu.into()).unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::NegativeValue
            }
        ));
    }
}
