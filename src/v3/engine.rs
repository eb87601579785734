//! Engine discovery and time synchronization (RFC 3414 Section 4).
//!
//! SNMPv3 requires knowing the authoritative engine's ID, boots counter,
//! and time value before authenticated messages can be sent. This module
//! provides:
//!
//! - [`EngineRecord`]: an engine identity with its boots and time
//! - [`EngineCache`]: thread-safe map from engine ID to synchronization state
//! - [`ReportKind`]: classification of usmStats Report PDUs
//!
//! # States
//!
//! ```text
//! Unauthenticated --(unauthenticated Report)--> EngineKnown
//! Unauthenticated | EngineKnown --(authenticated message)--> Synchronized
//! Synchronized --(authenticated notInTimeWindows Report)--> Synchronized, clock moved forward
//! any --(idle eviction)--> Unauthenticated
//! ```
//!
//! Once an engine is known, an authenticated message is accepted only if
//! its boots match and its time is within [`TIME_WINDOW`] seconds of the
//! locally estimated engine time. The exception is the authenticated
//! usmStatsNotInTimeWindows Report, which resynchronizes the entry after a
//! remote reboot. The cache changes only after a message passes the HMAC
//! check.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::varbind::VarBindList;

/// Time window in seconds (RFC 3414 Section 2.2.3).
pub const TIME_WINDOW: u32 = 150;

/// Maximum valid snmpEngineTime and snmpEngineBoots value.
///
/// A boots value at this maximum is latched and never in the time window.
pub const MAX_ENGINE_TIME: u32 = 2147483647;

/// Maximum engine ID length in bytes.
pub const MAX_ENGINE_ID_LEN: usize = 32;

/// Default msgMaxSize for UDP transport (65535 - 20 IPv4 - 8 UDP = 65507).
pub const DEFAULT_MSG_MAX_SIZE: u32 = 65507;

/// usmStats counters reported in Report PDUs (RFC 3414 Section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    UnsupportedSecLevels,
    NotInTimeWindows,
    UnknownUserNames,
    UnknownEngineIds,
    WrongDigests,
    DecryptionErrors,
}

impl ReportKind {
    const ALL: [ReportKind; 6] = [
        Self::UnsupportedSecLevels,
        Self::NotInTimeWindows,
        Self::UnknownUserNames,
        Self::UnknownEngineIds,
        Self::WrongDigests,
        Self::DecryptionErrors,
    ];

    /// The usmStats instance OID, `1.3.6.1.6.3.15.1.1.<n>.0`.
    pub fn oid(self) -> Oid {
        let n = match self {
            Self::UnsupportedSecLevels => 1,
            Self::NotInTimeWindows => 2,
            Self::UnknownUserNames => 3,
            Self::UnknownEngineIds => 4,
            Self::WrongDigests => 5,
            Self::DecryptionErrors => 6,
        };
        crate::oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, n, 0)
    }

    pub fn from_oid(oid: &Oid) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.oid() == *oid)
    }

    /// First usmStats binding in a Report's variable bindings.
    pub fn classify(varbinds: &VarBindList) -> Option<Self> {
        varbinds.iter().find_map(|vb| Self::from_oid(&vb.oid))
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UnsupportedSecLevels => "usmStatsUnsupportedSecLevels",
            Self::NotInTimeWindows => "usmStatsNotInTimeWindows",
            Self::UnknownUserNames => "usmStatsUnknownUserNames",
            Self::UnknownEngineIds => "usmStatsUnknownEngineIDs",
            Self::WrongDigests => "usmStatsWrongDigests",
            Self::DecryptionErrors => "usmStatsDecryptionErrors",
        };
        f.write_str(name)
    }
}

/// Synchronization state of a remote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing cached, or the entry was evicted.
    Unauthenticated,
    /// Engine ID, boots and time learned from an unauthenticated Report.
    EngineKnown,
    /// At least one authenticated message accepted.
    Synchronized,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::EngineKnown => f.write_str("engine-known"),
            Self::Synchronized => f.write_str("synchronized"),
        }
    }
}

/// Authoritative engine identity and its last-known clock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineRecord {
    engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
}

impl EngineRecord {
    /// Fails with `FieldTooLarge` for an engine ID over 32 bytes.
    pub fn new(engine_id: impl Into<Bytes>, engine_boots: u32, engine_time: u32) -> Result<Self> {
        let engine_id = engine_id.into();
        if engine_id.len() > MAX_ENGINE_ID_LEN {
            return Err(Error::field_too_large(
                "engine id",
                engine_id.len(),
                MAX_ENGINE_ID_LEN,
            ));
        }
        Ok(Self {
            engine_id,
            engine_boots,
            engine_time,
        })
    }

    pub fn engine_id(&self) -> &Bytes {
        &self.engine_id
    }
}

#[derive(Debug, Clone)]
struct CachedEngine {
    state: EngineState,
    engine_boots: u32,
    engine_time: u32,
    synced_at: Instant,
    last_seen: Instant,
    latest_received_engine_time: u32,
    msg_max_size: u32,
}

impl CachedEngine {
    fn new(state: EngineState, boots: u32, time: u32, msg_max_size: u32, now: Instant) -> Self {
        Self {
            state,
            engine_boots: boots,
            engine_time: time,
            synced_at: now,
            last_seen: now,
            latest_received_engine_time: time,
            msg_max_size,
        }
    }

    /// Engine time now, capped at `MAX_ENGINE_TIME`.
    fn estimated_time(&self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.synced_at).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.engine_time
            .saturating_add(elapsed)
            .min(MAX_ENGINE_TIME)
    }

    fn is_in_time_window(&self, msg_boots: u32, msg_time: u32, now: Instant) -> bool {
        if self.engine_boots == MAX_ENGINE_TIME {
            return false;
        }
        if msg_boots != self.engine_boots {
            return false;
        }
        msg_time.abs_diff(self.estimated_time(now)) <= TIME_WINDOW
    }

    /// Advance the clock when the message is from a newer boot or carries a
    /// newer time (RFC 3414 Section 3.2 Step 7b).
    fn update_time(&mut self, msg_boots: u32, msg_time: u32, now: Instant) {
        if msg_boots > self.engine_boots
            || (msg_boots == self.engine_boots && msg_time > self.latest_received_engine_time)
        {
            self.engine_boots = msg_boots;
            self.engine_time = msg_time;
            self.synced_at = now;
            self.latest_received_engine_time = msg_time;
        }
    }
}

/// Thread-safe cache of remote engine state, keyed by engine ID.
///
/// This is the only shared mutable state in the crate. Share it between
/// codecs with an `Arc`.
#[derive(Debug, Default)]
pub struct EngineCache {
    engines: RwLock<HashMap<Bytes, CachedEngine>>,
    idle_timeout: Option<Duration>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries unseen for longer than `idle` fall back to `Unauthenticated`.
    pub fn with_idle_timeout(idle: Duration) -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
            idle_timeout: Some(idle),
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    fn is_expired(&self, entry: &CachedEngine, now: Instant) -> bool {
        self.idle_timeout
            .is_some_and(|idle| now.saturating_duration_since(entry.last_seen) >= idle)
    }

    /// Current state of an engine.
    pub fn state(&self, engine_id: &[u8]) -> EngineState {
        let now = Instant::now();
        let Ok(engines) = self.engines.read() else {
            return EngineState::Unauthenticated;
        };
        match engines.get(engine_id) {
            Some(entry) if !self.is_expired(entry, now) => entry.state,
            _ => EngineState::Unauthenticated,
        }
    }

    /// Cached record with the estimated current engine time.
    pub fn get(&self, engine_id: &[u8]) -> Option<EngineRecord> {
        let now = Instant::now();
        let engines = self.engines.read().ok()?;
        let entry = engines.get(engine_id)?;
        if self.is_expired(entry, now) {
            return None;
        }
        Some(EngineRecord {
            engine_id: Bytes::copy_from_slice(engine_id),
            engine_boots: entry.engine_boots,
            engine_time: entry.estimated_time(now),
        })
    }

    /// msgMaxSize the remote engine advertised.
    pub fn msg_max_size(&self, engine_id: &[u8]) -> Option<u32> {
        let engines = self.engines.read().ok()?;
        engines.get(engine_id).map(|e| e.msg_max_size)
    }

    /// Record the engine from an unauthenticated discovery Report.
    ///
    /// Seeds `EngineKnown`. A synchronized entry is left untouched; returns
    /// whether the cache changed.
    pub fn record_discovery(&self, record: &EngineRecord, msg_max_size: u32) -> bool {
        if record.engine_id.is_empty() {
            tracing::debug!(target: "snmp_wire::engine", "discovery report carried an empty engine ID");
            return false;
        }
        let now = Instant::now();
        let Ok(mut engines) = self.engines.write() else {
            return false;
        };
        if let Some(entry) = engines.get(&record.engine_id)
            && entry.state == EngineState::Synchronized
            && !self.is_expired(entry, now)
        {
            tracing::debug!(
                target: "snmp_wire::engine",
                engine_id = %crate::format::hex::Bytes(&record.engine_id),
                "ignoring unauthenticated report for synchronized engine"
            );
            return false;
        }
        engines.insert(
            record.engine_id.clone(),
            CachedEngine::new(
                EngineState::EngineKnown,
                record.engine_boots,
                record.engine_time,
                msg_max_size,
                now,
            ),
        );
        tracing::debug!(
            target: "snmp_wire::engine",
            engine_id = %crate::format::hex::Bytes(&record.engine_id),
            engine_boots = record.engine_boots,
            engine_time = record.engine_time,
            "engine discovered"
        );
        true
    }

    /// Check the time window for an authenticated message and, if it
    /// passes, update the cache.
    ///
    /// The caller must have verified the HMAC first. On failure nothing is
    /// modified.
    pub fn accept_authenticated(
        &self,
        engine_id: &[u8],
        engine_boots: u32,
        engine_time: u32,
        msg_max_size: u32,
    ) -> Result<EngineState> {
        let now = Instant::now();
        let mut engines = self
            .engines
            .write()
            .map_err(|_| Error::config("engine cache lock poisoned"))?;

        let known = engines
            .get(engine_id)
            .filter(|entry| !self.is_expired(entry, now));

        match known {
            Some(entry) if !entry.is_in_time_window(engine_boots, engine_time, now) => {
                tracing::debug!(
                    target: "snmp_wire::usm",
                    engine_id = %crate::format::hex::Bytes(engine_id),
                    local_boots = entry.engine_boots,
                    local_time = entry.estimated_time(now),
                    msg_boots = engine_boots,
                    msg_time = engine_time,
                    "message not in time window"
                );
                Err(Error::NotInTimeWindow {
                    engine_boots,
                    engine_time,
                })
            }
            Some(_) => {
                if let Some(entry) = engines.get_mut(engine_id) {
                    entry.update_time(engine_boots, engine_time, now);
                    entry.state = EngineState::Synchronized;
                    entry.last_seen = now;
                    entry.msg_max_size = msg_max_size;
                }
                Ok(EngineState::Synchronized)
            }
            None => {
                engines.insert(
                    Bytes::copy_from_slice(engine_id),
                    CachedEngine::new(
                        EngineState::Synchronized,
                        engine_boots,
                        engine_time,
                        msg_max_size,
                        now,
                    ),
                );
                tracing::debug!(
                    target: "snmp_wire::engine",
                    engine_id = %crate::format::hex::Bytes(engine_id),
                    engine_boots,
                    engine_time,
                    "engine synchronized"
                );
                Ok(EngineState::Synchronized)
            }
        }
    }

    /// Resynchronize from an authenticated usmStatsNotInTimeWindows Report
    /// (RFC 3414 Section 3.2 Step 7b).
    ///
    /// The window is not applied: such a Report is how a rebooted engine
    /// announces its new boots and time. The clock only moves forward, to a
    /// higher boots value or a newer time within the same boot. The caller
    /// must have verified the HMAC first.
    pub fn accept_time_sync(
        &self,
        engine_id: &[u8],
        engine_boots: u32,
        engine_time: u32,
        msg_max_size: u32,
    ) -> Result<EngineState> {
        let now = Instant::now();
        let mut engines = self
            .engines
            .write()
            .map_err(|_| Error::config("engine cache lock poisoned"))?;

        let live = engines
            .get(engine_id)
            .is_some_and(|entry| !self.is_expired(entry, now));
        if live && let Some(entry) = engines.get_mut(engine_id) {
            let previous_boots = entry.engine_boots;
            entry.update_time(engine_boots, engine_time, now);
            entry.state = EngineState::Synchronized;
            entry.last_seen = now;
            entry.msg_max_size = msg_max_size;
            tracing::debug!(
                target: "snmp_wire::engine",
                engine_id = %crate::format::hex::Bytes(engine_id),
                previous_boots,
                engine_boots = entry.engine_boots,
                engine_time = entry.engine_time,
                "engine resynchronized"
            );
        } else {
            engines.insert(
                Bytes::copy_from_slice(engine_id),
                CachedEngine::new(
                    EngineState::Synchronized,
                    engine_boots,
                    engine_time,
                    msg_max_size,
                    now,
                ),
            );
            tracing::debug!(
                target: "snmp_wire::engine",
                engine_id = %crate::format::hex::Bytes(engine_id),
                engine_boots,
                engine_time,
                "engine synchronized"
            );
        }
        Ok(EngineState::Synchronized)
    }

    /// Read-only form of the window check in [`Self::accept_authenticated`].
    ///
    /// Unknown and evicted engines pass.
    pub fn check_time_window(
        &self,
        engine_id: &[u8],
        engine_boots: u32,
        engine_time: u32,
    ) -> Result<()> {
        let now = Instant::now();
        let engines = self
            .engines
            .read()
            .map_err(|_| Error::config("engine cache lock poisoned"))?;
        match engines.get(engine_id) {
            Some(entry)
                if !self.is_expired(entry, now)
                    && !entry.is_in_time_window(engine_boots, engine_time, now) =>
            {
                Err(Error::NotInTimeWindow {
                    engine_boots,
                    engine_time,
                })
            }
            _ => Ok(()),
        }
    }

    /// Seed a synchronized entry directly, e.g. from configuration.
    pub fn insert_synchronized(&self, record: &EngineRecord, msg_max_size: u32) {
        if let Ok(mut engines) = self.engines.write() {
            engines.insert(
                record.engine_id.clone(),
                CachedEngine::new(
                    EngineState::Synchronized,
                    record.engine_boots,
                    record.engine_time,
                    msg_max_size,
                    Instant::now(),
                ),
            );
        }
    }

    /// Drop entries idle past the configured timeout; returns how many.
    pub fn evict_idle(&self) -> usize {
        let Some(idle) = self.idle_timeout else {
            return 0;
        };
        let now = Instant::now();
        let Ok(mut engines) = self.engines.write() else {
            return 0;
        };
        let before = engines.len();
        engines.retain(|_, entry| now.saturating_duration_since(entry.last_seen) < idle);
        let evicted = before - engines.len();
        if evicted > 0 {
            tracing::debug!(target: "snmp_wire::engine", evicted, "evicted idle engines");
        }
        evicted
    }

    /// Forget an engine so the next exchange starts with discovery.
    pub fn remove(&self, engine_id: &[u8]) -> Option<EngineRecord> {
        let entry = self.engines.write().ok()?.remove(engine_id)?;
        Some(EngineRecord {
            engine_id: Bytes::copy_from_slice(engine_id),
            engine_boots: entry.engine_boots,
            engine_time: entry.engine_time,
        })
    }

    pub fn clear(&self) {
        if let Ok(mut engines) = self.engines.write() {
            engines.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.engines.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use crate::value::Value;
    use crate::varbind::VarBind;

    const ID: &[u8] = b"\x80\x00\x1f\x88\x04engine";

    fn record(boots: u32, time: u32) -> EngineRecord {
        EngineRecord::new(Bytes::from_static(ID), boots, time).unwrap()
    }

    #[test]
    fn test_engine_record_bound() {
        assert!(EngineRecord::new(vec![0u8; 32], 0, 0).is_ok());
        let err = EngineRecord::new(vec![0u8; 33], 0, 0).unwrap_err();
        assert_eq!(err.class(), ErrorClass::FieldTooLarge);
    }

    #[test]
    fn test_state_transitions() {
        let cache = EngineCache::new();
        assert_eq!(cache.state(ID), EngineState::Unauthenticated);

        assert!(cache.record_discovery(&record(3, 1000), 1500));
        assert_eq!(cache.state(ID), EngineState::EngineKnown);
        assert_eq!(cache.msg_max_size(ID), Some(1500));

        cache.accept_authenticated(ID, 3, 1010, 1500).unwrap();
        assert_eq!(cache.state(ID), EngineState::Synchronized);

        // an unauthenticated report cannot rewind a synchronized engine
        assert!(!cache.record_discovery(&record(1, 5), 1500));
        assert_eq!(cache.get(ID).unwrap().engine_boots, 3);
    }

    #[test]
    fn test_time_window_boundaries() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(7, 10_000), DEFAULT_MSG_MAX_SIZE);

        let err = cache.accept_authenticated(ID, 7, 10_151, 1500).unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotInTimeWindow);
        let err = cache.accept_authenticated(ID, 7, 9_849, 1500).unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotInTimeWindow);

        cache.accept_authenticated(ID, 7, 10_100, 1500).unwrap();
        assert_eq!(cache.get(ID).unwrap().engine_time, 10_100);
    }

    #[test]
    fn test_check_time_window_is_read_only() {
        let cache = EngineCache::new();
        assert!(cache.check_time_window(ID, 1, 1).is_ok());
        assert!(cache.is_empty());

        cache.insert_synchronized(&record(7, 10_000), DEFAULT_MSG_MAX_SIZE);
        assert!(cache.check_time_window(ID, 7, 10_100).is_ok());
        let err = cache.check_time_window(ID, 8, 10_000).unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotInTimeWindow);
        assert_eq!(cache.get(ID).unwrap().engine_time, 10_000);
    }

    #[test]
    fn test_rejection_leaves_cache_untouched() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(7, 10_000), 2000);
        assert!(cache.accept_authenticated(ID, 7, 20_000, 900).is_err());

        let rec = cache.get(ID).unwrap();
        assert_eq!(rec.engine_time, 10_000);
        assert_eq!(cache.msg_max_size(ID), Some(2000));
    }

    #[test]
    fn test_boots_mismatch_and_latch() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(7, 100), DEFAULT_MSG_MAX_SIZE);
        assert!(cache.accept_authenticated(ID, 8, 100, 1500).is_err());
        assert!(cache.accept_authenticated(ID, 6, 100, 1500).is_err());

        cache.insert_synchronized(&record(MAX_ENGINE_TIME, 100), DEFAULT_MSG_MAX_SIZE);
        assert!(cache.accept_authenticated(ID, MAX_ENGINE_TIME, 100, 1500).is_err());
    }

    #[test]
    fn test_older_time_accepted_in_window_without_rewinding() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(2, 5000), DEFAULT_MSG_MAX_SIZE);
        cache.accept_authenticated(ID, 2, 4990, 1500).unwrap();
        assert_eq!(cache.get(ID).unwrap().engine_time, 5000);
    }

    #[test]
    fn test_time_sync_after_reboot() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(5, 1000), DEFAULT_MSG_MAX_SIZE);
        assert!(cache.accept_authenticated(ID, 6, 3, 1500).is_err());

        cache.accept_time_sync(ID, 6, 3, 1500).unwrap();
        let rec = cache.get(ID).unwrap();
        assert_eq!(rec.engine_boots, 6);
        assert!(rec.engine_time < 100);
        assert!(cache.accept_authenticated(ID, 6, 10, 1500).is_ok());

        // a stale boot count does not rewind the clock
        cache.accept_time_sync(ID, 5, 2000, 1500).unwrap();
        assert_eq!(cache.get(ID).unwrap().engine_boots, 6);

        cache.accept_time_sync(ID, 6, 5000, 1500).unwrap();
        assert!(cache.get(ID).unwrap().engine_time >= 5000);
    }

    #[test]
    fn test_unknown_engine_synchronizes_on_first_authenticated_message() {
        let cache = EngineCache::new();
        let state = cache.accept_authenticated(ID, 1, 42, 1500).unwrap();
        assert_eq!(state, EngineState::Synchronized);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_idle_eviction_returns_to_unauthenticated() {
        let cache = EngineCache::with_idle_timeout(Duration::ZERO);
        cache.insert_synchronized(&record(1, 1), DEFAULT_MSG_MAX_SIZE);
        assert_eq!(cache.state(ID), EngineState::Unauthenticated);
        assert!(cache.get(ID).is_none());

        assert_eq!(cache.evict_idle(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_eviction_without_timeout() {
        let cache = EngineCache::new();
        cache.insert_synchronized(&record(1, 1), DEFAULT_MSG_MAX_SIZE);
        assert_eq!(cache.evict_idle(), 0);
        assert_eq!(cache.state(ID), EngineState::Synchronized);
    }

    #[test]
    fn test_empty_engine_id_discovery_ignored() {
        let cache = EngineCache::new();
        assert!(!cache.record_discovery(&EngineRecord::default(), 1500));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_estimated_time_caps_at_max() {
        let now = Instant::now();
        let entry = CachedEngine::new(
            EngineState::Synchronized,
            1,
            MAX_ENGINE_TIME,
            DEFAULT_MSG_MAX_SIZE,
            now - Duration::from_secs(10),
        );
        assert_eq!(entry.estimated_time(now), MAX_ENGINE_TIME);
    }

    #[test]
    fn test_estimated_time_advances() {
        let now = Instant::now();
        let entry = CachedEngine::new(
            EngineState::Synchronized,
            1,
            1000,
            DEFAULT_MSG_MAX_SIZE,
            now - Duration::from_secs(60),
        );
        assert_eq!(entry.estimated_time(now), 1060);
        assert!(entry.is_in_time_window(1, 1060 + TIME_WINDOW, now));
        assert!(!entry.is_in_time_window(1, 1060 + TIME_WINDOW + 1, now));
    }

    #[test]
    fn test_report_classification() {
        for kind in ReportKind::ALL {
            assert_eq!(ReportKind::from_oid(&kind.oid()), Some(kind));
        }
        assert_eq!(
            ReportKind::UnknownEngineIds.oid().to_string(),
            "1.3.6.1.6.3.15.1.1.4.0"
        );

        let list = VarBindList::try_from(vec![VarBind::new(
            ReportKind::NotInTimeWindows.oid(),
            Value::Counter32(3),
        )])
        .unwrap();
        assert_eq!(
            ReportKind::classify(&list),
            Some(ReportKind::NotInTimeWindows)
        );
        assert_eq!(ReportKind::classify(&VarBindList::new()), None);
    }
}
