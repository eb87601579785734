//! Injectable instrumentation for the codec.
//!
//! The codec reports through a [`CodecMetrics`] trait object handed to it
//! at construction. There are no process-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ErrorClass;
use crate::version::Version;

/// Codec event sink. Every method defaults to a no-op.
pub trait CodecMetrics: Send + Sync + std::fmt::Debug {
    /// A message of `bytes` octets was produced.
    fn message_encoded(&self, _version: Version, _bytes: usize) {}

    /// A message of `bytes` octets was accepted.
    fn message_decoded(&self, _version: Version, _bytes: usize) {}

    /// Decoding failed.
    fn decode_failed(&self, _class: ErrorClass) {}

    /// An incoming MAC did not verify.
    fn auth_failed(&self) {}

    /// An authenticated message fell outside the time window.
    fn not_in_time_window(&self) {}

    /// A discovery report seeded a new engine entry.
    fn engine_discovered(&self) {}

    /// The buffer pool was empty and a fresh buffer was allocated.
    fn buffer_allocated(&self) {}

    /// A pooled buffer was reused.
    fn buffer_reused(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl CodecMetrics for NoopMetrics {}

/// Counts events into atomics.
///
/// ```
/// use snmp_wire::metrics::{AtomicMetrics, CodecMetrics};
///
/// let metrics = AtomicMetrics::new();
/// metrics.auth_failed();
/// assert_eq!(metrics.snapshot().auth_failures, 1);
/// ```
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    encoded: AtomicU64,
    encoded_bytes: AtomicU64,
    decoded: AtomicU64,
    decoded_bytes: AtomicU64,
    decode_failures: AtomicU64,
    auth_failures: AtomicU64,
    time_window_failures: AtomicU64,
    engines_discovered: AtomicU64,
    buffers_allocated: AtomicU64,
    buffers_reused: AtomicU64,
}

/// Point-in-time copy of [`AtomicMetrics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub encoded: u64,
    pub encoded_bytes: u64,
    pub decoded: u64,
    pub decoded_bytes: u64,
    pub decode_failures: u64,
    pub auth_failures: u64,
    pub time_window_failures: u64,
    pub engines_discovered: u64,
    pub buffers_allocated: u64,
    pub buffers_reused: u64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            encoded: self.encoded.load(Ordering::Relaxed),
            encoded_bytes: self.encoded_bytes.load(Ordering::Relaxed),
            decoded: self.decoded.load(Ordering::Relaxed),
            decoded_bytes: self.decoded_bytes.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            time_window_failures: self.time_window_failures.load(Ordering::Relaxed),
            engines_discovered: self.engines_discovered.load(Ordering::Relaxed),
            buffers_allocated: self.buffers_allocated.load(Ordering::Relaxed),
            buffers_reused: self.buffers_reused.load(Ordering::Relaxed),
        }
    }
}

impl CodecMetrics for AtomicMetrics {
    fn message_encoded(&self, _version: Version, bytes: usize) {
        self.encoded.fetch_add(1, Ordering::Relaxed);
        self.encoded_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn message_decoded(&self, _version: Version, bytes: usize) {
        self.decoded.fetch_add(1, Ordering::Relaxed);
        self.decoded_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn decode_failed(&self, _class: ErrorClass) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn auth_failed(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn not_in_time_window(&self) {
        self.time_window_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn engine_discovered(&self) {
        self.engines_discovered.fetch_add(1, Ordering::Relaxed);
    }

    fn buffer_allocated(&self) {
        self.buffers_allocated.fetch_add(1, Ordering::Relaxed);
    }

    fn buffer_reused(&self) {
        self.buffers_reused.fetch_add(1, Ordering::Relaxed);
    }
}
