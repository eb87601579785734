// Error carries engine IDs and decode offsets inline.
#![allow(clippy::result_large_err)]

//! # snmp-wire
//!
//! SNMP message codec: BER, v1/v2c community messages and SNMPv3 with the
//! User-based Security Model. No sockets, no retries; the transport hands
//! datagrams in and takes datagrams out.
//!
//! ## Features
//!
//! - BER encoding/decoding with strict definite-length checks
//! - v1/v2c and v3 PDUs behind a single [`Pdu`] type
//! - USM authentication (HMAC-MD5/SHA family) and privacy (DES, AES-CFB)
//! - Shared [`EngineCache`] for discovery and time-window tracking
//! - Config-map construction via [`PduConfig`]
//!
//! ## Community example
//!
//! ```
//! use snmp_wire::{Codec, PduType, V2cPdu, VarBindList, oid};
//! use snmp_wire::v3::SecurityParameters;
//! use std::sync::Arc;
//!
//! let codec = Codec::default();
//! let mut pdu = V2cPdu::new(PduType::GetRequest, "public")?;
//! pdu.set_request_id(42);
//! pdu.set_varbinds(VarBindList::from_oids(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)])?);
//!
//! let wire = codec.encode(&pdu.into())?;
//! let unused = Arc::new(SecurityParameters::discovery()?);
//! let decoded = codec.decode(wire, &unused)?;
//! assert_eq!(decoded.request_id(), 42);
//! # Ok::<(), snmp_wire::Error>(())
//! ```
//!
//! ## SNMPv3 example
//!
//! ```
//! use snmp_wire::{Codec, PduType, V3Pdu};
//! use snmp_wire::v3::{AuthProtocol, EngineRecord, PrivProtocol, SecurityParameters};
//! use std::sync::Arc;
//!
//! let user = Arc::new(
//!     SecurityParameters::new("admin")?
//!         .with_auth(AuthProtocol::Sha256, b"authpass123")?
//!         .with_privacy(PrivProtocol::Aes128, b"privpass123")?,
//! );
//!
//! let mut pdu = V3Pdu::new(PduType::GetRequest, Arc::clone(&user));
//! pdu.set_request_id(7);
//! pdu.set_engine(Some(EngineRecord::new(&b"\x80\x00\x1f\x88\x04test"[..], 1, 100)?));
//!
//! let codec = Codec::default();
//! let wire = codec.encode(&pdu.into())?;
//! let decoded = codec.decode(wire, &user)?;
//! assert_eq!(decoded.request_id(), 7);
//! # Ok::<(), snmp_wire::Error>(())
//! ```

pub mod ber;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod metrics;
pub mod oid;
pub mod pdu;
pub mod pool;
pub mod v3;
pub mod value;
pub mod varbind;
pub mod version;

pub use codec::Codec;
pub use config::{CodecConfig, PduConfig};
pub use error::{
    AuthErrorKind, CryptoErrorKind, DecodeErrorKind, EncodeErrorKind, Error, ErrorClass,
    ErrorStatus, OidErrorKind, Result,
};
pub use message::{CommunityMessage, Message, V3Message};
pub use metrics::{AtomicMetrics, CodecMetrics, MetricsSnapshot, NoopMetrics};
pub use oid::Oid;
pub use pdu::{Pdu, PduType, RawPdu, V2cPdu, V3Pdu};
pub use pool::BufferPool;
pub use v3::{
    AuthProtocol, EngineCache, EngineRecord, EngineState, PrivProtocol, SecurityLevel,
    SecurityParameters,
};
pub use value::Value;
pub use varbind::{VarBind, VarBindList};
pub use version::Version;
