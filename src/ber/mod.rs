//! ASN.1 BER codec for the SNMP subset of X.690.
//!
//! - [`EncodeBuf`] - reverse-order encoder producing definite-length output
//! - [`Decoder`] - bounds-checked zero-copy decoder over [`bytes::Bytes`]
//! - [`tag`] - tag constants for universal, SMI, exception and PDU types

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::Decoder;
pub use encode::{
    EncodeBuf, integer_content_len, tlv_len, unsigned32_content_len, unsigned64_content_len,
};
pub use length::{MAX_LENGTH, decode_length, encode_length, length_encoded_len};
