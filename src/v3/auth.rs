//! Authentication key derivation and HMAC operations (RFC 3414, RFC 7860).
//!
//! This module implements:
//! - Password-to-key derivation (1MB expansion + hash), producing a [`MasterKey`]
//! - Key localization (binding the master key to an engine ID)
//! - Blumenthal key extension for privacy keys longer than the digest
//! - HMAC signing and constant-time verification of whole messages
//!
//! The master key is the expensive step (about a megabyte of hashing), so
//! it is computed once per credential and localized cheaply per engine.

use digest::core_api::BlockSizeUser;
use digest::{Digest, KeyInit, Mac, OutputSizeUser};
use hmac::SimpleHmac;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::AuthProtocol;
use crate::error::{AuthErrorKind, Error, Result};

/// Minimum password length recommended by net-snmp.
///
/// Shorter passwords are accepted but logged at `WARN`.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const EXPANSION_SIZE: usize = 1_048_576;

// Longest truncated MAC (HMAC-SHA-512 carries 48 bytes).
const ZEROS: [u8; 48] = [0u8; 48];

/// Non-localized key derived from a password (Ku in RFC 3414).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: AuthProtocol,
}

impl MasterKey {
    /// Run the RFC 3414 A.2.1 password-to-key transform.
    ///
    /// An empty password yields an all-zero key of the digest length.
    pub fn from_password(protocol: AuthProtocol, password: &[u8]) -> Self {
        if password.len() < MIN_PASSWORD_LENGTH {
            tracing::warn!(
                target: "snmp_wire::usm",
                password_len = password.len(),
                min_len = MIN_PASSWORD_LENGTH,
                "SNMPv3 password is shorter than recommended minimum"
            );
        }
        let key = match protocol {
            AuthProtocol::Md5 => password_to_key::<md5::Md5>(password),
            AuthProtocol::Sha1 => password_to_key::<sha1::Sha1>(password),
            AuthProtocol::Sha224 => password_to_key::<sha2::Sha224>(password),
            AuthProtocol::Sha256 => password_to_key::<sha2::Sha256>(password),
            AuthProtocol::Sha384 => password_to_key::<sha2::Sha384>(password),
            AuthProtocol::Sha512 => password_to_key::<sha2::Sha512>(password),
        };
        Self { key, protocol }
    }

    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Bind this key to an engine: `H(Ku || engine_id || Ku)`.
    pub fn localize(&self, engine_id: &[u8]) -> LocalizedKey {
        let key = match self.protocol {
            AuthProtocol::Md5 => localize::<md5::Md5>(&self.key, engine_id),
            AuthProtocol::Sha1 => localize::<sha1::Sha1>(&self.key, engine_id),
            AuthProtocol::Sha224 => localize::<sha2::Sha224>(&self.key, engine_id),
            AuthProtocol::Sha256 => localize::<sha2::Sha256>(&self.key, engine_id),
            AuthProtocol::Sha384 => localize::<sha2::Sha384>(&self.key, engine_id),
            AuthProtocol::Sha512 => localize::<sha2::Sha512>(&self.key, engine_id),
        };
        LocalizedKey {
            key,
            protocol: self.protocol,
        }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Localized authentication key (Kul in RFC 3414).
///
/// A key that has been derived from a password and bound to a specific engine ID.
/// Key material is zeroed from memory when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LocalizedKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: AuthProtocol,
}

impl LocalizedKey {
    /// Derive a localized key from a password and engine ID in one step.
    pub fn from_password(protocol: AuthProtocol, password: &[u8], engine_id: &[u8]) -> Self {
        MasterKey::from_password(protocol, password).localize(engine_id)
    }

    /// Wrap raw localized key bytes, e.g. from configuration.
    pub fn from_bytes(protocol: AuthProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn mac_len(&self) -> usize {
        self.protocol.mac_len()
    }

    /// Compute the truncated HMAC over the concatenation of `parts`.
    pub fn compute_hmac(&self, parts: &[&[u8]]) -> Result<Vec<u8>> {
        let mac_len = self.protocol.mac_len();
        match self.protocol {
            AuthProtocol::Md5 => hmac_truncated::<md5::Md5>(&self.key, parts, mac_len),
            AuthProtocol::Sha1 => hmac_truncated::<sha1::Sha1>(&self.key, parts, mac_len),
            AuthProtocol::Sha224 => hmac_truncated::<sha2::Sha224>(&self.key, parts, mac_len),
            AuthProtocol::Sha256 => hmac_truncated::<sha2::Sha256>(&self.key, parts, mac_len),
            AuthProtocol::Sha384 => hmac_truncated::<sha2::Sha384>(&self.key, parts, mac_len),
            AuthProtocol::Sha512 => hmac_truncated::<sha2::Sha512>(&self.key, parts, mac_len),
        }
    }

    /// Verify a MAC over `data` in constant time.
    pub fn verify_hmac(&self, data: &[u8], expected: &[u8]) -> bool {
        match self.compute_hmac(&[data]) {
            Ok(computed) => bool::from(computed.as_slice().ct_eq(expected)),
            Err(_) => false,
        }
    }

    /// Sign an encoded message in place.
    ///
    /// `auth_offset` is where the zero-filled msgAuthenticationParameters
    /// content starts. The MAC covers the whole message with that field zeroed.
    pub fn sign_message(&self, message: &mut [u8], auth_offset: usize) -> Result<()> {
        let mac_len = self.mac_len();
        let (head, field, tail) = split_auth_field(message, auth_offset, mac_len)?;
        let zeros = ZEROS.get(..field.len()).unwrap_or_default();
        let mac = self.compute_hmac(&[head, zeros, tail])?;
        let end = auth_offset + mac_len;
        message[auth_offset..end].copy_from_slice(&mac);
        Ok(())
    }

    /// Verify a received message whose msgAuthenticationParameters content
    /// starts at `auth_offset`.
    pub fn verify_message(&self, message: &[u8], auth_offset: usize) -> Result<()> {
        let mac_len = self.mac_len();
        let (head, received, tail) = split_auth_field(message, auth_offset, mac_len)?;
        let zeros = ZEROS.get(..mac_len).unwrap_or_default();
        let computed = self.compute_hmac(&[head, zeros, tail])?;
        if bool::from(computed.as_slice().ct_eq(received)) {
            Ok(())
        } else {
            tracing::debug!(target: "snmp_wire::usm", protocol = %self.protocol, "HMAC mismatch");
            Err(Error::auth(AuthErrorKind::HmacMismatch))
        }
    }
}

impl std::fmt::Debug for LocalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Extend a localized key to `target_len` bytes (draft-blumenthal-aes-usm-04).
///
/// `Kul' = Kul || H(Kul) || H(Kul || H(Kul)) || ...`, truncated. A key that is
/// already long enough is returned unchanged.
pub fn extend_key(protocol: AuthProtocol, key: &[u8], target_len: usize) -> Vec<u8> {
    let mut out = key.to_vec();
    if out.len() >= target_len {
        return out;
    }
    while out.len() < target_len {
        let next = match protocol {
            AuthProtocol::Md5 => hash::<md5::Md5>(&out),
            AuthProtocol::Sha1 => hash::<sha1::Sha1>(&out),
            AuthProtocol::Sha224 => hash::<sha2::Sha224>(&out),
            AuthProtocol::Sha256 => hash::<sha2::Sha256>(&out),
            AuthProtocol::Sha384 => hash::<sha2::Sha384>(&out),
            AuthProtocol::Sha512 => hash::<sha2::Sha512>(&out),
        };
        out.extend_from_slice(&next);
    }
    out.truncate(target_len);
    out
}

fn split_auth_field(
    message: &[u8],
    auth_offset: usize,
    mac_len: usize,
) -> Result<(&[u8], &[u8], &[u8])> {
    let end = auth_offset
        .checked_add(mac_len)
        .filter(|&end| end <= message.len())
        .ok_or_else(|| Error::auth(AuthErrorKind::AuthParamsNotFound))?;
    let (head, rest) = message.split_at(auth_offset);
    let (field, tail) = rest.split_at(end - auth_offset);
    Ok((head, field, tail))
}

fn password_to_key<D>(password: &[u8]) -> Vec<u8>
where
    D: Digest,
{
    if password.is_empty() {
        return vec![0u8; <D as OutputSizeUser>::output_size()];
    }

    let mut hasher = D::new();

    // hashed in 64 byte chunks, matching net-snmp
    let mut buf = [0u8; 64];
    let mut source = password.iter().copied().cycle();
    let mut count = 0;
    while count < EXPANSION_SIZE {
        for (byte, next) in buf.iter_mut().zip(&mut source) {
            *byte = next;
        }
        hasher.update(buf);
        count += buf.len();
    }
    buf.zeroize();

    hasher.finalize().to_vec()
}

fn localize<D>(master_key: &[u8], engine_id: &[u8]) -> Vec<u8>
where
    D: Digest,
{
    let mut hasher = D::new();
    hasher.update(master_key);
    hasher.update(engine_id);
    hasher.update(master_key);
    hasher.finalize().to_vec()
}

fn hash<D>(data: &[u8]) -> Vec<u8>
where
    D: Digest,
{
    D::digest(data).to_vec()
}

fn hmac_truncated<D>(key: &[u8], parts: &[&[u8]], mac_len: usize) -> Result<Vec<u8>>
where
    D: Digest + BlockSizeUser,
{
    let mut mac = <SimpleHmac<D> as KeyInit>::new_from_slice(key)
        .map_err(|_| Error::auth(AuthErrorKind::NoAuthKey))?;
    for part in parts {
        Mac::update(&mut mac, part);
    }
    let full = mac.finalize().into_bytes();
    let len = mac_len.min(full.len());
    Ok(full[..len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::hex::{encode as encode_hex, fixture};

    #[test]
    fn test_password_to_key_md5() {
        // RFC 3414 A.3.1
        let key = MasterKey::from_password(AuthProtocol::Md5, b"maplesyrup");
        assert_eq!(encode_hex(key.as_bytes()), "9faf3283884e92834ebc9847d8edd963");
    }

    #[test]
    fn test_password_to_key_sha1() {
        // RFC 3414 A.3.2
        let key = MasterKey::from_password(AuthProtocol::Sha1, b"maplesyrup");
        assert_eq!(
            encode_hex(key.as_bytes()),
            "9fb5cc0381497b3793528939ff788d5d79145211"
        );
    }

    #[test]
    fn test_localize_key_md5() {
        let engine_id = fixture("000000000000000000000002");
        let key = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", &engine_id);
        assert_eq!(encode_hex(key.as_bytes()), "526f5eed9fcce26f8964c2930787d82b");
    }

    #[test]
    fn test_localize_key_sha1() {
        let engine_id = fixture("000000000000000000000002");
        let key = LocalizedKey::from_password(AuthProtocol::Sha1, b"maplesyrup", &engine_id);
        assert_eq!(
            encode_hex(key.as_bytes()),
            "6695febc9288e36282235fc7151f128497b38f3f"
        );
    }

    #[test]
    fn test_master_key_localizes_per_engine() {
        let master = MasterKey::from_password(AuthProtocol::Sha256, b"maplesyrup");
        let a = master.localize(b"engine-a");
        let b = master.localize(b"engine-b");
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.as_bytes().len(), 32);
    }

    #[test]
    fn test_hmac_parts_equal_concatenation() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Sha1, vec![7u8; 20]);
        let whole = key.compute_hmac(&[b"hello world"]).unwrap();
        let split = key.compute_hmac(&[b"hello", b" ", b"world"]).unwrap();
        assert_eq!(whole, split);
        assert_eq!(whole.len(), 12);
    }

    #[test]
    fn test_verify_hmac() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, (1u8..=16).collect::<Vec<_>>());
        let mac = key.compute_hmac(&[b"test message"]).unwrap();
        assert!(key.verify_hmac(b"test message", &mac));

        let mut wrong = mac.clone();
        wrong[0] ^= 0xFF;
        assert!(!key.verify_hmac(b"test message", &wrong));
        assert!(!key.verify_hmac(b"test message", &mac[..11]));
    }

    #[test]
    fn test_sign_then_verify_message() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Sha256, vec![3u8; 32]);
        let mut msg = vec![0xAAu8; 10];
        msg.extend_from_slice(&[0u8; 24]);
        msg.extend_from_slice(&[0xBBu8; 10]);

        key.sign_message(&mut msg, 10).unwrap();
        assert!(msg[10..34].iter().any(|&b| b != 0));
        key.verify_message(&msg, 10).unwrap();

        msg[40] ^= 0x01;
        let err = key.verify_message(&msg, 10).unwrap_err();
        assert!(matches!(
            err,
            Error::AuthenticationFailed {
                kind: AuthErrorKind::HmacMismatch
            }
        ));
    }

    #[test]
    fn test_auth_offset_out_of_bounds() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, vec![1u8; 16]);
        let mut msg = vec![0u8; 20];
        assert!(key.sign_message(&mut msg, 10).is_err());
        assert!(key.verify_message(&msg, usize::MAX).is_err());
    }

    #[test]
    fn test_empty_password() {
        let key = MasterKey::from_password(AuthProtocol::Md5, b"");
        assert_eq!(key.as_bytes(), &[0u8; 16]);
    }

    #[test]
    fn test_extend_key() {
        let short = vec![0x11u8; 20];
        let extended = extend_key(AuthProtocol::Sha1, &short, 32);
        assert_eq!(extended.len(), 32);
        assert_eq!(&extended[..20], short.as_slice());
        let h = sha1::Sha1::digest(&short);
        assert_eq!(&extended[20..], &h[..12]);

        let long = vec![0x22u8; 32];
        assert_eq!(extend_key(AuthProtocol::Sha256, &long, 24), long);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, vec![0xABu8; 16]);
        let shown = format!("{:?}", key);
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("171"));
    }
}
