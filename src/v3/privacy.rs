//! Privacy (encryption) protocols for SNMPv3 (RFC 3414, RFC 3826).
//!
//! This module implements:
//! - DES-CBC privacy (RFC 3414 Section 8)
//! - AES-128/192/256-CFB privacy (RFC 3826)
//!
//! # Salt/IV Construction
//!
//! ## DES-CBC
//! - Salt (privParameters): engineBoots (4 bytes) || counter (4 bytes) = 8 bytes
//! - IV: pre-IV XOR salt (pre-IV is last 8 bytes of 16-byte privKey)
//!
//! ## AES-CFB-128
//! - Salt (privParameters): 64-bit counter = 8 bytes
//! - IV: engineBoots (4 bytes) || engineTime (4 bytes) || salt (8 bytes) = 16 bytes
//!   (concatenation, NOT XOR)

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::PrivProtocol;
use super::auth::{LocalizedKey, extend_key};
use crate::error::{CryptoErrorKind, Error, Result};

const SALT_LEN: usize = 8;

/// Thread-safe salt source shared by every encryption under one credential.
///
/// Seeded from the OS random source so two processes sharing a key do not
/// reuse IVs. Never yields zero.
#[derive(Debug)]
pub struct SaltCounter(AtomicU64);

impl SaltCounter {
    /// Seed a new counter from `getrandom`.
    pub fn new() -> Result<Self> {
        let mut buf = [0u8; 8];
        loop {
            getrandom::fill(&mut buf)
                .map_err(|_| Error::encrypt(CryptoErrorKind::RandomUnavailable))?;
            let val = u64::from_ne_bytes(buf);
            if val != 0 {
                return Ok(Self(AtomicU64::new(val)));
            }
        }
    }

    /// Start from a fixed value, for reproducible ciphertext in tests.
    #[cfg(any(test, feature = "testing"))]
    pub fn from_value(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    /// Get the next salt value and increment the counter.
    ///
    /// Zero is skipped on wraparound, matching net-snmp.
    pub fn next(&self) -> u64 {
        let val = self.0.fetch_add(1, Ordering::SeqCst);
        if val == 0 {
            self.0.fetch_add(1, Ordering::SeqCst)
        } else {
            val
        }
    }
}

/// Privacy key for encryption/decryption operations.
///
/// Built from the localized key of the authentication protocol. When that
/// key is shorter than the cipher needs (AES-192/256 with MD5 or SHA-1) it
/// is extended with the Blumenthal algorithm.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: PrivProtocol,
}

impl PrivKey {
    /// Derive from a localized key, extending it when it is too short.
    pub fn from_localized(localized: &LocalizedKey, protocol: PrivProtocol) -> Self {
        let auth = localized.protocol();
        let key = if auth.is_compatible_with(protocol) {
            localized.as_bytes().to_vec()
        } else {
            tracing::debug!(
                target: "snmp_wire::usm",
                auth_protocol = %auth,
                priv_protocol = %protocol,
                "extending privacy key"
            );
            extend_key(auth, localized.as_bytes(), protocol.key_len())
        };
        Self { key, protocol }
    }

    /// Wrap raw localized key bytes.
    pub fn from_bytes(protocol: PrivProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> PrivProtocol {
        self.protocol
    }

    fn cipher_key(&self, len: usize) -> Result<&[u8]> {
        self.key
            .get(..len)
            .ok_or_else(|| Error::encrypt(CryptoErrorKind::InvalidKeyLength))
    }

    /// Encrypt a serialized scoped PDU, returning (ciphertext, privParameters).
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        match self.protocol {
            PrivProtocol::Des => self.encrypt_des(plaintext, engine_boots, salt),
            PrivProtocol::Aes128 | PrivProtocol::Aes192 | PrivProtocol::Aes256 => {
                self.encrypt_aes(plaintext, engine_boots, engine_time, salt)
            }
        }
    }

    /// Decrypt msgData using the privParameters from the message.
    ///
    /// DES output keeps its padding; the caller decodes the leading
    /// scoped PDU and ignores what follows.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        priv_params: &[u8],
    ) -> Result<Bytes> {
        let Ok(salt) = <[u8; SALT_LEN]>::try_from(priv_params) else {
            return Err(Error::decrypt(CryptoErrorKind::InvalidPrivParamsLength {
                expected: SALT_LEN,
                actual: priv_params.len(),
            }));
        };

        match self.protocol {
            PrivProtocol::Des => self.decrypt_des(ciphertext, &salt),
            PrivProtocol::Aes128 | PrivProtocol::Aes192 | PrivProtocol::Aes256 => {
                self.decrypt_aes(ciphertext, engine_boots, engine_time, &salt)
            }
        }
    }

    fn des_iv(&self, salt: &[u8; SALT_LEN]) -> Result<[u8; 8]> {
        let pre_iv = self
            .key
            .get(8..16)
            .ok_or_else(|| Error::encrypt(CryptoErrorKind::InvalidKeyLength))?;
        let mut iv = [0u8; 8];
        for ((out, p), s) in iv.iter_mut().zip(pre_iv).zip(salt) {
            *out = p ^ s;
        }
        Ok(iv)
    }

    /// DES-CBC encryption (RFC 3414 Section 8.1.1).
    fn encrypt_des(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        counter: u64,
    ) -> Result<(Bytes, Bytes)> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
        type DesCbc = cbc::Encryptor<des::Des>;

        let mut salt = [0u8; SALT_LEN];
        salt[..4].copy_from_slice(&engine_boots.to_be_bytes());
        salt[4..].copy_from_slice(&(counter as u32).to_be_bytes());

        let key = self.cipher_key(8)?;
        let iv = self.des_iv(&salt)?;

        // zero padding up to the block boundary
        let padded_len = plaintext.len().div_ceil(8) * 8;
        let mut buffer = vec![0u8; padded_len];
        buffer[..plaintext.len()].copy_from_slice(plaintext);

        let cipher = DesCbc::new_from_slices(key, &iv)
            .map_err(|_| Error::encrypt(CryptoErrorKind::InvalidKeyLength))?;
        cipher
            .encrypt_padded_mut::<NoPadding>(&mut buffer, padded_len)
            .map_err(|_| Error::encrypt(CryptoErrorKind::CipherError))?;

        Ok((Bytes::from(buffer), Bytes::copy_from_slice(&salt)))
    }

    /// DES-CBC decryption (RFC 3414 Section 8.1.1).
    fn decrypt_des(&self, ciphertext: &[u8], salt: &[u8; SALT_LEN]) -> Result<Bytes> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
        type DesCbc = cbc::Decryptor<des::Des>;

        if ciphertext.is_empty() || !ciphertext.len().is_multiple_of(8) {
            return Err(Error::decrypt(CryptoErrorKind::InvalidCiphertextLength {
                length: ciphertext.len(),
                block_size: 8,
            }));
        }

        let key = self
            .key
            .get(..8)
            .ok_or_else(|| Error::decrypt(CryptoErrorKind::InvalidKeyLength))?;
        let iv = self
            .des_iv(salt)
            .map_err(|_| Error::decrypt(CryptoErrorKind::InvalidKeyLength))?;

        let cipher = DesCbc::new_from_slices(key, &iv)
            .map_err(|_| Error::decrypt(CryptoErrorKind::InvalidKeyLength))?;
        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|_| Error::decrypt(CryptoErrorKind::CipherError))?;

        Ok(Bytes::from(buffer))
    }

    fn aes_iv(engine_boots: u32, engine_time: u32, salt: &[u8; SALT_LEN]) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..4].copy_from_slice(&engine_boots.to_be_bytes());
        iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
        iv[8..].copy_from_slice(salt);
        iv
    }

    /// AES-CFB encryption (RFC 3826 Section 3.1).
    fn encrypt_aes(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        use aes::{Aes128, Aes192, Aes256};
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};

        let salt = salt.to_be_bytes();
        let iv = Self::aes_iv(engine_boots, engine_time, &salt);
        let key = self.cipher_key(self.protocol.key_len())?;
        let mut buffer = plaintext.to_vec();

        let bad_key = |_| Error::encrypt(CryptoErrorKind::InvalidKeyLength);
        match self.protocol {
            PrivProtocol::Aes192 => cfb_mode::Encryptor::<Aes192>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .encrypt(&mut buffer),
            PrivProtocol::Aes256 => cfb_mode::Encryptor::<Aes256>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .encrypt(&mut buffer),
            _ => cfb_mode::Encryptor::<Aes128>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .encrypt(&mut buffer),
        }

        Ok((Bytes::from(buffer), Bytes::copy_from_slice(&salt)))
    }

    /// AES-CFB decryption (RFC 3826 Section 3.1.4).
    fn decrypt_aes(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: &[u8; SALT_LEN],
    ) -> Result<Bytes> {
        use aes::{Aes128, Aes192, Aes256};
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};

        if ciphertext.is_empty() {
            return Err(Error::decrypt(CryptoErrorKind::InvalidCiphertextLength {
                length: 0,
                block_size: 1,
            }));
        }

        let iv = Self::aes_iv(engine_boots, engine_time, salt);
        let key = self
            .key
            .get(..self.protocol.key_len())
            .ok_or_else(|| Error::decrypt(CryptoErrorKind::InvalidKeyLength))?;
        let mut buffer = ciphertext.to_vec();

        let bad_key = |_| Error::decrypt(CryptoErrorKind::InvalidKeyLength);
        match self.protocol {
            PrivProtocol::Aes192 => cfb_mode::Decryptor::<Aes192>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .decrypt(&mut buffer),
            PrivProtocol::Aes256 => cfb_mode::Decryptor::<Aes256>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .decrypt(&mut buffer),
            _ => cfb_mode::Decryptor::<Aes128>::new_from_slices(key, &iv)
                .map_err(bad_key)?
                .decrypt(&mut buffer),
        }

        Ok(Bytes::from(buffer))
    }
}

impl std::fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
