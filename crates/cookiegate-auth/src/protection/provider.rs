//! AES-256-GCM data protection over an HKDF-derived, purpose-bound subkey.
//!
//! Payload layout:
//!
//! ```text
//! magic (4) | key id (16) | nonce (12) | ciphertext + tag
//! ```
//!
//! The magic header and key id are authenticated as associated data.

use std::collections::HashMap;
use std::sync::Arc;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use sha2::Sha256;

use cookiegate_core::config::DataProtectionConfig;
use cookiegate_core::error::AppError;
use cookiegate_core::result::AppResult;
use cookiegate_core::traits::{DataProtectionProvider, DataProtector};
use cookiegate_core::types::{KeyId, PurposeChain};

use super::key_ring::{KeyRing, MasterKey};

/// Header identifying payloads produced by this provider.
pub const MAGIC_HEADER: [u8; 4] = [0x09, 0xF0, 0xC9, 0xF0];

const KEY_ID_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC_HEADER.len() + KEY_ID_LEN;

/// HKDF label separating subkeys of this provider from other uses of the
/// same master secret.
const SUBKEY_LABEL: &[u8] = b"cookiegate.data-protection.v1";

/// Default provider backed by an in-process key ring.
#[derive(Debug, Clone)]
pub struct KeyRingDataProtectionProvider {
    key_ring: Arc<KeyRing>,
    application_name: String,
}

impl KeyRingDataProtectionProvider {
    pub fn new(key_ring: KeyRing, application_name: impl Into<String>) -> Self {
        Self {
            key_ring: Arc::new(key_ring),
            application_name: application_name.into(),
        }
    }

    /// Builds a provider from the `[data_protection]` configuration section.
    pub fn from_config(config: &DataProtectionConfig) -> AppResult<Self> {
        let key_ring = KeyRing::from_config(config)?;
        Ok(Self::new(key_ring, config.application_name.clone()))
    }

    /// Provider with a single ephemeral key.
    pub fn ephemeral(application_name: impl Into<String>) -> Self {
        Self::new(KeyRing::ephemeral(), application_name)
    }

    fn derive_cipher(&self, key: &MasterKey, purposes: &PurposeChain) -> AppResult<Aes256Gcm> {
        let mut info = Vec::with_capacity(SUBKEY_LABEL.len() + 64);
        info.extend_from_slice(SUBKEY_LABEL);
        info.extend_from_slice(&purposes.to_bytes());

        let hk = Hkdf::<Sha256>::new(Some(self.application_name.as_bytes()), key.secret());
        let mut subkey = [0u8; 32];
        hk.expand(&info, &mut subkey)
            .map_err(|e| AppError::internal(format!("Subkey derivation failed: {e}")))?;

        Aes256Gcm::new_from_slice(&subkey)
            .map_err(|e| AppError::internal(format!("Invalid subkey length: {e}")))
    }
}

impl DataProtectionProvider for KeyRingDataProtectionProvider {
    fn create_protector(&self, purposes: &PurposeChain) -> AppResult<Arc<dyn DataProtector>> {
        let mut ciphers = HashMap::with_capacity(self.key_ring.len());
        for key in self.key_ring.keys() {
            ciphers.insert(key.id(), self.derive_cipher(key, purposes)?);
        }

        tracing::debug!(
            purposes = %purposes,
            keys = ciphers.len(),
            "Created key ring protector"
        );

        Ok(Arc::new(KeyRingProtector {
            purposes: purposes.clone(),
            default_key: self.key_ring.default_key(),
            ciphers,
        }))
    }
}

/// Protector holding one derived cipher per key in the ring.
pub struct KeyRingProtector {
    purposes: PurposeChain,
    default_key: KeyId,
    ciphers: HashMap<KeyId, Aes256Gcm>,
}

impl std::fmt::Debug for KeyRingProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRingProtector")
            .field("purposes", &self.purposes)
            .field("default_key", &self.default_key)
            .finish_non_exhaustive()
    }
}

impl DataProtector for KeyRingProtector {
    fn purposes(&self) -> &PurposeChain {
        &self.purposes
    }

    fn protect(&self, plaintext: &[u8]) -> AppResult<Vec<u8>> {
        let cipher = self
            .ciphers
            .get(&self.default_key)
            .ok_or_else(|| AppError::internal("Default key has no derived cipher"))?;

        let mut header = Vec::with_capacity(HEADER_LEN);
        header.extend_from_slice(&MAGIC_HEADER);
        header.extend_from_slice(self.default_key.as_bytes());

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: &header,
                },
            )
            .map_err(|_| AppError::internal("Payload encryption failed"))?;

        let mut out = header;
        out.reserve(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn unprotect(&self, protected: &[u8]) -> AppResult<Vec<u8>> {
        if protected.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(AppError::invalid_ticket("Protected payload is truncated"));
        }

        let (header, rest) = protected.split_at(HEADER_LEN);
        if header[..MAGIC_HEADER.len()] != MAGIC_HEADER {
            return Err(AppError::invalid_ticket("Protected payload has a bad header"));
        }

        let mut key_bytes = [0u8; KEY_ID_LEN];
        key_bytes.copy_from_slice(&header[MAGIC_HEADER.len()..]);
        let key_id = KeyId::from_bytes(key_bytes);
        let cipher = self.ciphers.get(&key_id).ok_or_else(|| {
            AppError::invalid_ticket(format!("Key {key_id} is not in the key ring"))
        })?;

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| AppError::invalid_ticket("Protected payload failed verification"))
    }
}

#[cfg(test)]
mod tests {
    use cookiegate_core::error::ErrorKind;

    use super::*;

    fn chain(scheme: &str) -> PurposeChain {
        PurposeChain::new(["component", scheme, "v2"])
    }

    #[test]
    fn test_protect_unprotect() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let protector = provider.create_protector(&chain("a")).expect("protector");
        let sealed = protector.protect(b"hello").expect("protect");
        assert_eq!(&sealed[..4], &MAGIC_HEADER);
        assert_eq!(protector.unprotect(&sealed).expect("unprotect"), b"hello");
    }

    #[test]
    fn test_nonce_randomizes_output() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let protector = provider.create_protector(&chain("a")).expect("protector");
        let first = protector.protect(b"same").expect("protect");
        let second = protector.protect(b"same").expect("protect");
        assert_ne!(first, second);
    }

    #[test]
    fn test_purpose_mismatch_fails() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let a = provider.create_protector(&chain("a")).expect("protector");
        let b = provider.create_protector(&chain("b")).expect("protector");
        let sealed = a.protect(b"hello").expect("protect");
        let err = b.unprotect(&sealed).expect_err("purpose mismatch");
        assert_eq!(err.kind, ErrorKind::InvalidTicket);
    }

    #[test]
    fn test_application_name_isolates() {
        let ring = KeyRing::ephemeral();
        let shop = KeyRingDataProtectionProvider::new(ring.clone(), "shop");
        let blog = KeyRingDataProtectionProvider::new(ring, "blog");
        let sealed = shop
            .create_protector(&chain("a"))
            .expect("protector")
            .protect(b"hello")
            .expect("protect");
        assert!(
            blog.create_protector(&chain("a"))
                .expect("protector")
                .unprotect(&sealed)
                .is_err()
        );
    }

    #[test]
    fn test_same_keys_interoperate_across_providers() {
        let ring = KeyRing::ephemeral();
        let issuer = KeyRingDataProtectionProvider::new(ring.clone(), "app");
        let reader = KeyRingDataProtectionProvider::new(ring, "app");
        let sealed = issuer
            .create_protector(&chain("a"))
            .expect("protector")
            .protect(b"hello")
            .expect("protect");
        let opened = reader
            .create_protector(&chain("a"))
            .expect("protector")
            .unprotect(&sealed)
            .expect("unprotect");
        assert_eq!(opened, b"hello");
    }

    #[test]
    fn test_retired_key_still_unprotects() {
        let old = MasterKey::generate();
        let old_provider = KeyRingDataProtectionProvider::new(KeyRing::new(old.clone()), "app");
        let sealed = old_provider
            .create_protector(&chain("a"))
            .expect("protector")
            .protect(b"hello")
            .expect("protect");

        let rotated = KeyRing::new(MasterKey::generate()).with_retired(old);
        let new_provider = KeyRingDataProtectionProvider::new(rotated, "app");
        let protector = new_provider.create_protector(&chain("a")).expect("protector");
        assert_eq!(protector.unprotect(&sealed).expect("unprotect"), b"hello");

        let fresh = protector.protect(b"hello").expect("protect");
        assert_ne!(&fresh[4..20], &sealed[4..20]);
    }

    #[test]
    fn test_unknown_key_fails() {
        let a = KeyRingDataProtectionProvider::ephemeral("app");
        let b = KeyRingDataProtectionProvider::ephemeral("app");
        let sealed = a
            .create_protector(&chain("a"))
            .expect("protector")
            .protect(b"hello")
            .expect("protect");
        assert!(
            b.create_protector(&chain("a"))
                .expect("protector")
                .unprotect(&sealed)
                .is_err()
        );
    }

    #[test]
    fn test_every_bit_flip_detected() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let protector = provider.create_protector(&chain("a")).expect("protector");
        let sealed = protector.protect(b"payload").expect("protect");
        for byte in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    protector.unprotect(&tampered).is_err(),
                    "flip at byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_truncated_payload_fails() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let protector = provider.create_protector(&chain("a")).expect("protector");
        let sealed = protector.protect(b"payload").expect("protect");
        assert!(protector.unprotect(&sealed[..sealed.len() - 1]).is_err());
        assert!(protector.unprotect(&[]).is_err());
    }
}
