//! Master keys and the key ring used by the default provider.

use std::collections::HashMap;

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use cookiegate_core::config::{DataProtectionConfig, KeySettings};
use cookiegate_core::error::AppError;
use cookiegate_core::types::KeyId;

/// Size of a master secret in bytes.
pub const MASTER_KEY_LEN: usize = 32;

/// A 256-bit master secret and its identifier.
#[derive(Clone)]
pub struct MasterKey {
    id: KeyId,
    secret: [u8; MASTER_KEY_LEN],
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl MasterKey {
    pub fn new(id: KeyId, secret: [u8; MASTER_KEY_LEN]) -> Self {
        Self { id, secret }
    }

    /// Generates a fresh random key from the OS RNG.
    pub fn generate() -> Self {
        let mut secret = [0u8; MASTER_KEY_LEN];
        OsRng.fill_bytes(&mut secret);
        Self::new(KeyId::new(), secret)
    }

    /// Decodes a key from its configuration entry.
    pub fn from_settings(settings: &KeySettings) -> Result<Self, AppError> {
        let bytes = BASE64.decode(settings.secret.trim()).map_err(|e| {
            AppError::configuration(format!("Key {} is not valid base64: {e}", settings.id))
        })?;
        let secret: [u8; MASTER_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            AppError::configuration(format!(
                "Key {} must be {MASTER_KEY_LEN} bytes, got {}",
                settings.id,
                bytes.len()
            ))
        })?;
        Ok(Self::new(settings.id, secret))
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub(crate) fn secret(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.secret
    }

    /// Base64 encoding of the secret, for writing configuration.
    pub fn secret_base64(&self) -> String {
        BASE64.encode(self.secret)
    }
}

/// One default key used for new payloads plus any retired keys still
/// accepted when unprotecting.
#[derive(Debug, Clone)]
pub struct KeyRing {
    default_key: KeyId,
    keys: HashMap<KeyId, MasterKey>,
}

impl KeyRing {
    /// Creates a ring holding a single default key.
    pub fn new(default_key: MasterKey) -> Self {
        let id = default_key.id();
        let mut keys = HashMap::new();
        keys.insert(id, default_key);
        Self {
            default_key: id,
            keys,
        }
    }

    /// Creates a ring with one freshly generated key.
    ///
    /// Payloads protected under an ephemeral ring cannot be read by any
    /// other process or after a restart.
    pub fn ephemeral() -> Self {
        Self::new(MasterKey::generate())
    }

    /// Adds a key that can still unprotect but is never used to protect.
    pub fn with_retired(mut self, key: MasterKey) -> Self {
        self.keys.entry(key.id()).or_insert(key);
        self
    }

    /// Builds a ring from configuration, falling back to an ephemeral key.
    pub fn from_config(config: &DataProtectionConfig) -> Result<Self, AppError> {
        if config.is_ephemeral() {
            tracing::warn!(
                application = %config.application_name,
                "No data protection keys configured; using an ephemeral key. \
                 Issued cookies will not survive a restart"
            );
            return Ok(Self::ephemeral());
        }

        let mut keys = HashMap::with_capacity(config.keys.len());
        for settings in &config.keys {
            let key = MasterKey::from_settings(settings)?;
            if keys.insert(key.id(), key).is_some() {
                return Err(AppError::configuration(format!(
                    "Duplicate data protection key id {}",
                    settings.id
                )));
            }
        }

        let default_key = match config.default_key {
            Some(id) => id,
            None => config.keys[0].id,
        };
        if !keys.contains_key(&default_key) {
            return Err(AppError::configuration(format!(
                "Default key {default_key} is not present in the key ring"
            )));
        }

        tracing::info!(
            application = %config.application_name,
            keys = keys.len(),
            default_key = %default_key,
            "Data protection key ring loaded"
        );
        Ok(Self { default_key, keys })
    }

    pub fn default_key(&self) -> KeyId {
        self.default_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &MasterKey> {
        self.keys.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}
