//! Data protection key material configuration.

use serde::{Deserialize, Serialize};

use crate::types::KeyId;

/// Key ring configuration for the default data protection provider.
///
/// Every process that must read cookies issued by another process needs
/// the same `application_name` and the same keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProtectionConfig {
    /// Discriminator isolating this application's payloads from others
    /// sharing the same keys.
    #[serde(default = "default_application_name")]
    pub application_name: String,
    /// Master keys. Empty means an ephemeral key is generated at startup.
    #[serde(default)]
    pub keys: Vec<KeySettings>,
    /// Key used to protect new payloads. Defaults to the first key.
    #[serde(default)]
    pub default_key: Option<KeyId>,
}

/// A single master key entry.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeySettings {
    /// Stable key identifier embedded in protected payloads.
    pub id: KeyId,
    /// Base64 (standard alphabet) encoding of a 32-byte secret.
    pub secret: String,
}

impl std::fmt::Debug for KeySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySettings")
            .field("id", &self.id)
            .field("secret", &"****")
            .finish()
    }
}

impl Default for DataProtectionConfig {
    fn default() -> Self {
        Self {
            application_name: default_application_name(),
            keys: Vec::new(),
            default_key: None,
        }
    }
}

impl DataProtectionConfig {
    /// Whether no persistent key material is configured.
    pub fn is_ephemeral(&self) -> bool {
        self.keys.is_empty()
    }
}

fn default_application_name() -> String {
    "cookiegate".to_string()
}
