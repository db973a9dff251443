//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod data_protection;
pub mod logging;
pub mod scheme;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use self::data_protection::{DataProtectionConfig, KeySettings};
pub use self::logging::LoggingConfig;
pub use self::scheme::SchemeSettings;

use crate::error::AppError;

/// Environment variable prefix for overrides (`COOKIEGATE__LOGGING__LEVEL`).
const ENV_PREFIX: &str = "COOKIEGATE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Key material for the default data protection provider.
    #[serde(default)]
    pub data_protection: DataProtectionConfig,
    /// Cookie authentication schemes keyed by scheme name.
    #[serde(default)]
    pub schemes: BTreeMap<String, SchemeSettings>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; values may also come entirely from
    /// environment variables prefixed with `COOKIEGATE`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(
            path,
            schemes = app_config.schemes.len(),
            "Configuration loaded"
        );
        Ok(app_config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.data_protection.application_name, "cookiegate");
        assert!(config.data_protection.is_ephemeral());
        assert!(config.schemes.is_empty());
    }

    #[test]
    fn test_schemes_section() {
        let config = AppConfig::from_toml_str(
            r#"
            [schemes.admin]
            cookie_name = "admin_session"
            login_path = "/admin/login"
            expire_minutes = 30

            [schemes.cookies]
            http_only = false
            "#,
        )
        .expect("parse");

        let admin = &config.schemes["admin"];
        assert_eq!(admin.cookie_name.as_deref(), Some("admin_session"));
        assert_eq!(
            admin.login_path.as_ref().map(|p| p.as_str()),
            Some("/admin/login")
        );
        assert_eq!(admin.expire_minutes, Some(30));
        assert_eq!(config.schemes["cookies"].http_only, Some(false));
        assert_eq!(config.schemes["cookies"].cookie_name, None);
    }

    #[test]
    fn test_relative_login_path_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [schemes.admin]
            login_path = "admin/login"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_key_entries() {
        let config = AppConfig::from_toml_str(
            r#"
            [data_protection]
            application_name = "shop"

            [[data_protection.keys]]
            id = "6f1c3e3a-5d0b-4b8e-9a59-0c1f7d2a9b10"
            secret = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
            "#,
        )
        .expect("parse");
        assert_eq!(config.data_protection.application_name, "shop");
        assert_eq!(config.data_protection.keys.len(), 1);
        assert!(!config.data_protection.is_ephemeral());
    }
}
