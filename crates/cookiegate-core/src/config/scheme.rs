//! Per-scheme cookie authentication settings.

use serde::{Deserialize, Serialize};

use crate::types::{CookieSecurePolicy, PathString, SameSiteMode};

/// Settings for one named cookie authentication scheme.
///
/// Fields left unset here are filled with defaults when the scheme's
/// options are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeSettings {
    /// Cookie name. Defaults to the cookie prefix followed by the scheme name.
    #[serde(default)]
    pub cookie_name: Option<String>,
    /// Redirect target for unauthenticated requests.
    #[serde(default)]
    pub login_path: Option<PathString>,
    /// Path handling sign-out.
    #[serde(default)]
    pub logout_path: Option<PathString>,
    /// Redirect target for forbidden requests.
    #[serde(default)]
    pub access_denied_path: Option<PathString>,
    /// Ticket lifetime in minutes.
    #[serde(default)]
    pub expire_minutes: Option<i64>,
    /// Whether tickets past half their lifetime are reissued.
    #[serde(default)]
    pub sliding_expiration: Option<bool>,
    /// Query parameter carrying the original URL on redirects.
    #[serde(default)]
    pub return_url_parameter: Option<String>,
    #[serde(default)]
    pub cookie_path: Option<String>,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub same_site: Option<SameSiteMode>,
    #[serde(default)]
    pub secure_policy: Option<CookieSecurePolicy>,
}
