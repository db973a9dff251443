//! Per-scheme cookie authentication options.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use cookiegate_core::config::SchemeSettings;
use cookiegate_core::error::AppError;
use cookiegate_core::traits::{CookieManager, DataProtectionProvider};
use cookiegate_core::types::{CookieOptions, CookieSecurePolicy, PathString, SameSiteMode};

use crate::defaults;
use crate::format::TicketDataFormat;

/// Everything outside the RFC 3986 unreserved set is escaped in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Configuration for one named cookie authentication scheme.
///
/// The `Option` fields are filled by
/// [`OptionsResolver::resolve`](super::OptionsResolver::resolve); any value
/// supplied beforehand is kept as is.
#[derive(Debug, Clone)]
pub struct CookieAuthenticationOptions {
    pub cookie_name: Option<String>,
    pub data_protection_provider: Option<Arc<dyn DataProtectionProvider>>,
    pub ticket_data_format: Option<Arc<TicketDataFormat>>,
    pub cookie_manager: Option<Arc<dyn CookieManager>>,
    pub login_path: Option<PathString>,
    pub logout_path: Option<PathString>,
    pub access_denied_path: Option<PathString>,

    /// Ticket lifetime.
    pub expire_time_span: Duration,
    /// Reissue tickets once more than half of their lifetime has elapsed.
    pub sliding_expiration: bool,
    pub return_url_parameter: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub http_only: bool,
    pub same_site: SameSiteMode,
    pub secure_policy: CookieSecurePolicy,
}

impl Default for CookieAuthenticationOptions {
    fn default() -> Self {
        Self {
            cookie_name: None,
            data_protection_provider: None,
            ticket_data_format: None,
            cookie_manager: None,
            login_path: None,
            logout_path: None,
            access_denied_path: None,
            expire_time_span: defaults::expire_time_span(),
            sliding_expiration: true,
            return_url_parameter: defaults::RETURN_URL_PARAMETER.to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            http_only: true,
            same_site: SameSiteMode::Lax,
            secure_policy: CookieSecurePolicy::SameAsRequest,
        }
    }
}

impl CookieAuthenticationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options pre-populated from a configuration section.
    ///
    /// Unset settings stay unset so the resolver can apply its defaults.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `expire_minutes` is not a positive,
    /// representable number of minutes.
    pub fn from_settings(settings: &SchemeSettings) -> Result<Self, AppError> {
        let mut options = Self {
            cookie_name: settings.cookie_name.clone(),
            login_path: settings.login_path.clone(),
            logout_path: settings.logout_path.clone(),
            access_denied_path: settings.access_denied_path.clone(),
            cookie_domain: settings.cookie_domain.clone(),
            ..Self::default()
        };
        if let Some(minutes) = settings.expire_minutes {
            options.expire_time_span = lifetime_from_minutes(minutes)?;
        }
        if let Some(sliding) = settings.sliding_expiration {
            options.sliding_expiration = sliding;
        }
        if let Some(param) = &settings.return_url_parameter {
            options.return_url_parameter = param.clone();
        }
        if let Some(path) = &settings.cookie_path {
            options.cookie_path = path.clone();
        }
        if let Some(http_only) = settings.http_only {
            options.http_only = http_only;
        }
        if let Some(same_site) = settings.same_site {
            options.same_site = same_site;
        }
        if let Some(policy) = settings.secure_policy {
            options.secure_policy = policy;
        }
        Ok(options)
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    pub fn with_cookie_manager(mut self, manager: Arc<dyn CookieManager>) -> Self {
        self.cookie_manager = Some(manager);
        self
    }

    pub fn with_data_protection_provider(
        mut self,
        provider: Arc<dyn DataProtectionProvider>,
    ) -> Self {
        self.data_protection_provider = Some(provider);
        self
    }

    pub fn with_ticket_data_format(mut self, format: Arc<TicketDataFormat>) -> Self {
        self.ticket_data_format = Some(format);
        self
    }

    pub fn with_login_path(mut self, path: PathString) -> Self {
        self.login_path = Some(path);
        self
    }

    /// Whether every resolver-managed field holds a value.
    pub fn is_resolved(&self) -> bool {
        self.resolved().is_ok()
    }

    /// Borrowed view with every resolver-managed field present.
    ///
    /// Fails with `FatalConfiguration` if the options were never resolved.
    pub fn resolved(&self) -> Result<ResolvedCookieOptions<'_>, AppError> {
        fn missing(field: &str) -> AppError {
            AppError::fatal_configuration(format!(
                "Cookie authentication option '{field}' is unset; resolve the options first"
            ))
        }

        Ok(ResolvedCookieOptions {
            cookie_name: self
                .cookie_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| missing("cookie_name"))?,
            data_protection_provider: self
                .data_protection_provider
                .as_ref()
                .ok_or_else(|| missing("data_protection_provider"))?,
            ticket_data_format: self
                .ticket_data_format
                .as_ref()
                .ok_or_else(|| missing("ticket_data_format"))?,
            cookie_manager: self
                .cookie_manager
                .as_ref()
                .ok_or_else(|| missing("cookie_manager"))?,
            login_path: self
                .login_path
                .as_ref()
                .ok_or_else(|| missing("login_path"))?,
            logout_path: self
                .logout_path
                .as_ref()
                .ok_or_else(|| missing("logout_path"))?,
            access_denied_path: self
                .access_denied_path
                .as_ref()
                .ok_or_else(|| missing("access_denied_path"))?,
            options: self,
        })
    }
}

/// Read-only view of fully resolved options.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCookieOptions<'a> {
    pub cookie_name: &'a str,
    pub data_protection_provider: &'a Arc<dyn DataProtectionProvider>,
    pub ticket_data_format: &'a Arc<TicketDataFormat>,
    pub cookie_manager: &'a Arc<dyn CookieManager>,
    pub login_path: &'a PathString,
    pub logout_path: &'a PathString,
    pub access_denied_path: &'a PathString,
    pub options: &'a CookieAuthenticationOptions,
}

impl ResolvedCookieOptions<'_> {
    /// Attributes for the ticket cookie.
    ///
    /// `expires` is set only for persistent tickets; otherwise the cookie
    /// lives for the browser session.
    pub fn cookie_options(
        &self,
        request_is_https: bool,
        expires: Option<DateTime<Utc>>,
    ) -> CookieOptions {
        CookieOptions {
            path: Some(self.options.cookie_path.clone()),
            domain: self.options.cookie_domain.clone(),
            expires,
            max_age: None,
            secure: self.options.secure_policy.is_secure(request_is_https),
            http_only: self.options.http_only,
            same_site: self.options.same_site,
        }
    }

    /// Login redirect target carrying the original URL.
    pub fn login_redirect(&self, return_url: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            self.options.return_url_parameter,
            encode_query_value(return_url)
        )
    }

    /// Access-denied redirect target carrying the original URL.
    pub fn access_denied_redirect(&self, return_url: &str) -> String {
        format!(
            "{}?{}={}",
            self.access_denied_path,
            self.options.return_url_parameter,
            encode_query_value(return_url)
        )
    }
}

fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Ticket lifetime from a configured number of minutes.
pub fn lifetime_from_minutes(minutes: i64) -> Result<Duration, AppError> {
    if minutes <= 0 {
        return Err(AppError::configuration(format!(
            "expire_minutes must be positive, got {minutes}"
        )));
    }
    Duration::try_minutes(minutes).ok_or_else(|| {
        AppError::configuration(format!("expire_minutes {minutes} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use cookiegate_core::error::ErrorKind;

    use super::*;
    use crate::options::OptionsResolver;
    use crate::protection::KeyRingDataProtectionProvider;

    #[test]
    fn test_unresolved_options_rejected() {
        let err = CookieAuthenticationOptions::new()
            .resolved()
            .expect_err("unresolved");
        assert!(err.is_fatal());
        assert!(!CookieAuthenticationOptions::new().is_resolved());
    }

    #[test]
    fn test_from_settings_keeps_unset_fields_unset() {
        let settings = SchemeSettings {
            cookie_name: Some("session".into()),
            expire_minutes: Some(30),
            sliding_expiration: Some(false),
            same_site: Some(SameSiteMode::Strict),
            ..Default::default()
        };
        let options = CookieAuthenticationOptions::from_settings(&settings).expect("options");
        assert_eq!(options.cookie_name.as_deref(), Some("session"));
        assert_eq!(options.expire_time_span, Duration::minutes(30));
        assert!(!options.sliding_expiration);
        assert_eq!(options.same_site, SameSiteMode::Strict);
        assert!(options.login_path.is_none());
        assert!(options.ticket_data_format.is_none());
        assert_eq!(options.return_url_parameter, "ReturnUrl");
    }

    #[test]
    fn test_invalid_expire_minutes_rejected() {
        for minutes in [0, -5, i64::MAX] {
            let settings = SchemeSettings {
                expire_minutes: Some(minutes),
                ..Default::default()
            };
            let err = CookieAuthenticationOptions::from_settings(&settings)
                .expect_err("invalid lifetime");
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("/orders?id=7"), "%2Forders%3Fid%3D7");
        assert_eq!(encode_query_value("abc-_.~"), "abc-_.~");
        assert_eq!(encode_query_value("é"), "%C3%A9");
    }

    #[test]
    fn test_redirects_carry_return_url() {
        let mut options = CookieAuthenticationOptions::new();
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")))
            .resolve("Cookies", &mut options)
            .expect("resolve");
        let resolved = options.resolved().expect("resolved");

        assert_eq!(
            resolved.login_redirect("/cart?step=2"),
            "/Account/Login?ReturnUrl=%2Fcart%3Fstep%3D2"
        );
        assert_eq!(
            resolved.access_denied_redirect("/admin"),
            "/Account/AccessDenied?ReturnUrl=%2Fadmin"
        );
    }
}
