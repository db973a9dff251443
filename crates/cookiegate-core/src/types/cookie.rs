//! Request and response cookie values exchanged with a cookie manager.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Value of the `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSiteMode {
    /// Attribute is omitted.
    Unspecified,
    /// `SameSite=None`.
    None,
    /// `SameSite=Lax`.
    #[default]
    Lax,
    /// `SameSite=Strict`.
    Strict,
}

/// How the `Secure` attribute is decided for issued cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieSecurePolicy {
    /// Secure if the request that issued it was over HTTPS.
    #[default]
    SameAsRequest,
    /// Always secure.
    Always,
    /// Never secure.
    None,
}

impl SameSiteMode {
    /// Attribute value to emit, if any.
    pub fn to_same_site(self) -> Option<SameSite> {
        match self {
            Self::Unspecified => None,
            Self::None => Some(SameSite::None),
            Self::Lax => Some(SameSite::Lax),
            Self::Strict => Some(SameSite::Strict),
        }
    }
}

impl CookieSecurePolicy {
    /// Whether a cookie issued in response to a request should be `Secure`.
    pub fn is_secure(&self, request_is_https: bool) -> bool {
        match self {
            Self::SameAsRequest => request_is_https,
            Self::Always => true,
            Self::None => false,
        }
    }
}

/// Attributes applied to an outgoing cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<Duration>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSiteMode,
}

/// Cookies sent by the client on a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies {
    values: HashMap<String, String>,
}

impl RequestCookies {
    /// Create an empty cookie collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` request header (`a=1; b=2`).
    ///
    /// Malformed pairs are skipped. The first occurrence of a name wins.
    pub fn parse_header(header: &str) -> Self {
        let mut values = HashMap::new();
        for cookie in Cookie::split_parse(header).filter_map(Result::ok) {
            values
                .entry(cookie.name().to_string())
                .or_insert_with(|| cookie.value().to_string());
        }
        Self { values }
    }

    /// Look up a cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Insert or replace a cookie value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Number of cookies in the collection.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<ResponseCookie> for RequestCookies {
    /// Replays issued cookies as if the client sent them back, skipping
    /// expired ones.
    fn from_iter<T: IntoIterator<Item = ResponseCookie>>(iter: T) -> Self {
        let mut cookies = Self::new();
        for cookie in iter {
            if !cookie.is_expired() {
                cookies.insert(cookie.name(), cookie.value());
            }
        }
        cookies
    }
}

/// A cookie to be emitted as a `Set-Cookie` response header.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCookie(Cookie<'static>);

impl ResponseCookie {
    /// Create a cookie with the given attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: &CookieOptions) -> Self {
        let mut builder = Cookie::build((name.into(), value.into()))
            .secure(options.secure)
            .http_only(options.http_only);
        if let Some(path) = &options.path {
            builder = builder.path(path.clone());
        }
        if let Some(domain) = &options.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = options.same_site.to_same_site() {
            builder = builder.same_site(same_site);
        }
        if let Some(expires) = options.expires {
            builder = builder.expires(to_offset_date_time(expires));
        }
        if let Some(max_age) = options.max_age {
            builder = builder.max_age(time::Duration::seconds(max_age.num_seconds()));
        }
        Self(builder.build())
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Whether the `Secure` attribute is set.
    pub fn is_secure(&self) -> bool {
        self.0.secure().unwrap_or(false)
    }

    /// Absolute expiry, if the cookie carries one.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        let at = self.0.expires_datetime()?;
        DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond())
    }

    /// Whether this cookie instructs the client to discard it.
    pub fn is_expired(&self) -> bool {
        if matches!(self.0.max_age(), Some(age) if age <= time::Duration::ZERO) {
            return true;
        }
        matches!(self.0.expires_datetime(), Some(at) if at <= OffsetDateTime::now_utc())
    }

    /// Length of the rendered `Set-Cookie` header value.
    pub fn header_len(&self) -> usize {
        self.0.to_string().len()
    }

    /// The underlying cookie, for handing to an HTTP framework.
    pub fn as_cookie(&self) -> &Cookie<'static> {
        &self.0
    }
}

impl fmt::Display for ResponseCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Converts to the cookie crate's clock, clamping to its representable range.
fn to_offset_date_time(at: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .and_then(|t| t.replace_nanosecond(at.timestamp_subsec_nanos()))
        .unwrap_or_else(|_| {
            if at.timestamp() > 0 {
                PrimitiveDateTime::MAX.assume_utc()
            } else {
                OffsetDateTime::UNIX_EPOCH
            }
        })
}
