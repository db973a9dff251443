//! Default values for cookie authentication.
//!
//! These literals are shared with existing deployments. Changing any of
//! them changes cookie names, redirect targets, or (for the purpose
//! segments) invalidates every cookie already issued.

use chrono::Duration;

use cookiegate_core::types::{PathString, PurposeChain};

/// Default scheme name.
pub const AUTHENTICATION_SCHEME: &str = "Cookies";

/// Prefix prepended to the scheme name to form the default cookie name.
pub const COOKIE_PREFIX: &str = ".AspNetCore.";

/// Default redirect target for unauthenticated requests.
pub const LOGIN_PATH: &str = "/Account/Login";

/// Default sign-out path.
pub const LOGOUT_PATH: &str = "/Account/Logout";

/// Default redirect target for forbidden requests.
pub const ACCESS_DENIED_PATH: &str = "/Account/AccessDenied";

/// Default query parameter carrying the original URL on redirects.
pub const RETURN_URL_PARAMETER: &str = "ReturnUrl";

/// First purpose segment for ticket protectors.
pub const COMPONENT_ID: &str =
    "Microsoft.AspNetCore.Authentication.Cookies.CookieAuthenticationMiddleware";

/// Last purpose segment, naming the ticket wire format.
pub const FORMAT_VERSION_PURPOSE: &str = "v2";

/// Default ticket lifetime in days.
pub const EXPIRE_DAYS: i64 = 14;

/// Default ticket lifetime.
pub fn expire_time_span() -> Duration {
    Duration::days(EXPIRE_DAYS)
}

/// Default cookie name for a scheme.
pub fn cookie_name(scheme: &str) -> String {
    format!("{COOKIE_PREFIX}{scheme}")
}

/// Purpose chain binding a ticket protector to `scheme`.
pub fn ticket_purposes(scheme: &str) -> PurposeChain {
    PurposeChain::new([COMPONENT_ID, scheme, FORMAT_VERSION_PURPOSE])
}

pub fn login_path() -> PathString {
    PathString::from_static(LOGIN_PATH)
}

pub fn logout_path() -> PathString {
    PathString::from_static(LOGOUT_PATH)
}

pub fn access_denied_path() -> PathString {
    PathString::from_static(ACCESS_DENIED_PATH)
}
