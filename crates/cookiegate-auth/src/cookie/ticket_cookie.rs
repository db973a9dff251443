//! Issuing, reading, renewing, and clearing ticket cookies.

use chrono::{DateTime, Utc};

use cookiegate_core::error::AppError;
use cookiegate_core::types::{RequestCookies, ResponseCookie};

use crate::options::ResolvedCookieOptions;
use crate::ticket::{AuthenticationProperties, AuthenticationTicket, ClaimsPrincipal};

/// Builds a ticket for `principal` valid for the scheme's expire time span.
pub fn issue_ticket(
    scheme: &str,
    options: &ResolvedCookieOptions<'_>,
    principal: ClaimsPrincipal,
    is_persistent: bool,
    now: DateTime<Utc>,
) -> AuthenticationTicket {
    let properties = AuthenticationProperties {
        is_persistent,
        ..AuthenticationProperties::issued_for(now, options.options.expire_time_span)
    };
    AuthenticationTicket::new(principal, properties, scheme)
}

/// Protects `ticket` and appends the resulting cookie(s) to `response`.
pub fn write_ticket(
    options: &ResolvedCookieOptions<'_>,
    ticket: &AuthenticationTicket,
    request_is_https: bool,
    response: &mut Vec<ResponseCookie>,
) -> Result<(), AppError> {
    let value = options.ticket_data_format.protect(ticket)?;
    let expires = if ticket.properties.is_persistent {
        ticket.properties.expires_utc
    } else {
        None
    };
    let cookie_options = options.cookie_options(request_is_https, expires);
    options
        .cookie_manager
        .append_response_cookie(response, options.cookie_name, &value, &cookie_options);

    tracing::debug!(
        cookie = options.cookie_name,
        bytes = value.len(),
        "Ticket cookie written"
    );
    Ok(())
}

/// Reads the scheme's ticket from the request.
///
/// An absent, tampered, unreadable, or expired cookie yields `Ok(None)`:
/// the request is simply unauthenticated. Only non-recoverable errors are
/// returned.
pub fn read_ticket(
    options: &ResolvedCookieOptions<'_>,
    request: &RequestCookies,
    now: DateTime<Utc>,
) -> Result<Option<AuthenticationTicket>, AppError> {
    let Some(value) = options
        .cookie_manager
        .get_request_cookie(request, options.cookie_name)
    else {
        return Ok(None);
    };

    match options.ticket_data_format.unprotect(&value) {
        Ok(ticket) if ticket.properties.is_expired_at(now) => {
            tracing::debug!(cookie = options.cookie_name, "Ticket expired");
            Ok(None)
        }
        Ok(ticket) => Ok(Some(ticket)),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(cookie = options.cookie_name, error = %e, "Ignoring unreadable ticket cookie");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Returns a renewed copy of `ticket` if sliding expiration calls for it.
///
/// The renewed ticket keeps the original lifetime, restarted at `now`.
pub fn renew_ticket(
    options: &ResolvedCookieOptions<'_>,
    ticket: &AuthenticationTicket,
    now: DateTime<Utc>,
) -> Option<AuthenticationTicket> {
    if !options.options.sliding_expiration || !ticket.properties.should_refresh_at(now) {
        return None;
    }
    let (Some(issued), Some(expires)) = (ticket.properties.issued_utc, ticket.properties.expires_utc)
    else {
        return None;
    };

    let expires_utc = now.checked_add_signed(expires - issued)?;

    let mut renewed = ticket.clone();
    renewed.properties.issued_utc = Some(now);
    renewed.properties.expires_utc = Some(expires_utc);
    Some(renewed)
}

/// Appends cookies removing the scheme's ticket, including every chunk.
pub fn clear_ticket(
    options: &ResolvedCookieOptions<'_>,
    request: &RequestCookies,
    request_is_https: bool,
    response: &mut Vec<ResponseCookie>,
) {
    let cookie_options = options.cookie_options(request_is_https, None);
    options
        .cookie_manager
        .delete_cookie(response, request, options.cookie_name, &cookie_options);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::options::{CookieAuthenticationOptions, OptionsResolver};
    use crate::protection::KeyRingDataProtectionProvider;
    use crate::ticket::{ClaimsIdentity, claim_types};

    fn resolved_options() -> CookieAuthenticationOptions {
        let mut options = CookieAuthenticationOptions::new();
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")))
            .resolve("Cookies", &mut options)
            .expect("resolve");
        options
    }

    fn principal() -> ClaimsPrincipal {
        ClaimsPrincipal::from_identity(
            ClaimsIdentity::new("Cookies").with_claim(claim_types::NAME, "carol"),
        )
    }

    #[test]
    fn test_write_then_read() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let now = Utc::now();
        let ticket = issue_ticket("Cookies", &resolved, principal(), false, now);

        let mut response = Vec::new();
        write_ticket(&resolved, &ticket, true, &mut response).expect("write");
        assert_eq!(response[0].name(), ".AspNetCore.Cookies");
        assert!(response[0].is_secure());
        assert!(response[0].expires().is_none());

        let request: RequestCookies = response.into_iter().collect();
        let read = read_ticket(&resolved, &request, now).expect("read");
        assert_eq!(read, Some(ticket));
    }

    #[test]
    fn test_persistent_ticket_sets_expiry() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let ticket = issue_ticket("Cookies", &resolved, principal(), true, Utc::now());

        let mut response = Vec::new();
        write_ticket(&resolved, &ticket, false, &mut response).expect("write");
        assert_eq!(response[0].expires(), ticket.properties.expires_utc);
        assert!(!response[0].is_secure());
    }

    #[test]
    fn test_tampered_cookie_reads_as_anonymous() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let mut request = RequestCookies::new();
        request.insert(".AspNetCore.Cookies", "AAAA");
        assert_eq!(read_ticket(&resolved, &request, Utc::now()).expect("read"), None);
    }

    #[test]
    fn test_expired_ticket_reads_as_anonymous() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let issued = Utc::now() - Duration::days(30);
        let ticket = issue_ticket("Cookies", &resolved, principal(), false, issued);

        let mut response = Vec::new();
        write_ticket(&resolved, &ticket, true, &mut response).expect("write");
        let request: RequestCookies = response.into_iter().collect();
        assert_eq!(read_ticket(&resolved, &request, Utc::now()).expect("read"), None);
    }

    #[test]
    fn test_renew_after_half_lifetime() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let issued = Utc::now();
        let ticket = issue_ticket("Cookies", &resolved, principal(), false, issued);

        assert!(renew_ticket(&resolved, &ticket, issued + Duration::days(1)).is_none());

        let later = issued + Duration::days(8);
        let renewed = renew_ticket(&resolved, &ticket, later).expect("renewed");
        assert_eq!(renewed.properties.issued_utc, Some(later));
        assert_eq!(renewed.properties.expires_utc, Some(later + Duration::days(14)));
    }

    #[test]
    fn test_clear_expires_cookie() {
        let options = resolved_options();
        let resolved = options.resolved().expect("resolved");
        let mut response = Vec::new();
        clear_ticket(&resolved, &RequestCookies::new(), true, &mut response);
        assert_eq!(response.len(), 1);
        assert!(response[0].is_expired());
    }
}
