//! Conversion between authentication tickets and protected cookie values.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use cookiegate_core::error::AppError;
use cookiegate_core::traits::DataProtector;
use cookiegate_core::types::PurposeChain;

use crate::ticket::{AuthenticationTicket, TicketSerializer};

/// Serializes, protects, and encodes tickets as cookie-safe strings.
///
/// The output alphabet is base64url without padding, so values never need
/// further escaping inside a cookie.
#[derive(Debug, Clone)]
pub struct TicketDataFormat {
    serializer: TicketSerializer,
    protector: Arc<dyn DataProtector>,
}

impl TicketDataFormat {
    /// Wraps a protector already bound to the scheme's purpose chain.
    pub fn new(protector: Arc<dyn DataProtector>) -> Self {
        Self {
            serializer: TicketSerializer::new(),
            protector,
        }
    }

    /// The purpose chain of the bound protector.
    pub fn purposes(&self) -> &PurposeChain {
        self.protector.purposes()
    }

    pub fn protect(&self, ticket: &AuthenticationTicket) -> Result<String, AppError> {
        let plaintext = self.serializer.serialize(ticket)?;
        let protected = self.protector.protect(&plaintext)?;
        Ok(URL_SAFE_NO_PAD.encode(protected))
    }

    /// Restores a ticket from a cookie value.
    ///
    /// Every failure (bad encoding, failed verification, unreadable payload)
    /// is reported as `InvalidTicket`.
    pub fn unprotect(&self, protected_text: &str) -> Result<AuthenticationTicket, AppError> {
        let protected = URL_SAFE_NO_PAD
            .decode(protected_text)
            .map_err(|e| AppError::invalid_ticket(format!("Ticket is not valid base64url: {e}")))?;

        let plaintext = self.protector.unprotect(&protected).map_err(|e| {
            tracing::debug!(purposes = %self.purposes(), error = %e, "Ticket failed verification");
            AppError::invalid_ticket(format!("Ticket failed verification: {}", e.message))
        })?;

        self.serializer.deserialize(&plaintext)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use cookiegate_core::error::ErrorKind;
    use cookiegate_core::traits::DataProtectionProvider;

    use super::*;
    use crate::defaults;
    use crate::protection::KeyRingDataProtectionProvider;
    use crate::ticket::{AuthenticationProperties, ClaimsIdentity, ClaimsPrincipal, claim_types};

    fn format_for(provider: &KeyRingDataProtectionProvider, scheme: &str) -> TicketDataFormat {
        let protector = provider
            .create_protector(&defaults::ticket_purposes(scheme))
            .expect("protector");
        TicketDataFormat::new(protector)
    }

    fn ticket() -> AuthenticationTicket {
        let identity = ClaimsIdentity::new("Cookies")
            .with_claim(claim_types::NAME_IDENTIFIER, "42")
            .with_claim(claim_types::NAME, "bob")
            .with_claim(claim_types::ROLE, "editor");
        AuthenticationTicket::new(
            ClaimsPrincipal::from_identity(identity),
            AuthenticationProperties::issued_for(Utc::now(), Duration::days(1)),
            "Cookies",
        )
    }

    #[test]
    fn test_round_trip_preserves_ticket() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let format = format_for(&provider, "Cookies");
        let original = ticket();
        let value = format.protect(&original).expect("protect");
        assert_eq!(format.unprotect(&value).expect("unprotect"), original);
    }

    #[test]
    fn test_output_is_cookie_safe() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let value = format_for(&provider, "Cookies")
            .protect(&ticket())
            .expect("protect");
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_other_scheme_rejected() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let value = format_for(&provider, "A").protect(&ticket()).expect("protect");
        let err = format_for(&provider, "B")
            .unprotect(&value)
            .expect_err("scheme mismatch");
        assert_eq!(err.kind, ErrorKind::InvalidTicket);
    }

    #[test]
    fn test_non_base64_rejected() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let err = format_for(&provider, "Cookies")
            .unprotect("not base64!")
            .expect_err("bad encoding");
        assert_eq!(err.kind, ErrorKind::InvalidTicket);
    }

    #[test]
    fn test_purposes_exposed() {
        let provider = KeyRingDataProtectionProvider::ephemeral("app");
        let format = format_for(&provider, "Bearer");
        assert_eq!(format.purposes(), &defaults::ticket_purposes("Bearer"));
    }
}
