//! Versioned binary encoding of authentication tickets.
//!
//! Layout: one format version byte followed by the JSON encoding of the
//! ticket. Readers reject any other version outright.

use cookiegate_core::error::AppError;

use super::AuthenticationTicket;

/// Wire format version written as the first byte.
pub const FORMAT_VERSION: u8 = 5;

/// Converts tickets to and from their versioned byte form.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketSerializer;

impl TicketSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, ticket: &AuthenticationTicket) -> Result<Vec<u8>, AppError> {
        let mut out = vec![FORMAT_VERSION];
        serde_json::to_writer(&mut out, ticket)?;
        Ok(out)
    }

    /// Restores a ticket, failing with `InvalidTicket` on any mismatch.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<AuthenticationTicket, AppError> {
        let (version, body) = bytes
            .split_first()
            .ok_or_else(|| AppError::invalid_ticket("Ticket payload is empty"))?;

        if *version != FORMAT_VERSION {
            return Err(AppError::invalid_ticket(format!(
                "Unsupported ticket format version {version}"
            )));
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::invalid_ticket(format!("Malformed ticket body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use cookiegate_core::error::ErrorKind;

    use super::*;
    use crate::ticket::{AuthenticationProperties, ClaimsIdentity, ClaimsPrincipal, claim_types};

    fn sample_ticket() -> AuthenticationTicket {
        let identity = ClaimsIdentity::new("Cookies")
            .with_claim(claim_types::NAME, "alice")
            .with_claim(claim_types::EMAIL, "alice@example.com");
        AuthenticationTicket::new(
            ClaimsPrincipal::from_identity(identity),
            AuthenticationProperties::issued_for(Utc::now(), Duration::hours(1))
                .with_item(".redirect", "/home"),
            "Cookies",
        )
    }

    #[test]
    fn test_version_byte_leads() {
        let bytes = TicketSerializer::new()
            .serialize(&sample_ticket())
            .expect("serialize");
        assert_eq!(bytes[0], FORMAT_VERSION);
    }

    #[test]
    fn test_restores_equal_ticket() {
        let serializer = TicketSerializer::new();
        let ticket = sample_ticket();
        let bytes = serializer.serialize(&ticket).expect("serialize");
        assert_eq!(serializer.deserialize(&bytes).expect("deserialize"), ticket);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let serializer = TicketSerializer::new();
        let mut bytes = serializer.serialize(&sample_ticket()).expect("serialize");
        bytes[0] = 4;
        let err = serializer.deserialize(&bytes).expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::InvalidTicket);
    }

    #[test]
    fn test_empty_and_garbage_rejected() {
        let serializer = TicketSerializer::new();
        assert_eq!(
            serializer.deserialize(&[]).expect_err("empty").kind,
            ErrorKind::InvalidTicket
        );
        assert_eq!(
            serializer
                .deserialize(&[FORMAT_VERSION, b'{'])
                .expect_err("garbage")
                .kind,
            ErrorKind::InvalidTicket
        );
    }
}
