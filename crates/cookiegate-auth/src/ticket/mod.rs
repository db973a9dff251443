//! Authentication tickets and their wire serialization.

pub mod claims;
pub mod properties;
pub mod serializer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use claims::{Claim, ClaimsIdentity, ClaimsPrincipal, claim_types};
pub use properties::AuthenticationProperties;
pub use serializer::TicketSerializer;

/// Identity, claims, and expiry metadata protected inside a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationTicket {
    /// Scheme that issued the ticket.
    pub authentication_scheme: String,
    pub principal: ClaimsPrincipal,
    #[serde(default)]
    pub properties: AuthenticationProperties,
}

impl AuthenticationTicket {
    pub fn new(
        principal: ClaimsPrincipal,
        properties: AuthenticationProperties,
        authentication_scheme: impl Into<String>,
    ) -> Self {
        Self {
            authentication_scheme: authentication_scheme.into(),
            principal,
            properties,
        }
    }

    /// Expiry timestamp, if the ticket has one.
    pub fn expires_utc(&self) -> Option<DateTime<Utc>> {
        self.properties.expires_utc
    }

    /// Checks whether this ticket has expired.
    pub fn is_expired(&self) -> bool {
        self.properties.is_expired_at(Utc::now())
    }
}
