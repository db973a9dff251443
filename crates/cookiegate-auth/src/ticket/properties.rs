//! Auxiliary ticket state: issuance, expiry, persistence, and free-form items.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// State stored alongside the principal in a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationProperties {
    /// When the ticket was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_utc: Option<DateTime<Utc>>,
    /// When the ticket stops being valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_utc: Option<DateTime<Utc>>,
    /// Whether the cookie outlives the browser session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_persistent: bool,
    /// Whether sliding expiration may reissue this ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_refresh: Option<bool>,
    /// Where to send the user after sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Application-defined values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<String, String>,
}

impl AuthenticationProperties {
    /// Properties for a ticket issued at `now` and valid for `lifetime`.
    ///
    /// An expiry past the representable range saturates at the maximum.
    pub fn issued_for(now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            issued_utc: Some(now),
            expires_utc: Some(
                now.checked_add_signed(lifetime)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            ..Default::default()
        }
    }

    /// Whether `now` is at or past the expiry. No expiry means never expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_utc.is_some_and(|exp| now >= exp)
    }

    /// Whether more than half of the lifetime has elapsed at `now`.
    ///
    /// Used by sliding expiration to decide when to reissue.
    pub fn should_refresh_at(&self, now: DateTime<Utc>) -> bool {
        if self.allow_refresh == Some(false) {
            return false;
        }
        match (self.issued_utc, self.expires_utc) {
            (Some(issued), Some(expires)) => {
                let elapsed = now - issued;
                let remaining = expires - now;
                remaining < elapsed
            }
            _ => false,
        }
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }
}
