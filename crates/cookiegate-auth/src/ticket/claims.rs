//! Claims, identities, and principals carried inside a ticket.

use serde::{Deserialize, Serialize};

/// Well-known claim type URIs.
pub mod claim_types {
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
    pub const EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
}

/// Value type of a plain string claim.
pub const STRING_VALUE_TYPE: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Issuer recorded on claims created locally.
pub const LOCAL_AUTHORITY: &str = "LOCAL AUTHORITY";

/// A single statement about the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type URI, e.g. [`claim_types::NAME`].
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
    /// Value type URI.
    #[serde(
        default = "default_value_type",
        skip_serializing_if = "is_default_value_type"
    )]
    pub value_type: String,
    /// Issuer of the claim.
    #[serde(default = "default_issuer", skip_serializing_if = "is_default_issuer")]
    pub issuer: String,
}

impl Claim {
    /// Create a string claim issued by the local authority.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: default_value_type(),
            issuer: default_issuer(),
        }
    }

    /// Override the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// A set of claims established by one authentication mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsIdentity {
    /// How the identity was authenticated. `None` means anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(
        default = "default_name_claim_type",
        skip_serializing_if = "is_default_name_claim_type"
    )]
    pub name_claim_type: String,
    #[serde(
        default = "default_role_claim_type",
        skip_serializing_if = "is_default_role_claim_type"
    )]
    pub role_claim_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
}

impl ClaimsIdentity {
    /// Create an empty identity with the default name and role claim types.
    pub fn new(authentication_type: impl Into<String>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            name_claim_type: default_name_claim_type(),
            role_claim_type: default_role_claim_type(),
            claims: Vec::new(),
        }
    }

    /// Builder-style claim append.
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// An identity is authenticated if it carries an authentication type.
    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// First claim of the given type.
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claim_type == claim_type)
    }

    /// Value of the first name claim.
    pub fn name(&self) -> Option<&str> {
        self.find_first(&self.name_claim_type)
            .map(|c| c.value.as_str())
    }

    /// Whether the identity carries a role claim with this value.
    pub fn has_role(&self, role: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == self.role_claim_type && c.value == role)
    }
}

/// The subject of a ticket: one or more identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsPrincipal {
    pub identities: Vec<ClaimsIdentity>,
}

impl ClaimsPrincipal {
    /// Create a principal from a single identity.
    pub fn from_identity(identity: ClaimsIdentity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    /// The primary identity, if any.
    pub fn identity(&self) -> Option<&ClaimsIdentity> {
        self.identities.first()
    }

    /// Name from the primary identity.
    pub fn name(&self) -> Option<&str> {
        self.identity().and_then(ClaimsIdentity::name)
    }

    /// Whether any identity carries the role.
    pub fn is_in_role(&self, role: &str) -> bool {
        self.identities.iter().any(|i| i.has_role(role))
    }

    /// First claim of the given type across all identities.
    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.identities
            .iter()
            .find_map(|i| i.find_first(claim_type))
    }

    /// All claims across all identities.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|i| i.claims.iter())
    }
}

fn default_value_type() -> String {
    STRING_VALUE_TYPE.to_string()
}

fn is_default_value_type(value: &str) -> bool {
    value == STRING_VALUE_TYPE
}

fn default_issuer() -> String {
    LOCAL_AUTHORITY.to_string()
}

fn is_default_issuer(value: &str) -> bool {
    value == LOCAL_AUTHORITY
}

fn default_name_claim_type() -> String {
    claim_types::NAME.to_string()
}

fn is_default_name_claim_type(value: &str) -> bool {
    value == claim_types::NAME
}

fn default_role_claim_type() -> String {
    claim_types::ROLE.to_string()
}

fn is_default_role_claim_type(value: &str) -> bool {
    value == claim_types::ROLE
}
