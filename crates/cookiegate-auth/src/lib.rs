//! # cookiegate-auth
//!
//! Cookie authentication scheme resolution and ticket protection.
//!
//! ## Modules
//!
//! - `defaults`: cookie name prefix, default paths, and purpose segments
//! - `ticket`: authentication tickets and their versioned serialization
//! - `protection`: key ring data protection provider (HKDF + AES-256-GCM)
//! - `format`: ticket data format producing cookie-safe protected strings
//! - `cookie`: chunking cookie manager and ticket cookie helpers
//! - `options`: per-scheme options, the options resolver, and the scheme registry

pub mod cookie;
pub mod defaults;
pub mod format;
pub mod options;
pub mod protection;
pub mod ticket;

pub use cookie::ChunkingCookieManager;
pub use format::TicketDataFormat;
pub use options::{
    CookieAuthenticationOptions, OptionsResolver, ResolvedCookieOptions, SchemeRegistry,
};
pub use protection::{KeyRing, KeyRingDataProtectionProvider, MasterKey};
pub use ticket::{
    AuthenticationProperties, AuthenticationTicket, Claim, ClaimsIdentity, ClaimsPrincipal,
    TicketSerializer,
};
