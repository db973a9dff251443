//! Core type definitions used across the Cookiegate workspace.

pub mod cookie;
pub mod key_id;
pub mod path;
pub mod purpose;

pub use cookie::{CookieOptions, CookieSecurePolicy, RequestCookies, ResponseCookie, SameSiteMode};
pub use key_id::KeyId;
pub use path::PathString;
pub use purpose::PurposeChain;
