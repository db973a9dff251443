//! Cookie authentication options, their resolution, and the scheme registry.

pub mod cookie_options;
pub mod registry;
pub mod resolver;

pub use cookie_options::{CookieAuthenticationOptions, ResolvedCookieOptions, lifetime_from_minutes};
pub use registry::SchemeRegistry;
pub use resolver::OptionsResolver;
