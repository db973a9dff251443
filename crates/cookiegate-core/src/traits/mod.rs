//! Capability traits defined in `cookiegate-core` and implemented by other crates.

pub mod cookie_manager;
pub mod data_protection;

pub use cookie_manager::CookieManager;
pub use data_protection::{DataProtectionProvider, DataProtector};
