//! # cookiegate-core
//!
//! Core crate for Cookiegate. Contains the capability traits consumed by
//! the cookie authentication layer, configuration schemas, shared value
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Cookiegate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
