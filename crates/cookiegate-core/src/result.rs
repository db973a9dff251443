//! Convenience result type alias for Cookiegate.

use crate::error::AppError;

/// A specialized `Result` type for Cookiegate operations.
pub type AppResult<T> = Result<T, AppError>;
