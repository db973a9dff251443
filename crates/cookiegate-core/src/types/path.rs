//! Request path values used for redirect targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// A non-empty, rooted request path such as `/Account/Login`.
///
/// Absence of a path is modeled as `Option<PathString>`, never as an empty
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PathString(String);

impl PathString {
    /// Parse a path, rejecting empty values and values without a leading `/`.
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::configuration("Path must not be empty"));
        }
        if !value.starts_with('/') {
            return Err(AppError::configuration(format!(
                "Path '{value}' must start with '/'"
            )));
        }
        Ok(Self(value))
    }

    /// Build a path from a compile-time constant known to be well formed.
    pub fn from_static(value: &'static str) -> Self {
        debug_assert!(value.starts_with('/'));
        Self(value.to_string())
    }

    /// Return the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PathString {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for PathString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for PathString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
