//! Purpose chains that scope a data protector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of purpose strings binding a protector to one use.
///
/// Two protectors interoperate only if their purpose chains are equal
/// segment by segment. Segments must be stable across machines, restarts,
/// and releases for a given wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurposeChain(Vec<String>);

impl PurposeChain {
    /// Build a chain from its segments, in order.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Return the segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Unambiguous byte encoding of the chain.
    ///
    /// Each segment is written as a big-endian `u32` byte length followed by
    /// its UTF-8 bytes, so `["ab", "c"]` and `["a", "bc"]` never collide.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.iter().map(|s| s.len() + 4).sum());
        for segment in &self.0 {
            out.extend_from_slice(&(segment.len() as u32).to_be_bytes());
            out.extend_from_slice(segment.as_bytes());
        }
        out
    }
}

impl fmt::Display for PurposeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
