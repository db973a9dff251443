//! Data protection capability consumed by the ticket format.

use std::sync::Arc;

use crate::result::AppResult;
use crate::types::PurposeChain;

/// Authenticated encryption over bytes, bound to one purpose chain.
///
/// Implementations must be safe to call concurrently from any number of
/// threads.
pub trait DataProtector: Send + Sync + std::fmt::Debug + 'static {
    /// The purpose chain this protector was created for.
    fn purposes(&self) -> &PurposeChain;

    /// Encrypt and authenticate `plaintext`.
    fn protect(&self, plaintext: &[u8]) -> AppResult<Vec<u8>>;

    /// Verify and decrypt a payload produced by [`protect`](Self::protect).
    ///
    /// Fails if the payload was tampered with, was produced under a
    /// different purpose chain, or under a key this protector does not hold.
    fn unprotect(&self, protected: &[u8]) -> AppResult<Vec<u8>>;
}

/// Factory for purpose-bound protectors (key ring, HSM, remote KMS, ...).
pub trait DataProtectionProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Create a protector bound to `purposes`.
    ///
    /// Equal chains must yield interoperable protectors, including across
    /// processes that share the same key material.
    fn create_protector(&self, purposes: &PurposeChain) -> AppResult<Arc<dyn DataProtector>>;
}
