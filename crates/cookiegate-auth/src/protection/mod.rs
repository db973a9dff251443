//! Default data protection provider backed by a local key ring.

pub mod key_ring;
pub mod provider;

pub use key_ring::{KeyRing, MasterKey};
pub use provider::{KeyRingDataProtectionProvider, KeyRingProtector};
