//! Field elements and identities.
//!
//! A field element is carried as 32 opaque bytes; the hash seam decides how
//! they are absorbed. An identity is a 32-byte public key (a Solana `Pubkey`
//! on-chain) encoded as a single field element.

use core::fmt;

use alloy_primitives::B256;

/// Opaque 32-byte field element. `FieldElement::ZERO` is the uninitialized-root sentinel.
pub type FieldElement = B256;

/// Public key of an external actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Identity(pub B256);

impl Identity {
    /// All-zero key: marks unused slots and is the nullification target.
    pub const EMPTY: Identity = Identity(B256::ZERO);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Field encoding fed to the hash when deriving a leaf.
    pub fn to_fields(&self) -> [FieldElement; 1] {
        [self.0]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl From<B256> for Identity {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Identity> for B256 {
    fn from(value: Identity) -> Self {
        value.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
