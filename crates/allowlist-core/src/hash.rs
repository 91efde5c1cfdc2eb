//! Hash seam: `H(fields) -> FieldElement`.
//!
//! Leaves are `H(identity.to_fields())`, inner nodes are `H([left, right])`.
//! Any implementation must be deterministic and collision resistant; the
//! membership checker only ever compares its outputs for equality.

use crate::field::{FieldElement, Identity};

/// Collision-resistant hash over field elements.
pub trait FieldHasher {
    fn hash(&self, fields: &[FieldElement]) -> FieldElement;

    /// Parent node of two children.
    fn hash_pair(&self, left: &FieldElement, right: &FieldElement) -> FieldElement {
        self.hash(&[*left, *right])
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for &H {
    fn hash(&self, fields: &[FieldElement]) -> FieldElement {
        (**self).hash(fields)
    }
}

/// Leaf value for an active slot.
pub fn leaf_for<H: FieldHasher + ?Sized>(hasher: &H, identity: &Identity) -> FieldElement {
    hasher.hash(&identity.to_fields())
}

/// Leaf value for an unused or nullified slot.
pub fn empty_leaf<H: FieldHasher + ?Sized>(hasher: &H) -> FieldElement {
    leaf_for(hasher, &Identity::EMPTY)
}

/// SHA-256 over the concatenated 32-byte encodings.
#[cfg(feature = "sha256")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

#[cfg(feature = "sha256")]
impl FieldHasher for Sha256Hasher {
    fn hash(&self, fields: &[FieldElement]) -> FieldElement {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for field in fields {
            hasher.update(field.as_slice());
        }
        FieldElement::new(hasher.finalize().into())
    }
}
