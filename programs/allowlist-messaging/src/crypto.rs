//! Hashing for on-chain use: SHA-256 through the `sol_sha256` syscall.
//!
//! Must produce the same field elements as `allowlist_core::Sha256Hasher`,
//! which the admin uses off-chain to build the tree and hand out witnesses.

use anchor_lang::solana_program::hash::hashv;
use allowlist_core::{FieldElement, FieldHasher};

/// `H(fields) = SHA-256(f_0 || f_1 || ...)`, computed by the runtime.
#[derive(Clone, Copy, Default)]
pub struct SyscallHasher;

impl FieldHasher for SyscallHasher {
    fn hash(&self, fields: &[FieldElement]) -> FieldElement {
        let parts: Vec<&[u8]> = fields.iter().map(|f| f.as_slice()).collect();
        FieldElement::new(hashv(&parts).to_bytes())
    }

    fn hash_pair(&self, left: &FieldElement, right: &FieldElement) -> FieldElement {
        FieldElement::new(hashv(&[left.as_slice(), right.as_slice()]).to_bytes())
    }
}
