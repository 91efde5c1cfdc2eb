//! Merkle Membership Checker and allowlist tree.
//!
//! The allowlist is a fixed depth-8 binary tree (256 slots). Only its root is
//! persisted; [`AllowlistTree`] is the admin-side copy that hands witnesses to
//! senders. Admission recomputes the root from the sender's leaf, and the same
//! witness applied to the empty leaf yields the post-nullification root.

use thiserror::Error;
use tracing::debug;

use crate::contract::ContractError;
use crate::field::{FieldElement, Identity};
use crate::hash::{empty_leaf, leaf_for, FieldHasher};

pub const ALLOWLIST_TREE_DEPTH: usize = 8;
pub const ALLOWLIST_SLOTS: usize = 1 << ALLOWLIST_TREE_DEPTH; // 256

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("slot index {index} out of range (0..256)")]
    IndexOutOfRange { index: u64 },
}

/// Authentication path for one slot, leaf level first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleWitness {
    /// Sibling at each level.
    pub path: [FieldElement; ALLOWLIST_TREE_DEPTH],
    /// `true` when the running node is the left child at that level.
    pub is_left: [bool; ALLOWLIST_TREE_DEPTH],
}

impl MerkleWitness {
    pub fn new(path: [FieldElement; ALLOWLIST_TREE_DEPTH], is_left: [bool; ALLOWLIST_TREE_DEPTH]) -> Self {
        Self { path, is_left }
    }

    /// Hashes `leaf` up the path. Malformed paths just give a different root.
    pub fn calculate_root<H: FieldHasher + ?Sized>(&self, hasher: &H, leaf: FieldElement) -> FieldElement {
        let mut current = leaf;
        for (sibling, &is_left) in self.path.iter().zip(self.is_left.iter()) {
            current = if is_left {
                hasher.hash_pair(&current, sibling)
            } else {
                hasher.hash_pair(sibling, &current)
            };
        }
        current
    }

    /// Slot index encoded by the direction bits.
    pub fn calculate_index(&self) -> u64 {
        self.is_left
            .iter()
            .enumerate()
            .fold(0u64, |idx, (level, &is_left)| if is_left { idx } else { idx | (1 << level) })
    }
}

/// Membership + one-time admission.
///
/// Returns the root with the sender's slot replaced by the empty leaf, or
/// `NotWhitelisted` when the sender's leaf does not open `current_root`.
pub fn admit<H: FieldHasher + ?Sized>(
    hasher: &H,
    sender: &Identity,
    witness: &MerkleWitness,
    current_root: &FieldElement,
) -> Result<FieldElement, ContractError> {
    let candidate = witness.calculate_root(hasher, leaf_for(hasher, sender));
    if candidate != *current_root {
        debug!(%sender, slot = witness.calculate_index(), "membership check failed");
        return Err(ContractError::NotWhitelisted);
    }
    Ok(witness.calculate_root(hasher, empty_leaf(hasher)))
}

/// Full 256-slot tree kept by the allowlist administrator.
///
/// Nodes live in a flat array, index 1 is the root and the leaves start at
/// `ALLOWLIST_SLOTS`. Unused slots hold the empty leaf.
#[derive(Debug, Clone)]
pub struct AllowlistTree<H> {
    hasher: H,
    nodes: Vec<FieldElement>,
}

impl<H: FieldHasher> AllowlistTree<H> {
    pub fn new(hasher: H) -> Self {
        let empty = empty_leaf(&hasher);
        let mut nodes = vec![FieldElement::ZERO; 2 * ALLOWLIST_SLOTS];
        nodes[ALLOWLIST_SLOTS..].fill(empty);
        for i in (1..ALLOWLIST_SLOTS).rev() {
            nodes[i] = hasher.hash_pair(&nodes[2 * i], &nodes[2 * i + 1]);
        }
        Self { hasher, nodes }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn root(&self) -> FieldElement {
        self.nodes[1]
    }

    pub fn leaf(&self, index: u64) -> Result<FieldElement, TreeError> {
        Ok(self.nodes[Self::leaf_position(index)?])
    }

    /// Writes a raw leaf value and rehashes its path.
    pub fn set_leaf(&mut self, index: u64, leaf: FieldElement) -> Result<(), TreeError> {
        let mut pos = Self::leaf_position(index)?;
        self.nodes[pos] = leaf;
        while pos > 1 {
            pos /= 2;
            self.nodes[pos] = self.hasher.hash_pair(&self.nodes[2 * pos], &self.nodes[2 * pos + 1]);
        }
        Ok(())
    }

    pub fn add_identity(&mut self, index: u64, identity: &Identity) -> Result<(), TreeError> {
        let leaf = leaf_for(&self.hasher, identity);
        self.set_leaf(index, leaf)
    }

    /// Marks a slot used, mirroring what a successful admission does on-chain.
    pub fn nullify(&mut self, index: u64) -> Result<(), TreeError> {
        let leaf = empty_leaf(&self.hasher);
        self.set_leaf(index, leaf)
    }

    pub fn witness(&self, index: u64) -> Result<MerkleWitness, TreeError> {
        let mut pos = Self::leaf_position(index)?;
        let mut path = [FieldElement::ZERO; ALLOWLIST_TREE_DEPTH];
        let mut is_left = [false; ALLOWLIST_TREE_DEPTH];
        for level in 0..ALLOWLIST_TREE_DEPTH {
            let left = pos & 1 == 0;
            is_left[level] = left;
            path[level] = self.nodes[if left { pos + 1 } else { pos - 1 }];
            pos /= 2;
        }
        Ok(MerkleWitness { path, is_left })
    }

    fn leaf_position(index: u64) -> Result<usize, TreeError> {
        if index >= ALLOWLIST_SLOTS as u64 {
            return Err(TreeError::IndexOutOfRange { index });
        }
        Ok(ALLOWLIST_SLOTS + index as usize)
    }
}
