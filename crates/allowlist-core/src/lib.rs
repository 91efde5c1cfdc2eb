//! # Module overview
//! Constraint logic for an allowlist-gated messaging contract:
//! 1. Message Validator: three bitflag rules over the low 6 bits of a bounded 254-bit content value
//! 2. Merkle Membership Checker: depth-8 root recomputation, admission and one-time nullification
//! 3. Contract state machine: `store` / `send_message` as a pure transition function
//!
//! The hash is injected through [`FieldHasher`]; SHA-256 is the default
//! (`sha256` feature), the on-chain program supplies the syscall version.
//! [`LocalLedger`] is an in-memory host that serializes transitions and keeps
//! the event log, for tests and tooling.

mod field;
mod hash;

pub mod contract;
pub mod ledger;
pub mod merkle;
pub mod message;

pub use alloy_primitives::{B256, U256};

pub use field::{FieldElement, Identity};
pub use hash::{empty_leaf, leaf_for, FieldHasher};
#[cfg(feature = "sha256")]
pub use hash::Sha256Hasher;

pub use contract::{apply, Applied, Call, Caller, ContractError, ContractState, Phase, SentMessageEvent};
pub use ledger::LocalLedger;
pub use merkle::{admit, AllowlistTree, MerkleWitness, TreeError, ALLOWLIST_SLOTS, ALLOWLIST_TREE_DEPTH};
pub use message::{bounded_and, validate, Message, MessageError, MESSAGE_MAX_BITS};
