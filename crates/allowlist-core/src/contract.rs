//! Contract state and the `store` / `send_message` transition function.
//!
//! `Uninitialized` (root == zero) --store--> `Active` --send_message--> `Active`.
//! [`apply`] never touches its input state: it returns the next state and the
//! event to emit, or the first failed precondition. Hosts commit the result
//! atomically or discard it.

use alloy_primitives::U256;
use thiserror::Error;
use tracing::debug;

use crate::field::{FieldElement, Identity};
use crate::hash::FieldHasher;
use crate::merkle::{admit, MerkleWitness};
use crate::message::{Message, MessageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("already initialized")]
    AlreadyInitialized,
    #[error("missing signature")]
    MissingSignature,
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error("Not whitelisted")]
    NotWhitelisted,
    #[error("sent message counter overflow")]
    CounterOverflow,
}

/// Persisted singleton record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractState {
    pub admin: Identity,
    pub allowlist_root: FieldElement,
    pub sent_messages_num: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
}

impl ContractState {
    /// State right after deployment.
    pub fn deploy(admin: Identity) -> Self {
        Self { admin, allowlist_root: FieldElement::ZERO, sent_messages_num: 0 }
    }

    pub fn phase(&self) -> Phase {
        if self.allowlist_root == FieldElement::ZERO {
            Phase::Uninitialized
        } else {
            Phase::Active
        }
    }
}

/// One accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessageEvent {
    pub sender: Identity,
    pub content: U256,
}

/// Transaction origin as seen by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub identity: Identity,
    /// Whether the host verified a signature from `identity` on this transaction.
    pub signed: bool,
}

impl Caller {
    pub fn signed(identity: Identity) -> Self {
        Self { identity, signed: true }
    }

    pub fn unsigned(identity: Identity) -> Self {
        Self { identity, signed: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Store { new_root: FieldElement },
    SendMessage { message: Message, witness: MerkleWitness },
}

/// Result of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub state: ContractState,
    pub event: Option<SentMessageEvent>,
}

/// Evaluates `call` against `state`.
pub fn apply<H: FieldHasher + ?Sized>(
    hasher: &H,
    state: &ContractState,
    caller: &Caller,
    call: &Call,
) -> Result<Applied, ContractError> {
    match call {
        Call::Store { new_root } => store(state, *new_root).map(|state| Applied { state, event: None }),
        Call::SendMessage { message, witness } => send_message(hasher, state, caller, message, witness)
            .map(|(state, event)| Applied { state, event: Some(event) }),
    }
}

/// One-shot root initialization. The caller is not checked against `admin`.
pub fn store(state: &ContractState, new_root: FieldElement) -> Result<ContractState, ContractError> {
    if state.allowlist_root != FieldElement::ZERO {
        return Err(ContractError::AlreadyInitialized);
    }
    Ok(ContractState { allowlist_root: new_root, ..*state })
}

pub fn send_message<H: FieldHasher + ?Sized>(
    hasher: &H,
    state: &ContractState,
    caller: &Caller,
    message: &Message,
    witness: &MerkleWitness,
) -> Result<(ContractState, SentMessageEvent), ContractError> {
    if !caller.signed {
        return Err(ContractError::MissingSignature);
    }
    message.check()?;

    // The empty identity's leaf is what unused and nullified slots hold.
    if caller.identity.is_empty() {
        debug!(slot = witness.calculate_index(), "empty identity rejected");
        return Err(ContractError::NotWhitelisted);
    }
    let nullified_root = admit(hasher, &caller.identity, witness, &state.allowlist_root)?;
    let sent_messages_num = state
        .sent_messages_num
        .checked_add(1)
        .ok_or(ContractError::CounterOverflow)?;

    debug!(sender = %caller.identity, slot = witness.calculate_index(), "slot nullified");

    let next = ContractState { allowlist_root: nullified_root, sent_messages_num, ..*state };
    let event = SentMessageEvent { sender: caller.identity, content: message.content };
    Ok((next, event))
}
