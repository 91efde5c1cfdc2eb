//! # Module overview
//! Allowlist-gated messaging: every allowlisted key may post exactly one message.
//! 1. Membership: a depth-8 Merkle witness must open the stored root from SHA-256(sender)
//! 2. Nullification: the same witness over the empty leaf becomes the new root
//! 3. Content: the low 6 bits of the message must satisfy three flag rules
//!
//! # Instruction set
//! initialize: creates the singleton state PDA (admin = payer, root = 0, counter = 0).
//! store: one-shot allowlist root initialization.
//! send_message: validates, admits and nullifies the sender's slot, emits SentMessage.

#![allow(unexpected_cfgs)] // Keep until Anchor's cfg layout is simplified

use anchor_lang::prelude::*;

mod crypto;
mod init;
mod send;
mod state;
mod store;

// Program ID
declare_id!("A11oWmsgXcYq3nK8dM5rB7pTzV2sHfJ4uLe9GwQj6RtN");

// Re-exports
pub use init ::Initialize;
pub use store::Store;
pub use send ::SendMessage;
pub use state::{ErrorCode, MessageArgs, MessagingState, SentMessage, WitnessArgs, STATE_SEED};

// Anchor idl-build client account module names
pub mod __client_accounts_initialize   { pub use crate::Initialize; }
pub mod __client_accounts_store        { pub use crate::Store; }
pub mod __client_accounts_send_message { pub use crate::SendMessage; }

#[program]
pub mod allowlist_messaging {
    use super::*;

    /// Creates the state PDA with a zero root; the payer is recorded as admin.
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        init::handle_initialize(ctx)
    }

    /// Sets the allowlist root once. Fails if a root is already stored.
    pub fn store(ctx: Context<Store>, new_root: [u8; 32]) -> Result<()> {
        store::handle_store(ctx, new_root)
    }

    /// Posts one message from an allowlisted signer and burns its slot.
    pub fn send_message(ctx: Context<SendMessage>, message: MessageArgs, witness: WitnessArgs) -> Result<()> {
        send::handle_send_message(ctx, message, witness)
    }
}
