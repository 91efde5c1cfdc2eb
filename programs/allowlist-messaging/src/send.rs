//! Message submission.
//!
//! Order of checks: signer (enforced by the accounts struct), content flags,
//! membership against the stored root. On success the sender's slot is
//! nullified, the counter bumps and SentMessage is emitted, all in one write.

use anchor_lang::prelude::*;
use allowlist_core::{Call, Caller, Identity};

use crate::state::{MessageArgs, MessagingState, SentMessage, WitnessArgs, STATE_SEED};

/// Accounts for `send_message`.
#[derive(Accounts)]
pub struct SendMessage<'info> {
    #[account(mut, seeds=[STATE_SEED], bump=state.bump)]
    pub state: Account<'info, MessagingState>,
    pub sender: Signer<'info>,
}

/// Admits the sender once and records the message.
pub fn handle_send_message(ctx: Context<SendMessage>, message: MessageArgs, witness: WitnessArgs) -> Result<()> {
    let sender = Caller::signed(Identity::new(ctx.accounts.sender.key().to_bytes()));
    let call   = Call::SendMessage { message: message.into(), witness: witness.into() };

    let event = ctx.accounts.state.apply(sender, &call)?;
    msg!(
        "send_message: sender={} sent={}",
        ctx.accounts.sender.key(), ctx.accounts.state.sent_messages_num
    );

    if let Some(event) = event {
        emit!(SentMessage::from(event));
    }
    Ok(())
}
