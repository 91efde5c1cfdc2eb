//! One-shot allowlist root initialization.
//!
//! Any signer may call this while the root is still zero; `admin` is not
//! consulted (first writer wins).

use anchor_lang::prelude::*;
use allowlist_core::{Call, Caller, FieldElement, Identity};

use crate::state::{MessagingState, STATE_SEED};

/// Accounts for `store`.
#[derive(Accounts)]
pub struct Store<'info> {
    #[account(mut, seeds=[STATE_SEED], bump=state.bump)]
    pub state: Account<'info, MessagingState>,
    pub caller: Signer<'info>,
}

/// Sets the allowlist root; AlreadyInitialized if one is stored.
pub fn handle_store(ctx: Context<Store>, new_root: [u8; 32]) -> Result<()> {
    let caller = Caller::signed(Identity::new(ctx.accounts.caller.key().to_bytes()));
    let call   = Call::Store { new_root: FieldElement::new(new_root) };
    ctx.accounts.state.apply(caller, &call)?;
    msg!("store: root={}", FieldElement::new(new_root));
    Ok(())
}
