//! Deployment of the singleton state PDA.
//!
//! Initialize / handle_initialize: admin = payer, root = zero sentinel, counter = 0.

use anchor_lang::prelude::*;
use crate::state::{MessagingState, STATE_SEED, STATE_SPACE};

/// Accounts for creating the state PDA.
#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init, payer=payer, space=STATE_SPACE,
        seeds=[STATE_SEED], bump
    )]
    pub state: Account<'info, MessagingState>,

    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Writes the deployment state. The root stays at the zero sentinel until `store`.
pub fn handle_initialize(ctx: Context<Initialize>) -> Result<()> {
    let state = &mut ctx.accounts.state;
    state.admin             = ctx.accounts.payer.key();
    state.allowlist_root    = [0u8; 32];
    state.sent_messages_num = 0;
    state.bump              = ctx.bumps.state;
    msg!("initialize: admin={}", state.admin);
    Ok(())
}
