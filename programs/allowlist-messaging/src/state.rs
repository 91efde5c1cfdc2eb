//! On-chain state layout, instruction arguments, events and error codes.
//!
//! MessagingState: singleton PDA holding admin, allowlist root and sent counter.
//! Every transition goes through `allowlist_core::apply`; the account is only
//! written back when the whole transition succeeded.

use anchor_lang::prelude::*;

use allowlist_core::{
    Call, Caller, ContractError, ContractState, FieldElement, Identity, Message, MessageError, MerkleWitness,
    SentMessageEvent, ALLOWLIST_TREE_DEPTH, U256,
};

use crate::crypto::SyscallHasher;

// Size constants
pub const DISC_SIZE: usize = 8;
pub const STATE_SPACE: usize = DISC_SIZE + 32 + 32 + 8 + 1; // admin + root + counter + bump

pub const STATE_SEED: &[u8] = b"messaging";

#[account]
pub struct MessagingState {
    pub admin            : Pubkey,
    pub allowlist_root   : [u8; 32],
    pub sent_messages_num: u64,
    pub bump             : u8,
}

impl MessagingState {
    pub fn to_core(&self) -> ContractState {
        ContractState {
            admin            : Identity::new(self.admin.to_bytes()),
            allowlist_root   : FieldElement::new(self.allowlist_root),
            sent_messages_num: self.sent_messages_num,
        }
    }

    /// Runs one transition and writes the result back on success.
    pub fn apply(&mut self, caller: Caller, call: &Call) -> Result<Option<SentMessageEvent>> {
        let applied = allowlist_core::apply(&SyscallHasher, &self.to_core(), &caller, call).map_err(|e| {
            msg!("rejected: {}", e);
            error!(ErrorCode::from(e))
        })?;

        self.admin             = Pubkey::new_from_array(*applied.state.admin.as_bytes());
        self.allowlist_root    = applied.state.allowlist_root.0;
        self.sent_messages_num = applied.state.sent_messages_num;
        Ok(applied.event)
    }
}

/// Message content as a 32-byte big-endian integer.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageArgs {
    pub content: [u8; 32],
}

impl From<MessageArgs> for Message {
    fn from(args: MessageArgs) -> Self {
        Message::new(U256::from_be_bytes(args.content))
    }
}

/// Depth-8 authentication path, leaf level first.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WitnessArgs {
    pub path   : [[u8; 32]; ALLOWLIST_TREE_DEPTH],
    pub is_left: [bool; ALLOWLIST_TREE_DEPTH],
}

impl From<WitnessArgs> for MerkleWitness {
    fn from(args: WitnessArgs) -> Self {
        MerkleWitness::new(args.path.map(FieldElement::new), args.is_left)
    }
}

#[event]
pub struct SentMessage {
    pub sender : Pubkey,
    pub content: [u8; 32],
}

impl From<SentMessageEvent> for SentMessage {
    fn from(event: SentMessageEvent) -> Self {
        SentMessage {
            sender : Pubkey::new_from_array(*event.sender.as_bytes()),
            content: event.content.to_be_bytes::<32>(),
        }
    }
}

#[error_code(offset = 7000)]
pub enum ErrorCode {
    #[msg("already initialized")]           AlreadyInitialized,
    #[msg("missing signature")]             MissingSignature,
    #[msg("content exceeds 254 bits")]      ContentTooWide,
    #[msg("Condition 1 failed")]            Condition1Failed,
    #[msg("Condition 2 failed")]            Condition2Failed,
    #[msg("Condition 3 failed")]            Condition3Failed,
    #[msg("Not whitelisted")]               NotWhitelisted,
    #[msg("sent message counter overflow")] CounterOverflow,
}

impl From<ContractError> for ErrorCode {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::AlreadyInitialized => ErrorCode::AlreadyInitialized,
            ContractError::MissingSignature   => ErrorCode::MissingSignature,
            ContractError::NotWhitelisted     => ErrorCode::NotWhitelisted,
            ContractError::CounterOverflow    => ErrorCode::CounterOverflow,
            ContractError::Message(m) => match m {
                MessageError::ContentTooWide { .. } => ErrorCode::ContentTooWide,
                MessageError::Condition1Failed      => ErrorCode::Condition1Failed,
                MessageError::Condition2Failed      => ErrorCode::Condition2Failed,
                MessageError::Condition3Failed      => ErrorCode::Condition3Failed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(admin: Pubkey) -> MessagingState {
        MessagingState { admin, allowlist_root: [0u8; 32], sent_messages_num: 0, bump: 255 }
    }

    #[test]
    fn state_space_matches_layout() {
        let s = fresh(Pubkey::new_unique());
        let mut bytes = Vec::new();
        s.serialize(&mut bytes).unwrap();
        assert_eq!(DISC_SIZE + bytes.len(), STATE_SPACE);
    }

    #[test]
    fn store_then_second_store_fails() {
        let mut s = fresh(Pubkey::new_unique());
        let caller = Caller::signed(Identity::new(Pubkey::new_unique().to_bytes()));
        let root = FieldElement::new([7u8; 32]);

        assert_eq!(s.apply(caller, &Call::Store { new_root: root }).unwrap(), None);
        assert_eq!(s.allowlist_root, [7u8; 32]);

        match s.apply(caller, &Call::Store { new_root: FieldElement::new([8u8; 32]) }) {
            Err(anchor_lang::error::Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(ErrorCode::AlreadyInitialized));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(s.allowlist_root, [7u8; 32]);
        assert_eq!(s.bump, 255);
    }

    #[test]
    fn send_message_writes_back_and_replay_is_rejected() {
        use allowlist_core::{AllowlistTree, Sha256Hasher};

        let admin = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let user_id = Identity::new(user.to_bytes());

        let mut tree = AllowlistTree::new(Sha256Hasher);
        tree.add_identity(0, &user_id).unwrap();
        let witness = tree.witness(0).unwrap();

        let mut s = fresh(admin);
        s.apply(Caller::signed(Identity::new(admin.to_bytes())), &Call::Store { new_root: tree.root() }).unwrap();

        let mut content = [0u8; 32];
        content[31] = 0b011100;
        let call = Call::SendMessage { message: MessageArgs { content }.into(), witness };

        let event = s.apply(Caller::signed(user_id), &call).unwrap().expect("event");
        let ev = SentMessage::from(event);
        assert_eq!(ev.sender, user);
        assert_eq!(ev.content, content);

        tree.nullify(0).unwrap();
        assert_eq!(s.allowlist_root, tree.root().0);
        assert_eq!(s.sent_messages_num, 1);
        assert_eq!(s.admin, admin);
        assert_eq!(s.bump, 255);

        match s.apply(Caller::signed(user_id), &call) {
            Err(anchor_lang::error::Error::AnchorError(e)) => {
                assert_eq!(e.error_code_number, u32::from(ErrorCode::NotWhitelisted));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(s.allowlist_root, tree.root().0);
        assert_eq!(s.sent_messages_num, 1);
        assert_eq!(s.admin, admin);
        assert_eq!(s.bump, 255);
    }

    #[test]
    fn args_convert_to_core_types() {
        let mut content = [0u8; 32];
        content[31] = 0b011100;
        content[30] = 0x01;
        let message: Message = MessageArgs { content }.into();
        assert_eq!(message.content, U256::from(0x011Cu64));

        let witness: MerkleWitness = WitnessArgs { path: [[3u8; 32]; ALLOWLIST_TREE_DEPTH], is_left: [true; ALLOWLIST_TREE_DEPTH] }.into();
        assert_eq!(witness.path[0], FieldElement::new([3u8; 32]));
        assert_eq!(witness.calculate_index(), 0);
    }

    #[test]
    fn contract_errors_map_to_codes() {
        let cases = [
            (ContractError::AlreadyInitialized, ErrorCode::AlreadyInitialized),
            (ContractError::NotWhitelisted, ErrorCode::NotWhitelisted),
            (ContractError::Message(MessageError::Condition1Failed), ErrorCode::Condition1Failed),
            (ContractError::Message(MessageError::Condition2Failed), ErrorCode::Condition2Failed),
            (ContractError::Message(MessageError::Condition3Failed), ErrorCode::Condition3Failed),
            (ContractError::Message(MessageError::ContentTooWide { bits: 255 }), ErrorCode::ContentTooWide),
        ];
        for (e, code) in cases {
            assert_eq!(ErrorCode::from(e) as u32, code as u32);
        }
        assert_eq!(ErrorCode::NotWhitelisted.to_string(), "Not whitelisted");
    }

    #[test]
    fn event_from_core() {
        let sender = Pubkey::new_unique();
        let ev: SentMessage = SentMessageEvent {
            sender : Identity::new(sender.to_bytes()),
            content: U256::from(0b011100u64),
        }
        .into();
        assert_eq!(ev.sender, sender);
        assert_eq!(ev.content[31], 0b011100);
        assert!(ev.content[..31].iter().all(|b| *b == 0));
    }
}
