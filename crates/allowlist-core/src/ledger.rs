//! In-memory host for the contract.
//!
//! Stands in for the consensus layer: transitions are applied one at a time
//! against the single state record, committed whole on success and dropped on
//! failure. Accepted submissions append to an ordered event log.

use tracing::{info, warn};

use crate::contract::{apply, Call, Caller, ContractError, ContractState, SentMessageEvent};
use crate::field::{FieldElement, Identity};
use crate::hash::FieldHasher;

#[derive(Debug, Clone)]
pub struct LocalLedger<H> {
    hasher: H,
    state: ContractState,
    events: Vec<SentMessageEvent>,
}

impl<H: FieldHasher> LocalLedger<H> {
    /// Deploys a fresh contract owned by `admin`.
    pub fn deploy(hasher: H, admin: Identity) -> Self {
        info!(%admin, "contract deployed");
        Self { hasher, state: ContractState::deploy(admin), events: Vec::new() }
    }

    /// Applies one transaction; state and log are untouched on error.
    pub fn submit(&mut self, caller: Caller, call: Call) -> Result<(), ContractError> {
        let applied = match apply(&self.hasher, &self.state, &caller, &call) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(caller = %caller.identity, error = %e, "transaction rejected");
                return Err(e);
            }
        };

        self.state = applied.state;
        if let Some(event) = applied.event {
            self.events.push(event);
        }
        info!(
            caller = %caller.identity,
            root = %self.state.allowlist_root,
            sent = self.state.sent_messages_num,
            "transaction committed"
        );
        Ok(())
    }

    pub fn state(&self) -> &ContractState {
        &self.state
    }

    pub fn events(&self) -> &[SentMessageEvent] {
        &self.events
    }

    pub fn allowlist_root(&self) -> FieldElement {
        self.state.allowlist_root
    }

    pub fn sent_messages_num(&self) -> u64 {
        self.state.sent_messages_num
    }

    pub fn admin(&self) -> Identity {
        self.state.admin
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

#[cfg(all(test, feature = "sha256"))]
mod tests {
    use super::*;
    use crate::hash::Sha256Hasher;
    use crate::merkle::AllowlistTree;
    use crate::message::{Message, MessageError};
    use alloy_primitives::U256;

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let user = Identity::new([3; 32]);
        let mut tree = AllowlistTree::new(Sha256Hasher);
        tree.add_identity(0, &user).unwrap();

        let mut ledger = LocalLedger::deploy(Sha256Hasher, Identity::new([1; 32]));
        ledger.submit(Caller::signed(Identity::new([1; 32])), Call::Store { new_root: tree.root() }).unwrap();
        let before = *ledger.state();

        let bad = Call::SendMessage { message: Message::new(U256::from(0b000111)), witness: tree.witness(0).unwrap() };
        assert_eq!(
            ledger.submit(Caller::signed(user), bad),
            Err(ContractError::Message(MessageError::Condition3Failed))
        );
        assert_eq!(*ledger.state(), before);
        assert!(ledger.events().is_empty());
    }
}
