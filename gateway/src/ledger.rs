//! Read access to ledger state the gateway needs: balance handles, stored
//! ciphertexts and the decrypt ACL.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use confidential_swap_primitives::{CiphertextHandle, EncryptedAmount, LedgerId, EMPTY_HANDLE};
use sp_runtime::AccountId32;

pub trait LedgerView: Send + Sync {
    fn ledger_id(&self) -> LedgerId;

    /// Current balance handle of `who`; [`EMPTY_HANDLE`] when untouched.
    fn balance_handle_of(&self, who: &AccountId32) -> CiphertextHandle;

    /// Ciphertext behind a live handle. [`EMPTY_HANDLE`] maps to the zero
    /// encoding.
    fn ciphertext_of(&self, handle: &CiphertextHandle) -> Option<EncryptedAmount>;

    fn is_decrypt_allowed(&self, handle: &CiphertextHandle, who: &AccountId32) -> bool;
}

/// Point-in-time copy of a ledger's confidential state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub balances: HashMap<AccountId32, CiphertextHandle>,
    /// handle -> (owner, ciphertext)
    pub records: HashMap<CiphertextHandle, (AccountId32, EncryptedAmount)>,
    /// (owner, grantee) -> expiry block, exclusive
    pub grants: HashMap<(AccountId32, AccountId32), u64>,
    pub block_number: u64,
}

impl LedgerState {
    /// Point `who` at a new ciphertext, dropping the superseded record.
    pub fn set_balance(&mut self, who: AccountId32, handle: CiphertextHandle, ciphertext: EncryptedAmount) {
        if let Some(previous) = self.balances.insert(who.clone(), handle) {
            self.records.remove(&previous);
        }
        self.records.insert(handle, (who, ciphertext));
    }
}

/// [`LedgerView`] over a [`LedgerState`] that an indexer refreshes as blocks
/// are imported.
#[derive(Debug)]
pub struct MemoryLedger {
    id: LedgerId,
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new(id: LedgerId, state: LedgerState) -> Self {
        Self {
            id,
            state: RwLock::new(state),
        }
    }

    pub fn update(&self, state: LedgerState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn with_state<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LedgerView for MemoryLedger {
    fn ledger_id(&self) -> LedgerId {
        self.id
    }

    fn balance_handle_of(&self, who: &AccountId32) -> CiphertextHandle {
        self.with_state(|s| s.balances.get(who).copied().unwrap_or(EMPTY_HANDLE))
    }

    fn ciphertext_of(&self, handle: &CiphertextHandle) -> Option<EncryptedAmount> {
        if *handle == EMPTY_HANDLE {
            return Some([0u8; 64]);
        }
        self.with_state(|s| s.records.get(handle).map(|(_, ct)| *ct))
    }

    fn is_decrypt_allowed(&self, handle: &CiphertextHandle, who: &AccountId32) -> bool {
        self.with_state(|s| match s.records.get(handle) {
            None => false,
            Some((owner, _)) if owner == who => true,
            Some((owner, _)) => s
                .grants
                .get(&(owner.clone(), who.clone()))
                .is_some_and(|expiry| s.block_number < *expiry),
        })
    }
}
