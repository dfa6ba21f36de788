//! **pallet-confidential-ledger**
//!
//! One encrypted balance per account, updated only through the configured
//! [`CiphertextBackend`]. The pallet never sees a plaintext amount except the
//! public amounts handed to it by supply-owning pallets through
//! [`ConfidentialLedger`].
//!
//! - Balances are exposed as opaque [`CiphertextHandle`]s. An account without
//!   activity reports [`EMPTY_HANDLE`], an encryption of zero.
//! - `confidential_transfer` consumes an encrypted input whose proof is bound to
//!   this ledger, the sender and the sender's current balance handle.
//! - The decrypt ACL is keyed by the owner of a handle. Owners may always
//!   decrypt their own handles and may grant a third party access until a
//!   block number. Expired grants are inert and never purged.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{pallet_prelude::*, traits::Contains};
use frame_system::pallet_prelude::*;
use sp_runtime::traits::TrailingZeroInput;

pub use confidential_swap_primitives::{
    derive_handle, CiphertextBackend, CiphertextHandle, ConfidentialLedger, EncryptedAmount,
    InputBinding, InputProof, LedgerId, EMPTY_HANDLE,
};

pub use pallet::*;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;
#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::confidential-ledger";

/// A stored ciphertext and the account whose balance it is.
#[derive(Clone, PartialEq, Eq, Encode, Decode, MaxEncodedLen, RuntimeDebug, TypeInfo)]
pub struct CiphertextRecord<AccountId> {
    pub owner: AccountId,
    pub ciphertext: EncryptedAmount,
}

pub trait WeightInfo {
    fn confidential_transfer() -> Weight;
    fn grant_decrypt_access() -> Weight;
    fn revoke_decrypt_access() -> Weight;
}

impl WeightInfo for () {
    fn confidential_transfer() -> Weight {
        Weight::from_parts(120_000, 0)
    }
    fn grant_decrypt_access() -> Weight {
        Weight::from_parts(20_000, 0)
    }
    fn revoke_decrypt_access() -> Weight {
        Weight::from_parts(20_000, 0)
    }
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Ciphertext algebra and input-proof verification.
        type Backend: CiphertextBackend;

        /// Identifier encrypted inputs and decrypt authorizations are bound to.
        #[pallet::constant]
        type LedgerId: Get<LedgerId>;

        type TokenName: Get<&'static [u8]>;
        type TokenSymbol: Get<&'static [u8]>;

        #[pallet::constant]
        type TokenDecimals: Get<u8>;

        /// Accounts `confidential_transfer` refuses to pay, such as reserves
        /// whose encrypted balance is tracked elsewhere.
        type BlockedRecipients: Contains<Self::AccountId>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    // ---- Storage ----

    /// Current balance handle per account. Entries are never removed.
    #[pallet::storage]
    pub type Balances<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, CiphertextHandle, OptionQuery>;

    /// Live ciphertexts. A record is dropped once its owner's balance moves on.
    #[pallet::storage]
    pub type Ciphertexts<T: Config> =
        StorageMap<_, Identity, CiphertextHandle, CiphertextRecord<T::AccountId>, OptionQuery>;

    #[pallet::storage]
    pub type NextHandleNonce<T: Config> = StorageValue<_, u64, ValueQuery>;

    /// (owner, grantee) -> first block at which the grant no longer applies.
    #[pallet::storage]
    pub type DecryptGrants<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        BlockNumberFor<T>,
        OptionQuery,
    >;

    // ---- Events / Errors ----

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        ConfidentialTransfer {
            from: T::AccountId,
            to: T::AccountId,
            from_handle: CiphertextHandle,
            to_handle: CiphertextHandle,
        },
        /// Public amount minted or moved into `who` by a supply-owning pallet.
        Credited {
            who: T::AccountId,
            handle: CiphertextHandle,
        },
        Debited {
            who: T::AccountId,
            handle: CiphertextHandle,
        },
        DecryptAccessGranted {
            owner: T::AccountId,
            grantee: T::AccountId,
            expiry: BlockNumberFor<T>,
        },
        DecryptAccessRevoked {
            owner: T::AccountId,
            grantee: T::AccountId,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Recipient is the null account or a blocked reserve.
        InvalidRecipient,
        /// Input proof does not verify for this ledger, sender and balance.
        ProofVerificationFailed,
        /// A balance points at a ciphertext that is not stored.
        UnknownHandle,
        /// Handle nonce exhausted or the backend refused a homomorphic update.
        ArithmeticOverflow,
        /// Grant expiry is not after the current block.
        ExpiryInPast,
    }

    // ---- Calls ----

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Move an encrypted amount from the caller to `to`.
        ///
        /// `input_proof` must verify for the binding
        /// `(LedgerId, caller, balance_handle_of(caller))`, so a proof cannot be
        /// replayed on another ledger, by another account, or after the
        /// caller's balance has changed.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::confidential_transfer())]
        pub fn confidential_transfer(
            origin: OriginFor<T>,
            to: T::AccountId,
            encrypted_amount: EncryptedAmount,
            input_proof: InputProof,
        ) -> DispatchResult {
            let from = ensure_signed(origin)?;
            Self::ensure_valid_recipient(&to)?;

            let binding =
                InputBinding::new(T::LedgerId::get(), &from, Self::balance_handle_of(&from));
            T::Backend::verify_input(&binding, &encrypted_amount, &input_proof).map_err(|e| {
                log::warn!(target: LOG_TARGET, "rejected input proof from {:?}: {:?}", from, e);
                Error::<T>::ProofVerificationFailed
            })?;

            let from_current = Self::ciphertext_or_zero(&from)?;
            let from_next = T::Backend::sub(&from_current, &encrypted_amount)
                .map_err(|_| Error::<T>::ArithmeticOverflow)?;
            let from_handle = Self::store_balance(&from, from_next)?;

            // Read after the debit so a self-transfer nets to the original value.
            let to_current = Self::ciphertext_or_zero(&to)?;
            let to_next = T::Backend::add(&to_current, &encrypted_amount)
                .map_err(|_| Error::<T>::ArithmeticOverflow)?;
            let to_handle = Self::store_balance(&to, to_next)?;

            log::debug!(target: LOG_TARGET, "transfer {:?} -> {:?}", from, to);
            Self::deposit_event(Event::ConfidentialTransfer {
                from,
                to,
                from_handle,
                to_handle,
            });
            Ok(())
        }

        /// Let `grantee` decrypt the caller's balance handles until `expiry`
        /// (exclusive). Replaces any earlier grant to the same grantee.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::grant_decrypt_access())]
        pub fn grant_decrypt_access(
            origin: OriginFor<T>,
            grantee: T::AccountId,
            expiry: BlockNumberFor<T>,
        ) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            ensure!(
                expiry > frame_system::Pallet::<T>::block_number(),
                Error::<T>::ExpiryInPast
            );
            DecryptGrants::<T>::insert(&owner, &grantee, expiry);
            Self::deposit_event(Event::DecryptAccessGranted {
                owner,
                grantee,
                expiry,
            });
            Ok(())
        }

        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::revoke_decrypt_access())]
        pub fn revoke_decrypt_access(origin: OriginFor<T>, grantee: T::AccountId) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            DecryptGrants::<T>::remove(&owner, &grantee);
            Self::deposit_event(Event::DecryptAccessRevoked { owner, grantee });
            Ok(())
        }
    }

    // ---- Read API ----

    impl<T: Config> Pallet<T> {
        pub fn balance_handle_of(who: &T::AccountId) -> CiphertextHandle {
            Balances::<T>::get(who).unwrap_or(EMPTY_HANDLE)
        }

        pub fn ciphertext_of(handle: &CiphertextHandle) -> Option<EncryptedAmount> {
            if *handle == EMPTY_HANDLE {
                return Some(T::Backend::zero());
            }
            Ciphertexts::<T>::get(handle).map(|record| record.ciphertext)
        }

        pub fn owner_of(handle: &CiphertextHandle) -> Option<T::AccountId> {
            Ciphertexts::<T>::get(handle).map(|record| record.owner)
        }

        /// Whether `who` may ask the gateway for the plaintext of `handle`.
        pub fn is_decrypt_allowed(handle: &CiphertextHandle, who: &T::AccountId) -> bool {
            let Some(owner) = Self::owner_of(handle) else {
                return false;
            };
            if owner == *who {
                return true;
            }
            DecryptGrants::<T>::get(&owner, who)
                .is_some_and(|expiry| frame_system::Pallet::<T>::block_number() < expiry)
        }

        pub fn decrypt_grant(owner: &T::AccountId, grantee: &T::AccountId) -> Option<BlockNumberFor<T>> {
            DecryptGrants::<T>::get(owner, grantee)
        }

        pub fn token_name() -> &'static [u8] {
            T::TokenName::get()
        }

        pub fn token_symbol() -> &'static [u8] {
            T::TokenSymbol::get()
        }

        pub fn token_decimals() -> u8 {
            T::TokenDecimals::get()
        }

        pub fn ledger_id() -> LedgerId {
            T::LedgerId::get()
        }
    }

    // ---- Helpers ----

    impl<T: Config> Pallet<T> {
        fn ensure_valid_recipient(to: &T::AccountId) -> DispatchResult {
            if let Ok(null) = T::AccountId::decode(&mut TrailingZeroInput::zeroes()) {
                ensure!(*to != null, Error::<T>::InvalidRecipient);
            }
            ensure!(!T::BlockedRecipients::contains(to), Error::<T>::InvalidRecipient);
            Ok(())
        }

        fn ciphertext_or_zero(who: &T::AccountId) -> Result<EncryptedAmount, DispatchError> {
            match Balances::<T>::get(who) {
                None => Ok(T::Backend::zero()),
                Some(handle) => Ciphertexts::<T>::get(handle)
                    .map(|record| record.ciphertext)
                    .ok_or_else(|| Error::<T>::UnknownHandle.into()),
            }
        }

        /// Store `ciphertext` as the new balance of `who` under a fresh handle
        /// and drop the superseded record.
        fn store_balance(
            who: &T::AccountId,
            ciphertext: EncryptedAmount,
        ) -> Result<CiphertextHandle, DispatchError> {
            let nonce = NextHandleNonce::<T>::get();
            let next = nonce.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
            NextHandleNonce::<T>::put(next);

            let handle = derive_handle(&T::LedgerId::get(), nonce, &ciphertext);
            if let Some(previous) = Balances::<T>::get(who) {
                Ciphertexts::<T>::remove(previous);
            }
            Ciphertexts::<T>::insert(
                handle,
                CiphertextRecord {
                    owner: who.clone(),
                    ciphertext,
                },
            );
            Balances::<T>::insert(who, handle);
            log::trace!(target: LOG_TARGET, "balance of {:?} now {:?}", who, handle);
            Ok(handle)
        }

        fn apply_public(
            who: &T::AccountId,
            amount: u64,
            credit: bool,
        ) -> Result<CiphertextHandle, DispatchError> {
            frame_support::storage::with_storage_layer(|| {
                let current = Self::ciphertext_or_zero(who)?;
                let delta = T::Backend::trivial(amount);
                let next = if credit {
                    T::Backend::add(&current, &delta)
                } else {
                    T::Backend::sub(&current, &delta)
                }
                .map_err(|_| Error::<T>::ArithmeticOverflow)?;
                Self::store_balance(who, next)
            })
        }
    }

    // ---- ConfidentialLedger (supply path, not dispatchable) ----

    impl<T: Config> ConfidentialLedger<T::AccountId> for Pallet<T> {
        fn balance_handle_of(who: &T::AccountId) -> CiphertextHandle {
            Pallet::<T>::balance_handle_of(who)
        }

        fn credit_encrypted(who: &T::AccountId, amount: u64) -> Result<CiphertextHandle, DispatchError> {
            let handle = Self::apply_public(who, amount, true)?;
            Self::deposit_event(Event::Credited {
                who: who.clone(),
                handle,
            });
            Ok(handle)
        }

        fn debit_encrypted(who: &T::AccountId, amount: u64) -> Result<CiphertextHandle, DispatchError> {
            let handle = Self::apply_public(who, amount, false)?;
            Self::deposit_event(Event::Debited {
                who: who.clone(),
                handle,
            });
            Ok(handle)
        }
    }
}
