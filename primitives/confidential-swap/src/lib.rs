//! Types and traits shared by the confidential ledger, the swap engine and the
//! off-chain encryption gateway.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use blake2::{digest::consts::U32, Blake2b, Digest};
use frame_support::{pallet_prelude::*, BoundedVec};

#[cfg(feature = "testing")]
pub mod testing;

/// ElGamal-style ciphertext as understood by the configured backend.
/// bytes 0..32 = randomness commitment
/// bytes 32..64 = masked value
pub type EncryptedAmount = [u8; 64];

/// Opaque public reference to a ciphertext held by the ledger.
pub type CiphertextHandle = [u8; 32];

/// Handle reported for an account that never received anything. It denotes an
/// encryption of zero and is never stored.
pub const EMPTY_HANDLE: CiphertextHandle = [0u8; 32];

/// Address-like identifier of a ledger instance. Encrypted inputs and decrypt
/// authorizations are bound to it.
pub type LedgerId = [u8; 32];

/// Proof blob attached to an encrypted input.
pub type MaxProofLen = ConstU32<1024>;
pub type InputProof = BoundedVec<u8, MaxProofLen>;

pub const SECONDS_PER_DAY: u64 = 86_400;

const INPUT_DOMAIN: &[u8] = b"cswap/input/v1";
const HANDLE_DOMAIN: &[u8] = b"cswap/handle/v1";
const AUTHORIZATION_DOMAIN: &[u8] = b"cswap/user-decrypt/v1";

fn blake2_256(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// Everything an encrypted input is bound to. A proof produced for one binding
/// must not verify under any other.
#[derive(Clone, PartialEq, Eq, Encode, Decode, RuntimeDebug, TypeInfo)]
pub struct InputBinding {
    /// Ledger the input is submitted to.
    pub ledger: LedgerId,
    /// SCALE encoding of the submitting account.
    pub account: Vec<u8>,
    /// Balance handle of the submitting account at proving time. Any balance
    /// change invalidates outstanding proofs.
    pub balance_handle: CiphertextHandle,
}

impl InputBinding {
    pub fn new<AccountId: Encode>(
        ledger: LedgerId,
        account: &AccountId,
        balance_handle: CiphertextHandle,
    ) -> Self {
        Self {
            ledger,
            account: account.encode(),
            balance_handle,
        }
    }

    /// Digest an input attestation signs.
    pub fn message(&self, ciphertext: &EncryptedAmount) -> [u8; 32] {
        blake2_256(&[INPUT_DOMAIN, &self.encode(), ciphertext])
    }
}

/// Derive the handle under which `ciphertext` is stored. `nonce` is unique per
/// stored ciphertext so identical ciphertexts of different accounts never share
/// a handle.
pub fn derive_handle(
    ledger: &LedgerId,
    nonce: u64,
    ciphertext: &EncryptedAmount,
) -> CiphertextHandle {
    blake2_256(&[HANDLE_DOMAIN, ledger, &nonce.to_le_bytes(), ciphertext])
}

/// Ciphertext algebra and input verification supplied by a cryptographic
/// library. The ledger never sees a plaintext amount except through `trivial`,
/// used for publicly known mint amounts.
pub trait CiphertextBackend {
    type Error: core::fmt::Debug;

    /// Encryption of zero. Must be what an account without activity holds.
    fn zero() -> EncryptedAmount;

    /// Deterministic encryption of a public amount.
    fn trivial(amount: u64) -> EncryptedAmount;

    fn add(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error>;

    fn sub(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error>;

    /// Check that `proof` attests `ciphertext` is well formed for `binding`.
    fn verify_input(
        binding: &InputBinding,
        ciphertext: &EncryptedAmount,
        proof: &[u8],
    ) -> Result<(), Self::Error>;
}

/// Privileged supply path of the confidential ledger. Only pallets that own
/// supply (the swap engine) are wired to it; there is no dispatchable
/// counterpart.
pub trait ConfidentialLedger<AccountId> {
    fn balance_handle_of(who: &AccountId) -> CiphertextHandle;

    /// Homomorphically add a public `amount` to `who`. Returns the new handle.
    fn credit_encrypted(who: &AccountId, amount: u64) -> Result<CiphertextHandle, DispatchError>;

    /// Homomorphically subtract a public `amount` from `who`. The caller is
    /// responsible for knowing that `who` holds at least `amount`.
    fn debit_encrypted(who: &AccountId, amount: u64) -> Result<CiphertextHandle, DispatchError>;
}

/// Signed, time-bounded capability to learn the plaintext of `handles`.
/// Never stored on the ledger.
#[derive(Clone, PartialEq, Eq, Encode, Decode, RuntimeDebug, TypeInfo)]
pub struct DecryptAuthorization<AccountId> {
    /// Account that signs the authorization and must be allowed on every handle.
    pub requester: AccountId,
    /// Ephemeral session key generated for this request.
    pub public_key: [u8; 32],
    pub handles: Vec<CiphertextHandle>,
    /// Ledgers the handles may come from.
    pub ledgers: Vec<LedgerId>,
    /// Unix seconds.
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl<AccountId: Encode> DecryptAuthorization<AccountId> {
    /// Bytes the requester signs.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = AUTHORIZATION_DOMAIN.to_vec();
        self.encode_to(&mut payload);
        payload
    }

    /// First second at which the authorization is no longer valid.
    pub fn expires_at(&self) -> Option<u64> {
        SECONDS_PER_DAY
            .checked_mul(self.duration_days as u64)
            .and_then(|window| self.start_timestamp.checked_add(window))
    }

    pub fn is_live_at(&self, now: u64) -> bool {
        match self.expires_at() {
            Some(end) => self.start_timestamp <= now && now < end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(start: u64, days: u32) -> DecryptAuthorization<u64> {
        DecryptAuthorization {
            requester: 1,
            public_key: [3u8; 32],
            handles: vec![[9u8; 32]],
            ledgers: vec![[1u8; 32]],
            start_timestamp: start,
            duration_days: days,
        }
    }

    #[test]
    fn binding_message_depends_on_every_field() {
        let base = InputBinding::new([1u8; 32], &7u64, [2u8; 32]);
        let ct = [5u8; 64];
        let m = base.message(&ct);

        let other_ledger = InputBinding::new([9u8; 32], &7u64, [2u8; 32]);
        let other_account = InputBinding::new([1u8; 32], &8u64, [2u8; 32]);
        let other_balance = InputBinding::new([1u8; 32], &7u64, [3u8; 32]);

        assert_ne!(m, other_ledger.message(&ct));
        assert_ne!(m, other_account.message(&ct));
        assert_ne!(m, other_balance.message(&ct));
        assert_ne!(m, base.message(&[6u8; 64]));
    }

    #[test]
    fn handles_differ_per_nonce() {
        let ct = [4u8; 64];
        assert_ne!(derive_handle(&[0u8; 32], 0, &ct), derive_handle(&[0u8; 32], 1, &ct));
    }

    #[test]
    fn authorization_window_is_half_open() {
        let a = auth(1_000, 1);
        assert!(!a.is_live_at(999));
        assert!(a.is_live_at(1_000));
        assert!(a.is_live_at(1_000 + SECONDS_PER_DAY - 1));
        assert!(!a.is_live_at(1_000 + SECONDS_PER_DAY));
    }

    #[test]
    fn overflowing_window_is_never_live() {
        let a = auth(u64::MAX - 10, 1);
        assert_eq!(a.expires_at(), None);
        assert!(!a.is_live_at(u64::MAX - 5));
    }

    #[test]
    fn signing_payload_is_domain_separated() {
        let a = auth(0, 1);
        let payload = a.signing_payload();
        assert!(payload.starts_with(AUTHORIZATION_DOMAIN));
        assert_eq!(&payload[AUTHORIZATION_DOMAIN.len()..], &a.encode()[..]);
    }
}
