//! Transparent backend for unit tests: the "ciphertext" carries the plaintext
//! in the clear, so tests can assert on balances and on the supply invariant.
//! Never wire this into a production runtime.

use super::*;

/// Plaintext little-endian in bytes 32..40, everything else zero.
pub struct TransparentBackend;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransparentError {
    Overflow,
    Underflow,
    BadProof,
}

impl TransparentBackend {
    pub fn encrypt(amount: u64) -> EncryptedAmount {
        let mut out = [0u8; 64];
        out[32..40].copy_from_slice(&amount.to_le_bytes());
        out
    }

    pub fn decrypt(ciphertext: &EncryptedAmount) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&ciphertext[32..40]);
        u64::from_le_bytes(raw)
    }

    /// The only proof `verify_input` accepts for (`binding`, `ciphertext`).
    pub fn prove(binding: &InputBinding, ciphertext: &EncryptedAmount) -> Vec<u8> {
        binding.message(ciphertext).to_vec()
    }
}

impl CiphertextBackend for TransparentBackend {
    type Error = TransparentError;

    fn zero() -> EncryptedAmount {
        [0u8; 64]
    }

    fn trivial(amount: u64) -> EncryptedAmount {
        Self::encrypt(amount)
    }

    fn add(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error> {
        Self::decrypt(lhs)
            .checked_add(Self::decrypt(rhs))
            .map(Self::encrypt)
            .ok_or(TransparentError::Overflow)
    }

    fn sub(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error> {
        Self::decrypt(lhs)
            .checked_sub(Self::decrypt(rhs))
            .map(Self::encrypt)
            .ok_or(TransparentError::Underflow)
    }

    fn verify_input(
        binding: &InputBinding,
        ciphertext: &EncryptedAmount,
        proof: &[u8],
    ) -> Result<(), Self::Error> {
        if proof == binding.message(ciphertext).as_slice() {
            Ok(())
        } else {
            Err(TransparentError::BadProof)
        }
    }
}
