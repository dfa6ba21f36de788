//! Lifted ElGamal over Ristretto255.
//!
//! All balances are encrypted under a single network key held by the
//! encryption gateway, which is what makes ciphertexts of different accounts
//! addable:
//!
//! ```text
//! C = r·G
//! D = v·G + r·PK
//! ```
//!
//! The identity pair encodes to 64 zero bytes and is the encryption of zero an
//! empty account holds. Encrypted inputs carry a 64-byte ed25519 attestation by
//! the gateway over [`InputBinding::message`].
#![cfg_attr(not(feature = "std"), no_std)]

use core::{
    marker::PhantomData,
    ops::{Add, Sub},
};

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use frame_support::traits::Get;
use sp_core::ed25519;

use confidential_swap_primitives::{CiphertextBackend, EncryptedAmount, InputBinding};

/// Length of the attestation an encrypted input carries.
pub const ATTESTATION_LEN: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ElGamalError {
    /// A half of the ciphertext is not a canonical Ristretto encoding.
    MalformedCiphertext,
    /// Proof has the wrong length.
    MalformedProof,
    /// Attestation signature does not verify for the binding.
    BadAttestation,
}

/// Network public key every balance is encrypted under.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey(pub RistrettoPoint);

impl PublicKey {
    pub fn from_secret(secret: &Scalar) -> Self {
        Self(secret * G)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        CompressedRistretto(*bytes).decompress().map(Self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ciphertext {
    pub c: RistrettoPoint,
    pub d: RistrettoPoint,
}

impl Ciphertext {
    pub fn zero() -> Self {
        Self {
            c: RistrettoPoint::identity(),
            d: RistrettoPoint::identity(),
        }
    }

    /// Randomness-free encryption of a public amount.
    pub fn trivial(value: u64) -> Self {
        Self {
            c: RistrettoPoint::identity(),
            d: Scalar::from(value) * G,
        }
    }

    /// Encrypt `value` under `pk` with randomness `r`. Callers must draw a
    /// fresh `r` per ciphertext.
    pub fn encrypt(pk: &PublicKey, value: u64, r: &Scalar) -> Self {
        Self {
            c: r * G,
            d: Scalar::from(value) * G + r * pk.0,
        }
    }

    /// `v·G` for the encrypted `v`. Recovering `v` itself is a bounded
    /// discrete log left to the key holder.
    pub fn decrypt_point(&self, secret: &Scalar) -> RistrettoPoint {
        self.d - secret * self.c
    }

    pub fn to_bytes(&self) -> EncryptedAmount {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(self.c.compress().as_bytes());
        out[32..].copy_from_slice(self.d.compress().as_bytes());
        out
    }

    pub fn from_bytes(bytes: &EncryptedAmount) -> Result<Self, ElGamalError> {
        let mut c = [0u8; 32];
        let mut d = [0u8; 32];
        c.copy_from_slice(&bytes[..32]);
        d.copy_from_slice(&bytes[32..]);
        let c = CompressedRistretto(c)
            .decompress()
            .ok_or(ElGamalError::MalformedCiphertext)?;
        let d = CompressedRistretto(d)
            .decompress()
            .ok_or(ElGamalError::MalformedCiphertext)?;
        Ok(Self { c, d })
    }
}

impl Add for Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            c: self.c + rhs.c,
            d: self.d + rhs.d,
        }
    }
}

impl Sub for Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            c: self.c - rhs.c,
            d: self.d - rhs.d,
        }
    }
}

/// Verify the gateway attestation over `binding` and `ciphertext`.
pub fn verify_attestation(
    attestor: &[u8; 32],
    binding: &InputBinding,
    ciphertext: &EncryptedAmount,
    proof: &[u8],
) -> Result<(), ElGamalError> {
    let raw: [u8; ATTESTATION_LEN] = proof
        .try_into()
        .map_err(|_| ElGamalError::MalformedProof)?;
    let signature = ed25519::Signature::from_raw(raw);
    let public = ed25519::Public::from_raw(*attestor);
    let message = binding.message(ciphertext);
    if sp_io::crypto::ed25519_verify(&signature, &message, &public) {
        Ok(())
    } else {
        Err(ElGamalError::BadAttestation)
    }
}

/// [`CiphertextBackend`] over lifted ElGamal. `Attestor` yields the gateway's
/// ed25519 attestation key.
pub struct ElGamalBackend<Attestor>(PhantomData<Attestor>);

impl<Attestor: Get<[u8; 32]>> CiphertextBackend for ElGamalBackend<Attestor> {
    type Error = ElGamalError;

    fn zero() -> EncryptedAmount {
        Ciphertext::zero().to_bytes()
    }

    fn trivial(amount: u64) -> EncryptedAmount {
        Ciphertext::trivial(amount).to_bytes()
    }

    fn add(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error> {
        Ok((Ciphertext::from_bytes(lhs)? + Ciphertext::from_bytes(rhs)?).to_bytes())
    }

    fn sub(lhs: &EncryptedAmount, rhs: &EncryptedAmount) -> Result<EncryptedAmount, Self::Error> {
        Ok((Ciphertext::from_bytes(lhs)? - Ciphertext::from_bytes(rhs)?).to_bytes())
    }

    fn verify_input(
        binding: &InputBinding,
        ciphertext: &EncryptedAmount,
        proof: &[u8],
    ) -> Result<(), Self::Error> {
        // The attestation alone does not prove the ciphertext decodes.
        Ciphertext::from_bytes(ciphertext)?;
        verify_attestation(&Attestor::get(), binding, ciphertext, proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_support::parameter_types;
    use rand::RngCore;
    use sp_core::Pair;

    parameter_types! {
        pub static TestAttestor: [u8; 32] = [0u8; 32];
    }

    type Backend = ElGamalBackend<TestAttestor>;

    fn random_scalar() -> Scalar {
        let mut bytes = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut bytes);
        Scalar::from_bytes_mod_order_wide(&bytes)
    }

    fn attestor() -> ed25519::Pair {
        let pair = ed25519::Pair::from_seed(&[42u8; 32]);
        let mut public = [0u8; 32];
        public.copy_from_slice(pair.public().as_ref());
        TestAttestor::set(public);
        pair
    }

    fn attest(pair: &ed25519::Pair, binding: &InputBinding, ct: &EncryptedAmount) -> Vec<u8> {
        AsRef::<[u8]>::as_ref(&pair.sign(&binding.message(ct))).to_vec()
    }

    #[test]
    fn zero_encodes_to_zero_bytes() {
        assert_eq!(Backend::zero(), [0u8; 64]);
        assert_eq!(Ciphertext::from_bytes(&[0u8; 64]).unwrap(), Ciphertext::zero());
    }

    #[test]
    fn homomorphic_add_and_sub_track_plaintext() {
        let sk = random_scalar();
        let pk = PublicKey::from_secret(&sk);

        let a = Ciphertext::encrypt(&pk, 700, &random_scalar()).to_bytes();
        let b = Ciphertext::encrypt(&pk, 300, &random_scalar()).to_bytes();
        let five = Backend::trivial(5);

        let sum = Backend::add(&a, &b).unwrap();
        let sum = Backend::add(&sum, &five).unwrap();
        let diff = Backend::sub(&sum, &b).unwrap();

        let sum_point = Ciphertext::from_bytes(&sum).unwrap().decrypt_point(&sk);
        let diff_point = Ciphertext::from_bytes(&diff).unwrap().decrypt_point(&sk);
        assert_eq!(sum_point, Scalar::from(1_005u64) * G);
        assert_eq!(diff_point, Scalar::from(705u64) * G);
    }

    #[test]
    fn fresh_randomness_changes_bytes_not_value() {
        let sk = random_scalar();
        let pk = PublicKey::from_secret(&sk);
        let x = Ciphertext::encrypt(&pk, 9, &random_scalar());
        let y = Ciphertext::encrypt(&pk, 9, &random_scalar());
        assert_ne!(x.to_bytes(), y.to_bytes());
        assert_eq!(x.decrypt_point(&sk), y.decrypt_point(&sk));
    }

    #[test]
    fn non_canonical_points_are_rejected() {
        let mut bytes = [0u8; 64];
        bytes[32..].copy_from_slice(&[0xffu8; 32]);
        assert_eq!(
            Backend::add(&bytes, &Backend::zero()),
            Err(ElGamalError::MalformedCiphertext)
        );
    }

    #[test]
    fn attested_input_verifies_only_for_its_binding() {
        let pair = attestor();
        let pk = PublicKey::from_secret(&random_scalar());
        let ct = Ciphertext::encrypt(&pk, 11, &random_scalar()).to_bytes();
        let binding = InputBinding::new([1u8; 32], &5u64, [0u8; 32]);
        let proof = attest(&pair, &binding, &ct);

        assert_eq!(Backend::verify_input(&binding, &ct, &proof), Ok(()));

        let elsewhere = InputBinding::new([2u8; 32], &5u64, [0u8; 32]);
        assert_eq!(
            Backend::verify_input(&elsewhere, &ct, &proof),
            Err(ElGamalError::BadAttestation)
        );
        let other_account = InputBinding::new([1u8; 32], &6u64, [0u8; 32]);
        assert_eq!(
            Backend::verify_input(&other_account, &ct, &proof),
            Err(ElGamalError::BadAttestation)
        );
        assert_eq!(
            Backend::verify_input(&binding, &ct, &proof[..10]),
            Err(ElGamalError::MalformedProof)
        );
    }
}
