use core::fmt;

use confidential_elgamal::{Ciphertext, PublicKey};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sp_core::{ed25519, Pair};

/// Key material of the gateway: the network ElGamal secret every balance is
/// encrypted under, and the ed25519 key that attests encrypted inputs.
pub struct NetworkKeys {
    elgamal_secret: Scalar,
    attestor: ed25519::Pair,
}

pub(crate) fn random_scalar<R: RngCore>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

impl NetworkKeys {
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Deterministic keys for tests and reproducible deployments.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mut rng = ChaCha20Rng::from_seed(seed);
        let elgamal_secret = random_scalar(&mut rng);
        let mut attestor_seed = [0u8; 32];
        rng.fill_bytes(&mut attestor_seed);
        Self {
            elgamal_secret,
            attestor: ed25519::Pair::from_seed(&attestor_seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret(&self.elgamal_secret)
    }

    /// Key a ledger's backend verifies input attestations against.
    pub fn attestor_public(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.attestor.public().as_ref());
        out
    }

    pub(crate) fn attest(&self, message: &[u8]) -> [u8; 64] {
        let mut out = [0u8; 64];
        out.copy_from_slice(self.attestor.sign(message).as_ref());
        out
    }

    pub(crate) fn open(&self, ciphertext: &Ciphertext) -> RistrettoPoint {
        ciphertext.decrypt_point(&self.elgamal_secret)
    }
}

impl fmt::Debug for NetworkKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkKeys")
            .field("public_key", &hex::encode(self.public_key().to_bytes()))
            .field("attestor", &hex::encode(self.attestor_public()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_keys_are_reproducible() {
        let a = NetworkKeys::from_seed([7u8; 32]);
        let b = NetworkKeys::from_seed([7u8; 32]);
        let c = NetworkKeys::from_seed([8u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.attestor_public(), b.attestor_public());
        assert_ne!(a.public_key(), c.public_key());
    }

    #[test]
    fn debug_does_not_print_secrets() {
        let keys = NetworkKeys::from_seed([1u8; 32]);
        let printed = format!("{keys:?}");
        assert!(printed.contains(&hex::encode(keys.attestor_public())));
        assert!(!printed.contains(&hex::encode(keys.elgamal_secret.as_bytes())));
    }
}
