use confidential_swap_primitives::{CiphertextHandle, DecryptAuthorization, LedgerId};
use sp_core::{sr25519, Pair};
use sp_runtime::AccountId32;

use crate::gateway::SignedDecryptRequest;

/// Client side of a user decryption: a long-lived account key that signs, and
/// an ephemeral session key generated per session. Dropping the session
/// discards the ephemeral key.
pub struct UserDecryptSession {
    signer: sr25519::Pair,
    ephemeral: sr25519::Pair,
}

impl UserDecryptSession {
    pub fn new(signer: sr25519::Pair) -> Self {
        let (ephemeral, _) = sr25519::Pair::generate();
        Self { signer, ephemeral }
    }

    pub fn requester(&self) -> AccountId32 {
        AccountId32::from(self.signer.public())
    }

    pub fn session_public(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.ephemeral.public().as_ref());
        out
    }

    /// Build and sign an authorization valid for
    /// `[start_timestamp, start_timestamp + duration_days days)`.
    pub fn authorize(
        &self,
        handles: Vec<CiphertextHandle>,
        ledgers: Vec<LedgerId>,
        start_timestamp: u64,
        duration_days: u32,
    ) -> SignedDecryptRequest {
        let authorization = DecryptAuthorization {
            requester: self.requester(),
            public_key: self.session_public(),
            handles,
            ledgers,
            start_timestamp,
            duration_days,
        };
        let mut signature = [0u8; 64];
        signature.copy_from_slice(self.signer.sign(&authorization.signing_payload()).as_ref());
        SignedDecryptRequest {
            authorization,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_use_fresh_ephemeral_keys() {
        let signer = sr25519::Pair::from_seed(&[5u8; 32]);
        let a = UserDecryptSession::new(signer.clone());
        let b = UserDecryptSession::new(signer);
        assert_eq!(a.requester(), b.requester());
        assert_ne!(a.session_public(), b.session_public());
    }

    #[test]
    fn authorization_signature_verifies_for_requester() {
        let session = UserDecryptSession::new(sr25519::Pair::from_seed(&[5u8; 32]));
        let request = session.authorize(vec![[1u8; 32]], vec![[2u8; 32]], 100, 1);
        let public = session.signer.public();
        let signature = sr25519::Signature::from_raw(request.signature);
        assert!(sr25519::Pair::verify(
            &signature,
            request.authorization.signing_payload(),
            &public
        ));
        assert_eq!(request.authorization.public_key, session.session_public());
    }
}
