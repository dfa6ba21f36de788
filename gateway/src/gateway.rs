use std::{collections::BTreeMap, sync::Arc};

use confidential_elgamal::{Ciphertext, ATTESTATION_LEN};
use confidential_swap_primitives::{
    CiphertextHandle, DecryptAuthorization, EncryptedAmount, InputBinding, InputProof, LedgerId,
    EMPTY_HANDLE,
};
use parity_scale_codec::{Decode, Encode};
use rand::rngs::OsRng;
use sp_core::{sr25519, Pair};
use sp_runtime::AccountId32;
use tracing::{debug, info, warn};

use crate::{
    config::GatewayConfig,
    dlog::DiscreteLog,
    error::{AuthorizationError, CryptoError, GatewayError},
    keys::{random_scalar, NetworkKeys},
    ledger::LedgerView,
};

/// Where an encrypted input is going to be submitted, and by whom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundContext {
    pub ledger: LedgerId,
    pub account: AccountId32,
}

/// Ciphertext plus the attestation a ledger accepts for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub ciphertext: EncryptedAmount,
    pub proof: [u8; ATTESTATION_LEN],
    /// What the proof is bound to. Submitting after the sender's balance
    /// changed makes it stale.
    pub binding: InputBinding,
}

impl EncryptedInput {
    pub fn input_proof(&self) -> InputProof {
        InputProof::truncate_from(self.proof.to_vec())
    }
}

/// A decrypt authorization and the requester's sr25519 signature over
/// [`DecryptAuthorization::signing_payload`].
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct SignedDecryptRequest {
    pub authorization: DecryptAuthorization<AccountId32>,
    pub signature: [u8; 64],
}

pub struct Gateway {
    keys: NetworkKeys,
    config: GatewayConfig,
    dlog: DiscreteLog,
    ledgers: BTreeMap<LedgerId, Arc<dyn LedgerView>>,
}

impl Gateway {
    pub fn new(keys: NetworkKeys, config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let dlog = DiscreteLog::new(config.dlog_table_bits, config.max_plaintext_bits);
        info!(
            table_bits = config.dlog_table_bits,
            max_bits = config.max_plaintext_bits,
            "gateway ready"
        );
        Ok(Self {
            keys,
            config,
            dlog,
            ledgers: BTreeMap::new(),
        })
    }

    /// Serve `view`. A later view for the same ledger id replaces it.
    pub fn with_ledger(mut self, view: Arc<dyn LedgerView>) -> Self {
        self.ledgers.insert(view.ledger_id(), view);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn network_public_key(&self) -> [u8; 32] {
        self.keys.public_key().to_bytes()
    }

    pub fn attestor_public(&self) -> [u8; 32] {
        self.keys.attestor_public()
    }

    fn ledger(&self, id: &LedgerId) -> Result<&Arc<dyn LedgerView>, GatewayError> {
        self.ledgers.get(id).ok_or(GatewayError::UnknownLedger(*id))
    }

    fn plaintext_of(&self, ciphertext: &EncryptedAmount) -> Result<u64, CryptoError> {
        let ciphertext =
            Ciphertext::from_bytes(ciphertext).map_err(|_| CryptoError::MalformedCiphertext)?;
        self.dlog
            .solve(&self.keys.open(&ciphertext))
            .ok_or(CryptoError::PlaintextOutOfRange)
    }

    /// Encrypt `plaintext` under the network key with fresh randomness and
    /// attest it for `context`.
    ///
    /// The attestation is bound to the sender's current balance handle, and is
    /// refused when `plaintext` exceeds that balance.
    pub fn encrypt(
        &self,
        plaintext: u64,
        context: &BoundContext,
    ) -> Result<EncryptedInput, GatewayError> {
        let view = self.ledger(&context.ledger)?;
        let balance_handle = view.balance_handle_of(&context.account);
        let balance_ct = view
            .ciphertext_of(&balance_handle)
            .ok_or(AuthorizationError::UnknownHandle(balance_handle))?;
        if plaintext > self.plaintext_of(&balance_ct)? {
            warn!(account = %context.account, "refusing to attest amount above balance");
            return Err(GatewayError::InsufficientBalance {
                requested: plaintext,
            });
        }

        let r = random_scalar(&mut OsRng);
        let ciphertext = Ciphertext::encrypt(&self.keys.public_key(), plaintext, &r).to_bytes();
        let binding = InputBinding::new(context.ledger, &context.account, balance_handle);
        let proof = self.keys.attest(&binding.message(&ciphertext));

        debug!(account = %context.account, "attested encrypted input");
        Ok(EncryptedInput {
            ciphertext,
            proof,
            binding,
        })
    }

    /// Plaintexts of the handles named in `request`, checked against the
    /// signature, the validity window at `now` (unix seconds) and each
    /// ledger's ACL. The empty handle always decrypts to zero.
    pub fn decrypt(
        &self,
        request: &SignedDecryptRequest,
        now: u64,
    ) -> Result<BTreeMap<CiphertextHandle, u64>, GatewayError> {
        let auth = &request.authorization;
        if let Err(e) = self.check_authorization(request, now) {
            warn!(requester = %auth.requester, error = %e, "decrypt request denied");
            return Err(e.into());
        }

        let views = auth
            .ledgers
            .iter()
            .map(|id| self.ledger(id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut plaintexts = BTreeMap::new();
        for handle in &auth.handles {
            if *handle == EMPTY_HANDLE {
                plaintexts.insert(*handle, 0);
                continue;
            }
            let (view, ciphertext) = views
                .iter()
                .find_map(|view| view.ciphertext_of(handle).map(|ct| (view, ct)))
                .ok_or(AuthorizationError::UnknownHandle(*handle))?;
            if !view.is_decrypt_allowed(handle, &auth.requester) {
                warn!(requester = %auth.requester, "handle not decryptable by requester");
                return Err(AuthorizationError::NotAllowed(*handle).into());
            }
            plaintexts.insert(*handle, self.plaintext_of(&ciphertext)?);
        }

        info!(requester = %auth.requester, count = plaintexts.len(), "user decrypt served");
        Ok(plaintexts)
    }

    fn check_authorization(
        &self,
        request: &SignedDecryptRequest,
        now: u64,
    ) -> Result<(), AuthorizationError> {
        let auth = &request.authorization;
        if auth.handles.is_empty() {
            return Err(AuthorizationError::NoHandles);
        }
        if auth.handles.len() > self.config.max_handles_per_request {
            return Err(AuthorizationError::TooManyHandles {
                count: auth.handles.len(),
                max: self.config.max_handles_per_request,
            });
        }
        if auth.duration_days == 0 || auth.duration_days > self.config.max_validity_days {
            return Err(AuthorizationError::InvalidDuration(auth.duration_days));
        }

        let raw: &[u8; 32] = auth.requester.as_ref();
        let requester = sr25519::Public::from_raw(*raw);
        let signature = sr25519::Signature::from_raw(request.signature);
        if !sr25519::Pair::verify(&signature, auth.signing_payload(), &requester) {
            return Err(AuthorizationError::BadSignature);
        }

        if now < auth.start_timestamp {
            return Err(AuthorizationError::NotYetValid);
        }
        if !auth.is_live_at(now) {
            return Err(AuthorizationError::Expired);
        }
        Ok(())
    }
}
