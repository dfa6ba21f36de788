use confidential_swap_primitives::{CiphertextHandle, LedgerId};
use thiserror::Error;

/// Why a decrypt authorization was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("authorization names no handles")]
    NoHandles,
    #[error("authorization names {count} handles, at most {max} allowed")]
    TooManyHandles { count: usize, max: usize },
    #[error("validity of {0} days is outside the accepted range")]
    InvalidDuration(u32),
    #[error("signature does not match the requester")]
    BadSignature,
    #[error("authorization is not valid yet")]
    NotYetValid,
    #[error("authorization has expired")]
    Expired,
    #[error("handle 0x{} is not held by any authorized ledger", hex::encode(.0))]
    UnknownHandle(CiphertextHandle),
    #[error("requester may not decrypt handle 0x{}", hex::encode(.0))]
    NotAllowed(CiphertextHandle),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("ciphertext is not a valid encoding")]
    MalformedCiphertext,
    #[error("plaintext exceeds the searchable range")]
    PlaintextOutOfRange,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authorization rejected: {0}")]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("ledger 0x{} is not served by this gateway", hex::encode(.0))]
    UnknownLedger(LedgerId),
    #[error("amount {requested} exceeds the sender balance")]
    InsufficientBalance { requested: u64 },
    #[error("request timed out")]
    Timeout,
    #[error("gateway service unavailable")]
    ServiceUnavailable,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl GatewayError {
    /// Failures worth retrying unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Timeout | GatewayError::ServiceUnavailable)
    }
}
