//! Off-ledger encryption gateway.
//!
//! Holds the network ElGamal key every confidential balance is encrypted
//! under. It serves two operations and never writes to a ledger:
//!
//! - **encrypt**: turn a plaintext amount into a ciphertext plus an attestation
//!   bound to (ledger, sender, sender's current balance handle). The gateway
//!   refuses to attest an amount above the sender's balance.
//! - **user decrypt**: return plaintexts for a set of handles to a requester
//!   holding a signed, time-bounded [`DecryptAuthorization`], after checking
//!   the ledger's ACL through a [`LedgerView`].
//!
//! [`GatewayService`] runs the gateway as its own task; callers own timeouts
//! and retries through [`GatewayClient`] and [`with_retry`].
//!
//! [`DecryptAuthorization`]: confidential_swap_primitives::DecryptAuthorization

mod dlog;
mod gateway;

pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod service;
pub mod session;


pub use config::{GatewayConfig, RetryPolicy, MAX_GIANT_STEPS_PER_REQUEST, MAX_TABLE_BITS};
pub use error::{AuthorizationError, CryptoError, GatewayError};
pub use gateway::{BoundContext, EncryptedInput, Gateway, SignedDecryptRequest};
pub use keys::NetworkKeys;
pub use ledger::{LedgerState, LedgerView, MemoryLedger};
pub use service::{unix_now, with_retry, GatewayClient, GatewayService};
pub use session::UserDecryptSession;
