//! End-to-end harness for the confidential swap.
//!
//! A test runtime wires the swap pallet to the confidential ledger running the
//! real ElGamal backend, and a [`Chain`] keeps a [`MemoryLedger`] in sync with
//! its storage after every interaction so an in-process gateway serves the
//! same state a node-side indexer would.
//!
//! ```bash
//! RUST_LOG=info cargo test -p integration-tests -- --nocapture
//! ```

pub mod chain;
pub mod runtime;

pub use chain::{account_of, signer, snapshot, test_gateway_config, Chain};
pub use runtime::*;

pub use confidential_gateway::MemoryLedger;
