use std::sync::Arc;

use anyhow::{anyhow, Result};
use confidential_gateway::{GatewayConfig, LedgerState, MemoryLedger};
use pallet_confidential_ledger::{Ciphertexts, DecryptGrants};
use sp_core::{sr25519, Pair};
use sp_runtime::{BuildStorage, DispatchResult};
use tracing::debug;

use crate::runtime::*;

/// Dev keypair for `//{name}`.
pub fn signer(name: &str) -> Result<sr25519::Pair> {
    sr25519::Pair::from_string(&format!("//{name}"), None)
        .map_err(|e| anyhow!("deriving //{name}: {e:?}"))
}

pub fn account_of(pair: &sr25519::Pair) -> AccountId {
    pair.public().into()
}

/// Search range large enough for a few hundred whole tokens while keeping
/// table construction fast.
pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        request_timeout_ms: 10_000,
        dlog_table_bits: 16,
        max_plaintext_bits: 32,
        ..Default::default()
    }
}

/// Copy of the ledger's confidential state, as an indexer would export it.
/// Must run inside externalities.
pub fn snapshot() -> LedgerState {
    LedgerState {
        balances: pallet_confidential_ledger::Balances::<Runtime>::iter().collect(),
        records: Ciphertexts::<Runtime>::iter()
            .map(|(handle, record)| (handle, (record.owner, record.ciphertext)))
            .collect(),
        grants: DecryptGrants::<Runtime>::iter()
            .map(|(owner, grantee, expiry)| ((owner, grantee), expiry))
            .collect(),
        block_number: System::block_number(),
    }
}

/// Chain state plus the gateway-facing view kept in step with it.
pub struct Chain {
    ext: sp_io::TestExternalities,
    view: Arc<MemoryLedger>,
}

impl Chain {
    /// Genesis with `endowed` native balances at block 1, accepting inputs
    /// attested by `attestor`.
    pub fn new(attestor: [u8; 32], endowed: &[(AccountId, Balance)]) -> Result<Self> {
        AttestorKey::set(attestor);

        let mut storage = frame_system::GenesisConfig::<Runtime>::default()
            .build_storage()
            .map_err(anyhow::Error::msg)?;
        pallet_balances::GenesisConfig::<Runtime> {
            balances: endowed.to_vec(),
            ..Default::default()
        }
        .assimilate_storage(&mut storage)
        .map_err(anyhow::Error::msg)?;

        let mut ext = sp_io::TestExternalities::new(storage);
        ext.execute_with(|| System::set_block_number(1));
        let view = Arc::new(MemoryLedger::new(LEDGER, ext.execute_with(snapshot)));
        Ok(Self { ext, view })
    }

    /// Run `f` against chain state, then refresh the view.
    pub fn execute_with<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let out = self.ext.execute_with(f);
        let state = self.ext.execute_with(snapshot);
        debug!(
            accounts = state.balances.len(),
            block = state.block_number,
            "ledger view refreshed"
        );
        self.view.update(state);
        out
    }

    /// Run a dispatchable, turning its failure into an error.
    pub fn dispatch(&mut self, call: impl FnOnce() -> DispatchResult) -> Result<()> {
        self.execute_with(call)
            .map_err(|e| anyhow!("dispatch failed: {e:?}"))
    }

    pub fn ledger_view(&self) -> Arc<MemoryLedger> {
        self.view.clone()
    }

    pub fn set_block_number(&mut self, n: u64) {
        self.execute_with(|| System::set_block_number(n))
    }
}
