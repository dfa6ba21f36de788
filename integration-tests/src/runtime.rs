//! Test runtime with `AccountId32` accounts, so gateway sessions can sign as
//! the same accounts that dispatch calls.

use confidential_elgamal::ElGamalBackend;
use confidential_swap_primitives::LedgerId;
use frame_support::{
    construct_runtime, derive_impl, ord_parameter_types, parameter_types, traits::ConstU128,
    PalletId,
};
use frame_system::EnsureSignedBy;
use sp_runtime::{traits::IdentityLookup, AccountId32};

pub type AccountId = AccountId32;
pub type Balance = u128;

pub const LEDGER: LedgerId = [0x1E; 32];

/// One whole native unit (18 decimals).
pub const ETH: Balance = 1_000_000_000_000_000_000;
/// One whole token unit (6 decimals).
pub const USDT: u64 = 1_000_000;

pub const OPERATOR: AccountId = AccountId32::new([0xAB; 32]);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
    type AccountId = AccountId;
    type Lookup = IdentityLookup<AccountId>;
    type AccountData = pallet_balances::AccountData<Balance>;
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Runtime {
    type Balance = Balance;
    type ExistentialDeposit = ConstU128<1>;
    type AccountStore = System;
}

parameter_types! {
    /// Gateway attestation key the ledger accepts inputs from.
    pub static AttestorKey: [u8; 32] = [0u8; 32];
    pub const TestLedgerId: LedgerId = LEDGER;
    pub const TokenName: &'static [u8] = b"Confidential USDT";
    pub const TokenSymbol: &'static [u8] = b"cUSDT";
    pub const TokenDecimals: u8 = 6;
}

impl pallet_confidential_ledger::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Backend = ElGamalBackend<AttestorKey>;
    type LedgerId = TestLedgerId;
    type TokenName = TokenName;
    type TokenSymbol = TokenSymbol;
    type TokenDecimals = TokenDecimals;
    type BlockedRecipients = pallet_confidential_swap::PoolAccount<Runtime>;
    type WeightInfo = ();
}

ord_parameter_types! {
    pub const Operator: AccountId = OPERATOR;
}

parameter_types! {
    pub const SwapPalletId: PalletId = PalletId(*b"cswap/pl");
    pub const SwapRate: u64 = 4_000;
    pub const NativeDecimals: u8 = 18;
    pub const UnitsPerBatch: u64 = 100 * USDT;
    /// Below `2^max_plaintext_bits` of the test gateway.
    pub const MaxSupply: u64 = (1 << 32) - 1;
}

impl pallet_confidential_swap::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type NativeCurrency = Balances;
    type Ledger = ConfidentialLedger;
    type OperatorOrigin = EnsureSignedBy<Operator, AccountId>;
    type PalletId = SwapPalletId;
    type SwapRate = SwapRate;
    type TokenDecimals = TokenDecimals;
    type NativeDecimals = NativeDecimals;
    type UnitsPerBatch = UnitsPerBatch;
    type MaxSupply = MaxSupply;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Balances: pallet_balances,
        ConfidentialLedger: pallet_confidential_ledger,
        ConfidentialSwap: pallet_confidential_swap,
    }
);
