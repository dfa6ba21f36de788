use crate::pallet as pallet_confidential_swap;
use confidential_swap_primitives::{testing::TransparentBackend, LedgerId};
use frame_support::{
    construct_runtime, derive_impl, ord_parameter_types, parameter_types, traits::ConstU128,
    PalletId,
};
use frame_system::EnsureSignedBy;
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub type Balance = u128;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
pub const OPERATOR: AccountId = 100;

/// One whole native unit (18 decimals).
pub const ETH: Balance = 1_000_000_000_000_000_000;
/// One whole token unit (6 decimals).
pub const USDT: u64 = 1_000_000;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
    type AccountData = pallet_balances::AccountData<Balance>;
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Runtime {
    type Balance = Balance;
    type ExistentialDeposit = ConstU128<1>;
    type AccountStore = System;
}

parameter_types! {
    pub const TestLedgerId: LedgerId = [0xC5; 32];
    pub const TokenName: &'static [u8] = b"Confidential USDT";
    pub const TokenSymbol: &'static [u8] = b"cUSDT";
    pub const LedgerDecimals: u8 = 6;
}

impl pallet_confidential_ledger::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Backend = TransparentBackend;
    type LedgerId = TestLedgerId;
    type TokenName = TokenName;
    type TokenSymbol = TokenSymbol;
    type TokenDecimals = LedgerDecimals;
    type BlockedRecipients = crate::PoolAccount<Runtime>;
    type WeightInfo = ();
}

ord_parameter_types! {
    pub const Operator: AccountId = OPERATOR;
}

parameter_types! {
    pub const SwapPalletId: PalletId = PalletId(*b"cswap/pl");
    pub static SwapRate: u64 = 4_000;
    pub static TokenDecimals: u8 = 6;
    pub static NativeDecimals: u8 = 18;
    pub static MaxSupply: u64 = 1 << 40;
    pub const UnitsPerBatch: u64 = 100 * USDT;
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

pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    pallet_balances::GenesisConfig::<Runtime> {
        balances: vec![(ALICE, 10 * ETH), (BOB, 10 * ETH), (CHARLIE, 10 * ETH)],
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}

/// Plaintext held by `who` on the confidential ledger.
pub fn token_balance(who: AccountId) -> u64 {
    let handle = ConfidentialLedger::balance_handle_of(&who);
    TransparentBackend::decrypt(&ConfidentialLedger::ciphertext_of(&handle).expect("stored"))
}
