use crate::pallet as pallet_confidential_ledger;
use confidential_swap_primitives::{
    testing::TransparentBackend, EncryptedAmount, InputBinding, InputProof, LedgerId,
};
use frame_support::{construct_runtime, derive_impl, parameter_types, traits::Contains};
use sp_runtime::BuildStorage;

pub type AccountId = u64;
pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
/// Reserve account only supply-owning pallets may pay.
pub const RESERVE: AccountId = 99;

pub const LEDGER: LedgerId = [0xC5; 32];

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = frame_system::mocking::MockBlock<Runtime>;
}

parameter_types! {
    pub const TestLedgerId: LedgerId = LEDGER;
    pub const TokenName: &'static [u8] = b"Confidential USDT";
    pub const TokenSymbol: &'static [u8] = b"cUSDT";
    pub const TokenDecimals: u8 = 6;
}

pub struct Reserve;

impl Contains<AccountId> for Reserve {
    fn contains(who: &AccountId) -> bool {
        *who == RESERVE
    }
}

impl pallet_confidential_ledger::Config for Runtime {
    type RuntimeEvent = RuntimeEvent;
    type Backend = TransparentBackend;
    type LedgerId = TestLedgerId;
    type TokenName = TokenName;
    type TokenSymbol = TokenSymbol;
    type TokenDecimals = TokenDecimals;
    type BlockedRecipients = Reserve;
    type WeightInfo = ();
}

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        ConfidentialLedger: pallet_confidential_ledger,
    }
);

pub fn new_test_ext() -> sp_io::TestExternalities {
    let t = frame_system::GenesisConfig::<Runtime>::default()
        .build_storage()
        .unwrap();
    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}

pub fn proof(bytes: &[u8]) -> InputProof {
    bytes.to_vec().try_into().expect("bounded vec")
}

/// Ciphertext for `amount` plus the proof the ledger expects from `who` right now.
pub fn attested_input(who: AccountId, amount: u64) -> (EncryptedAmount, InputProof) {
    let ct = TransparentBackend::encrypt(amount);
    let binding = InputBinding::new(LEDGER, &who, ConfidentialLedger::balance_handle_of(&who));
    (ct, proof(&TransparentBackend::prove(&binding, &ct)))
}

/// Plaintext currently held by `who`.
pub fn balance(who: AccountId) -> u64 {
    let handle = ConfidentialLedger::balance_handle_of(&who);
    TransparentBackend::decrypt(&ConfidentialLedger::ciphertext_of(&handle).expect("stored"))
}
