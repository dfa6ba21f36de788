//! **pallet-confidential-swap**
//!
//! Sells units of the confidential token for the native asset at a fixed rate.
//!
//! The pool is a pair of plaintext counters: `AvailableUnits` (still for sale)
//! and `MintedUnits` (everything ever seeded). The operator mints supply in
//! batches with `seed_liquidity`; the minted units are credited to the pool
//! account's encrypted balance on the ledger, so the ledger's encrypted supply
//! always equals `MintedUnits`. `swap` takes the native payment into the pool
//! account and moves the quoted units from the pool's encrypted balance to the
//! buyer's.
//!
//! ```text
//! units_out = native_in * rate * 10^token_decimals / 10^native_decimals   (floor)
//! ```
//!
//! Invariants: `AvailableUnits <= MintedUnits <= MaxSupply`.
//!
//! Every encrypted balance is bounded by `MaxSupply`, since balances are
//! non-negative and sum to `MintedUnits`. Wire it below
//! `2^max_plaintext_bits` of the gateway serving the ledger, or balances can
//! grow past what the gateway decrypts and become unspendable.

#![cfg_attr(not(feature = "std"), no_std)]

use frame_support::{
    pallet_prelude::*,
    traits::{
        fungible::{Inspect, Mutate},
        tokens::Preservation,
        Contains,
    },
    PalletId,
};
use frame_system::pallet_prelude::*;
use sp_runtime::{
    helpers_128bit::multiply_by_rational_with_rounding,
    traits::{AccountIdConversion, Zero},
    Rounding, SaturatedConversion,
};

use confidential_swap_primitives::{CiphertextHandle, ConfidentialLedger};

pub use pallet::*;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;
#[cfg(test)]
mod mock;

const LOG_TARGET: &str = "runtime::confidential-swap";

/// Largest power of ten that fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

pub type BalanceOf<T> =
    <<T as Config>::NativeCurrency as Inspect<<T as frame_system::Config>::AccountId>>::Balance;

pub trait WeightInfo {
    fn seed_liquidity() -> Weight;
    fn swap() -> Weight;
}

impl WeightInfo for () {
    fn seed_liquidity() -> Weight {
        Weight::from_parts(60_000, 0)
    }
    fn swap() -> Weight {
        Weight::from_parts(90_000, 0)
    }
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// The native asset buyers pay with.
        type NativeCurrency: Mutate<Self::AccountId>;

        /// Confidential ledger the sold units live on.
        type Ledger: ConfidentialLedger<Self::AccountId>;

        /// Who may seed liquidity. The success value is recorded in events.
        type OperatorOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

        /// Derives the pool account holding payments and the unsold reserve.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Token units per whole native unit, before decimal scaling.
        #[pallet::constant]
        type SwapRate: Get<u64>;

        #[pallet::constant]
        type TokenDecimals: Get<u8>;

        #[pallet::constant]
        type NativeDecimals: Get<u8>;

        /// Token base units minted per seeded batch.
        #[pallet::constant]
        type UnitsPerBatch: Get<u64>;

        /// Cap on `MintedUnits`. Must stay below what the decrypting gateway
        /// can recover.
        #[pallet::constant]
        type MaxSupply: Get<u64>;

        type WeightInfo: WeightInfo;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    // ---- Storage ----

    #[pallet::storage]
    pub type AvailableUnits<T: Config> = StorageValue<_, u64, ValueQuery>;

    #[pallet::storage]
    pub type MintedUnits<T: Config> = StorageValue<_, u64, ValueQuery>;

    // ---- Events / Errors ----

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// New supply minted into the pool. `available` and `minted` are the
        /// counters after the seed.
        LiquiditySeeded {
            operator: T::AccountId,
            batch_count: u32,
            amount: u64,
            available: u64,
            minted: u64,
        },
        Swapped {
            buyer: T::AccountId,
            native_in: BalanceOf<T>,
            units_out: u64,
            /// Buyer's balance handle after the credit.
            handle: CiphertextHandle,
        },
    }

    #[pallet::error]
    pub enum Error<T> {
        ZeroPayment,
        ZeroBatchCount,
        /// Quoted output exceeds the units still for sale.
        InsufficientLiquidity,
        /// Payment is positive but quotes to zero units.
        SwapTooSmall,
        /// Seeding would mint past `MaxSupply`.
        SupplyCapExceeded,
        ArithmeticOverflow,
        /// The ledger refused the encrypted credit or debit.
        Ledger,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        fn integrity_test() {
            assert!(T::SwapRate::get() > 0, "SwapRate must be positive");
            assert!(T::UnitsPerBatch::get() > 0, "UnitsPerBatch must be positive");
            assert!(
                T::MaxSupply::get() >= T::UnitsPerBatch::get(),
                "MaxSupply must fit at least one batch"
            );
            assert!(
                T::TokenDecimals::get() <= MAX_DECIMALS && T::NativeDecimals::get() <= MAX_DECIMALS,
                "decimals above {} overflow u128",
                MAX_DECIMALS
            );
        }
    }

    // ---- Calls ----

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Mint `batch_count * UnitsPerBatch` units into the pool.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::seed_liquidity())]
        pub fn seed_liquidity(origin: OriginFor<T>, batch_count: u32) -> DispatchResult {
            let operator = T::OperatorOrigin::ensure_origin(origin)?;
            Self::do_seed(operator, batch_count)
        }

        /// Pay `native_amount_in` into the pool and receive the quoted units
        /// on the confidential ledger.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::swap())]
        pub fn swap(origin: OriginFor<T>, native_amount_in: BalanceOf<T>) -> DispatchResult {
            let buyer = ensure_signed(origin)?;
            Self::do_swap(&buyer, native_amount_in).map(|_| ())
        }
    }

    // ---- Accessors ----

    impl<T: Config> Pallet<T> {
        #[inline]
        pub fn pool_account() -> T::AccountId {
            T::PalletId::get().into_account_truncating()
        }

        /// Units `native_in` buys. Pure and total: rounds down, and saturates
        /// only when the exact result does not fit in 128 bits.
        pub fn quote(native_in: u128) -> u128 {
            let rate = T::SwapRate::get() as u128;
            let token_decimals = T::TokenDecimals::get() as u32;
            let native_decimals = T::NativeDecimals::get() as u32;

            if token_decimals >= native_decimals {
                let scale = 10u128.saturating_pow(token_decimals - native_decimals);
                native_in.saturating_mul(rate).saturating_mul(scale)
            } else {
                let scale = 10u128.saturating_pow(native_decimals - token_decimals);
                multiply_by_rational_with_rounding(native_in, rate, scale, Rounding::Down)
                    .unwrap_or(u128::MAX)
            }
        }

        pub fn available_liquidity() -> u64 {
            AvailableUnits::<T>::get()
        }

        pub fn minted_liquidity() -> u64 {
            MintedUnits::<T>::get()
        }

        pub fn rate() -> u64 {
            T::SwapRate::get()
        }

        pub fn token_decimals() -> u8 {
            T::TokenDecimals::get()
        }

        pub fn native_decimals() -> u8 {
            T::NativeDecimals::get()
        }

        pub fn mint_unit_per_batch() -> u64 {
            T::UnitsPerBatch::get()
        }

        pub fn max_supply() -> u64 {
            T::MaxSupply::get()
        }
    }

    // ---- Internals ----

    impl<T: Config> Pallet<T> {
        pub(crate) fn do_seed(operator: T::AccountId, batch_count: u32) -> DispatchResult {
            ensure!(batch_count > 0, Error::<T>::ZeroBatchCount);
            let amount = (batch_count as u64)
                .checked_mul(T::UnitsPerBatch::get())
                .ok_or(Error::<T>::ArithmeticOverflow)?;

            frame_support::storage::with_storage_layer(|| {
                let available = AvailableUnits::<T>::get()
                    .checked_add(amount)
                    .ok_or(Error::<T>::ArithmeticOverflow)?;
                let minted = MintedUnits::<T>::get()
                    .checked_add(amount)
                    .ok_or(Error::<T>::ArithmeticOverflow)?;
                ensure!(minted <= T::MaxSupply::get(), Error::<T>::SupplyCapExceeded);
                AvailableUnits::<T>::put(available);
                MintedUnits::<T>::put(minted);

                T::Ledger::credit_encrypted(&Self::pool_account(), amount)
                    .map_err(|_| Error::<T>::Ledger)?;

                log::debug!(
                    target: LOG_TARGET,
                    "seeded {} units ({} batches), available {}, minted {}",
                    amount,
                    batch_count,
                    available,
                    minted
                );
                Self::deposit_event(Event::LiquiditySeeded {
                    operator,
                    batch_count,
                    amount,
                    available,
                    minted,
                });
                Ok(())
            })
        }

        /// Execute a swap for `buyer` and return the units credited.
        pub fn do_swap(buyer: &T::AccountId, native_in: BalanceOf<T>) -> Result<u64, DispatchError> {
            ensure!(!native_in.is_zero(), Error::<T>::ZeroPayment);
            let quoted = Self::quote(native_in.saturated_into::<u128>());
            ensure!(quoted > 0, Error::<T>::SwapTooSmall);

            let available = AvailableUnits::<T>::get();
            // Anything beyond u64 is beyond the pool as well.
            let units_out = u64::try_from(quoted)
                .ok()
                .filter(|units| *units <= available)
                .ok_or(Error::<T>::InsufficientLiquidity)?;

            frame_support::storage::with_storage_layer(|| {
                let pool = Self::pool_account();
                T::NativeCurrency::transfer(buyer, &pool, native_in, Preservation::Expendable)?;

                AvailableUnits::<T>::put(available - units_out);
                T::Ledger::debit_encrypted(&pool, units_out).map_err(|_| Error::<T>::Ledger)?;
                let handle =
                    T::Ledger::credit_encrypted(buyer, units_out).map_err(|_| Error::<T>::Ledger)?;

                log::debug!(
                    target: LOG_TARGET,
                    "swap {:?}: {:?} native -> {} units, {} left",
                    buyer,
                    native_in,
                    units_out,
                    available - units_out
                );
                Self::deposit_event(Event::Swapped {
                    buyer: buyer.clone(),
                    native_in,
                    units_out,
                    handle,
                });
                Ok(units_out)
            })
        }
    }
}

/// Matches the pool account. Wired into the ledger's `BlockedRecipients`, it
/// keeps the reserve's encrypted balance equal to `AvailableUnits`: units sent
/// there by transfer could never be sold or withdrawn.
pub struct PoolAccount<T>(core::marker::PhantomData<T>);

impl<T: Config> Contains<T::AccountId> for PoolAccount<T> {
    fn contains(who: &T::AccountId) -> bool {
        *who == Pallet::<T>::pool_account()
    }
}
