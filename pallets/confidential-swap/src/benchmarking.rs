//! Benchmarking for `pallet-confidential-swap`.

use crate::*;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;
use sp_runtime::traits::Saturating;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn seed_liquidity() -> Result<(), BenchmarkError> {
        let origin =
            T::OperatorOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        let batches = (T::MaxSupply::get() / T::UnitsPerBatch::get()).min(10) as u32;

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, batches);

        assert_eq!(MintedUnits::<T>::get(), batches as u64 * T::UnitsPerBatch::get());
        Ok(())
    }

    #[benchmark]
    fn swap() -> Result<(), BenchmarkError> {
        let buyer: T::AccountId = whitelisted_caller();
        let native_in: BalanceOf<T> =
            10u128.saturating_pow(T::NativeDecimals::get() as u32).saturated_into();
        let units = u64::try_from(Pallet::<T>::quote(native_in.saturated_into::<u128>()))
            .map_err(|_| BenchmarkError::Weightless)?;
        let batches = u32::try_from(units / T::UnitsPerBatch::get() + 1)
            .map_err(|_| BenchmarkError::Weightless)?;
        Pallet::<T>::do_seed(Pallet::<T>::pool_account(), batches)?;
        T::NativeCurrency::set_balance(&buyer, native_in.saturating_mul(2u32.into()));

        #[extrinsic_call]
        _(RawOrigin::Signed(buyer), native_in);

        assert!(AvailableUnits::<T>::get() < MintedUnits::<T>::get());
        Ok(())
    }

    impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Runtime);
}
