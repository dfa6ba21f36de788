//! Benchmarking for `pallet-confidential-ledger`.
//!
//! `confidential_transfer` is dominated by `Backend::verify_input` and is
//! benchmarked against the concrete backend of a runtime, not here.

use crate::*;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;
use sp_runtime::traits::One;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn grant_decrypt_access() {
        let owner: T::AccountId = whitelisted_caller();
        let grantee: T::AccountId = account("grantee", 0, 0);
        let expiry = frame_system::Pallet::<T>::block_number() + One::one();

        #[extrinsic_call]
        grant_decrypt_access(RawOrigin::Signed(owner.clone()), grantee.clone(), expiry);

        assert_eq!(DecryptGrants::<T>::get(&owner, &grantee), Some(expiry));
    }

    #[benchmark]
    fn revoke_decrypt_access() {
        let owner: T::AccountId = whitelisted_caller();
        let grantee: T::AccountId = account("grantee", 0, 0);
        let expiry = frame_system::Pallet::<T>::block_number() + One::one();
        DecryptGrants::<T>::insert(&owner, &grantee, expiry);

        #[extrinsic_call]
        revoke_decrypt_access(RawOrigin::Signed(owner.clone()), grantee.clone());

        assert!(DecryptGrants::<T>::get(&owner, &grantee).is_none());
    }

    impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Runtime);
}
