multiversx_sc::imports!();

use crate::errors::{ERR_NOT_ORGANIZATION, ERR_REENTRANT_CALL};

/// Reentrancy lock and organization-only access.
///
/// Every state-mutating public entry point that can hand control to an
/// external account runs between `lock` and `unlock`. A callback that tries
/// to enter any guarded endpoint aborts immediately. Governance setters are
/// not guarded: they are reached through the organization's own sync call
/// while the lock is held.
#[multiversx_sc::module]
pub trait GuardModule {
    fn lock(&self) {
        require!(!self.reentrancy_lock().get(), ERR_REENTRANT_CALL);
        self.reentrancy_lock().set(true);
    }

    fn unlock(&self) {
        self.reentrancy_lock().clear();
    }

    fn require_organization(&self) {
        let caller = self.blockchain().get_caller();
        require!(
            caller == self.blockchain().get_sc_address(),
            ERR_NOT_ORGANIZATION
        );
    }

    #[view(isLocked)]
    #[storage_mapper("reentrancyLock")]
    fn reentrancy_lock(&self) -> SingleValueMapper<bool>;
}
