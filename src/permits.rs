multiversx_sc::imports!();

use crate::errors::ERR_NO_PERMIT;
use crate::types::{IntentId, OpKind, PermitAllowance};

// ============================================================
// Permits
// Governance-issued authorization to perform one exact effect a
// bounded (or unlimited) number of times, with no snapshot, vote
// or timelock. Finite counts are mirrored as a multi-id balance
// held by the organization so outside observers can read them.
// ============================================================

#[multiversx_sc::module]
pub trait PermitModule:
    crate::governance::GovernanceModule
    + crate::ledger::LedgerModule
    + crate::registry::RegistryModule
    + crate::proposals::ProposalModule
    + crate::config::ConfigModule
    + crate::futarchy::FutarchyModule
    + crate::tokens::TokenLedgerModule
    + crate::guard::GuardModule
{
    /// Organization-only. `replace` sets the count exactly; otherwise the
    /// count is added and saturates at unlimited (`u64::MAX`).
    #[endpoint(setPermit)]
    fn set_permit(
        &self,
        kind: OpKind,
        target: ManagedAddress,
        value: BigUint,
        nonce: u64,
        count: u64,
        replace: bool,
        endpoint: ManagedBuffer,
        args: MultiValueEncoded<ManagedBuffer>,
    ) -> u64 {
        self.require_organization();
        let args = args.to_vec();
        let id = self.intent_id(kind, &target, &value, nonce, &endpoint, &args);

        let allowance = if replace {
            PermitAllowance::from_count(count)
        } else {
            self.permit_allowance(&id).saturating_add(count)
        };
        self.store_permit(&id, allowance);

        self.permit_set_event(&id, allowance.to_count());
        allowance.to_count()
    }

    #[endpoint(permitExecute)]
    fn permit_execute(
        &self,
        kind: OpKind,
        target: ManagedAddress,
        value: BigUint,
        nonce: u64,
        endpoint: ManagedBuffer,
        args: MultiValueEncoded<ManagedBuffer>,
    ) -> MultiValue2<bool, ManagedVec<ManagedBuffer>> {
        self.lock();
        let args = args.to_vec();
        let id = self.intent_id(kind, &target, &value, nonce, &endpoint, &args);

        let allowance = self.permit_allowance(&id);
        require!(allowance.is_spendable(), ERR_NO_PERMIT);
        if let PermitAllowance::Finite(uses) = allowance {
            self.store_permit(&id, PermitAllowance::Finite(uses - 1));
        }

        // Blocks the voting path from replaying the same effect.
        self.executed(&id).set(true);
        self.resolve_on_execution(&id);
        let results = self.perform_call(kind, &target, &value, &endpoint, &args);

        let caller = self.blockchain().get_caller();
        self.permit_spent_event(&id, &caller, self.permit_allowance(&id).to_count());
        self.unlock();
        (true, results).into()
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn permit_allowance(&self, id: &IntentId<Self::Api>) -> PermitAllowance {
        if self.permits(id).is_empty() {
            PermitAllowance::Finite(0)
        } else {
            self.permits(id).get()
        }
    }

    fn store_permit(&self, id: &IntentId<Self::Api>, allowance: PermitAllowance) {
        if allowance == PermitAllowance::Finite(0) {
            self.permits(id).clear();
        } else {
            self.permits(id).set(allowance);
        }
        self.sync_permit_mirror(id, allowance);
    }

    /// Mirror equals the finite count; unlimited and zero both mirror as 0.
    fn sync_permit_mirror(&self, id: &IntentId<Self::Api>, allowance: PermitAllowance) {
        let organization = self.blockchain().get_sc_address();
        let mirrored = self.token_balance(id, &organization).get();
        let target = match allowance {
            PermitAllowance::Finite(count) => BigUint::from_bytes_be(&count.to_be_bytes()),
            PermitAllowance::Unlimited => BigUint::zero(),
        };

        if target > mirrored {
            self.mint_tokens(id, &organization, &(&target - &mirrored));
        } else if mirrored > target {
            self.burn_tokens(id, &organization, &(&mirrored - &target));
        }
    }

    // ========================================================
    // VIEWS
    // ========================================================

    /// Remaining uses; `u64::MAX` means unlimited.
    #[view(getPermit)]
    fn get_permit(&self, id: IntentId<Self::Api>) -> u64 {
        self.permit_allowance(&id).to_count()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("permitSet")]
    fn permit_set_event(&self, #[indexed] id: &IntentId<Self::Api>, #[indexed] count: u64);

    #[event("permitSpent")]
    fn permit_spent_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] caller: &ManagedAddress,
        #[indexed] remaining: u64,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("permits")]
    fn permits(&self, id: &IntentId<Self::Api>) -> SingleValueMapper<PermitAllowance>;
}
