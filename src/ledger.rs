multiversx_sc::imports!();

use crate::config::BPS_DENOMINATOR;
use crate::errors::{
    ERR_INSUFFICIENT_BALANCE, ERR_NOT_HISTORICAL, ERR_SPLIT_ARITY, ERR_SPLIT_BPS_SUM,
    ERR_SPLIT_DUPLICATE, ERR_SPLIT_LENGTH, ERR_ZERO_ADDRESS, ERR_ZERO_AMOUNT,
};
use crate::types::{Checkpoint, CheckpointKey, DelegationSlot, VoteAllocation};

/// Maximum number of delegates in a split delegation.
pub const MAX_SPLITS: usize = 4;

/// `amount * bps / 10_000`, rounded down.
pub fn split_share<M: ManagedTypeApi>(amount: &BigUint<M>, bps: u32) -> BigUint<M> {
    (amount * u64::from(bps)) / u64::from(BPS_DENOMINATOR)
}

fn allocated_to<M: ManagedTypeApi>(
    allocation: &ManagedVec<M, VoteAllocation<M>>,
    delegate: &ManagedAddress<M>,
) -> Option<BigUint<M>> {
    allocation
        .iter()
        .find(|entry| entry.delegate == *delegate)
        .map(|entry| entry.amount.clone())
}

// ============================================================
// Ledger
// Voice (voting) and loot (non-voting) balances, per-delegate
// vote checkpoints and the total-supply checkpoint list.
//
// Invariant: every holder's balance is fully credited to its
// delegates, so the sum of all votes equals the voice supply.
// ============================================================

#[multiversx_sc::module]
pub trait LedgerModule: crate::registry::RegistryModule + crate::guard::GuardModule {
    // ========================================================
    // ENDPOINTS: transfers
    // ========================================================

    #[endpoint(transfer)]
    fn transfer(&self, to: ManagedAddress, amount: BigUint) {
        let caller = self.blockchain().get_caller();
        self.move_voice(&caller, &to, &amount);
    }

    #[endpoint(transferLoot)]
    fn transfer_loot(&self, to: ManagedAddress, amount: BigUint) {
        let caller = self.blockchain().get_caller();
        require!(amount > 0u64, ERR_ZERO_AMOUNT);
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        let balance = self.loot_balance(&caller).get();
        require!(balance >= amount, ERR_INSUFFICIENT_BALANCE);

        self.loot_balance(&caller).set(&(balance - &amount));
        self.loot_balance(&to).update(|balance| *balance += &amount);
        self.loot_transfer_event(&caller, &to, &amount);
    }

    // ========================================================
    // ENDPOINTS: organization-only supply changes
    // ========================================================

    #[endpoint(mintVoice)]
    fn mint_voice_endpoint(&self, to: ManagedAddress, amount: BigUint) {
        self.require_organization();
        self.mint_voice(&to, &amount);
    }

    #[endpoint(burnVoice)]
    fn burn_voice_endpoint(&self, from: ManagedAddress, amount: BigUint) {
        self.require_organization();
        self.burn_voice(&from, &amount);
    }

    #[endpoint(mintLoot)]
    fn mint_loot_endpoint(&self, to: ManagedAddress, amount: BigUint) {
        self.require_organization();
        self.mint_loot(&to, &amount);
    }

    #[endpoint(burnLoot)]
    fn burn_loot_endpoint(&self, from: ManagedAddress, amount: BigUint) {
        self.require_organization();
        self.burn_loot(&from, &amount);
    }

    // ========================================================
    // ENDPOINTS: delegation
    // ========================================================

    /// Delegate the caller's whole balance to `to`. Delegating to oneself
    /// restores the default.
    #[endpoint(delegate)]
    fn delegate(&self, to: ManagedAddress) {
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        let caller = self.blockchain().get_caller();
        let mut delegates = ManagedVec::new();
        delegates.push(to);
        let mut bps = ManagedVec::new();
        bps.push(BPS_DENOMINATOR);
        self.redelegate(&caller, &delegates, &bps);
    }

    #[endpoint(setSplitDelegation)]
    fn set_split_delegation(&self, delegates: ManagedVec<ManagedAddress>, bps: ManagedVec<u32>) {
        require!(delegates.len() == bps.len(), ERR_SPLIT_ARITY);
        let count = delegates.len();
        require!(count >= 1 && count <= MAX_SPLITS, ERR_SPLIT_LENGTH);

        let mut bps_total = 0u32;
        for index in 0..count {
            let delegate = delegates.get(index);
            require!(!delegate.is_zero(), ERR_ZERO_ADDRESS);
            for earlier in 0..index {
                require!(*delegates.get(earlier) != *delegate, ERR_SPLIT_DUPLICATE);
            }
            bps_total = bps_total.saturating_add(bps.get(index));
        }
        require!(bps_total == BPS_DENOMINATOR, ERR_SPLIT_BPS_SUM);

        let caller = self.blockchain().get_caller();
        self.redelegate(&caller, &delegates, &bps);
    }

    #[endpoint(clearSplitDelegation)]
    fn clear_split_delegation(&self) {
        let caller = self.blockchain().get_caller();
        self.redelegate(&caller, &ManagedVec::new(), &ManagedVec::new());
    }

    // ========================================================
    // INTERNAL: balance mutations
    // ========================================================

    fn move_voice(&self, from: &ManagedAddress, to: &ManagedAddress, amount: &BigUint) {
        require!(*amount > 0u64, ERR_ZERO_AMOUNT);
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        let from_before = self.voice_balance(from).get();
        require!(from_before >= *amount, ERR_INSUFFICIENT_BALANCE);

        let from_after = &from_before - amount;
        self.set_voice_balance(from, &from_before, &from_after);

        let to_before = self.voice_balance(to).get();
        let to_after = &to_before + amount;
        self.set_voice_balance(to, &to_before, &to_after);

        self.voice_transfer_event(from, to, amount);
    }

    fn mint_voice(&self, to: &ManagedAddress, amount: &BigUint) {
        require!(*amount > 0u64, ERR_ZERO_AMOUNT);
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        let before = self.voice_balance(to).get();
        let after = &before + amount;
        self.set_voice_balance(to, &before, &after);

        let supply = self.voice_supply().update(|supply| {
            *supply += amount;
            supply.clone()
        });
        self.write_checkpoint(&CheckpointKey::TotalSupply, &supply);
        self.voice_transfer_event(&ManagedAddress::zero(), to, amount);
    }

    fn burn_voice(&self, from: &ManagedAddress, amount: &BigUint) {
        require!(*amount > 0u64, ERR_ZERO_AMOUNT);
        let before = self.voice_balance(from).get();
        require!(before >= *amount, ERR_INSUFFICIENT_BALANCE);
        let after = &before - amount;
        self.set_voice_balance(from, &before, &after);

        let supply = self.voice_supply().update(|supply| {
            *supply -= amount;
            supply.clone()
        });
        self.write_checkpoint(&CheckpointKey::TotalSupply, &supply);
        self.voice_transfer_event(from, &ManagedAddress::zero(), amount);
    }

    fn mint_loot(&self, to: &ManagedAddress, amount: &BigUint) {
        require!(*amount > 0u64, ERR_ZERO_AMOUNT);
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        self.loot_balance(to).update(|balance| *balance += amount);
        self.loot_supply().update(|supply| *supply += amount);
        self.loot_transfer_event(&ManagedAddress::zero(), to, amount);
    }

    fn burn_loot(&self, from: &ManagedAddress, amount: &BigUint) {
        require!(*amount > 0u64, ERR_ZERO_AMOUNT);
        let balance = self.loot_balance(from).get();
        require!(balance >= *amount, ERR_INSUFFICIENT_BALANCE);
        self.loot_balance(from).set(&(balance - amount));
        self.loot_supply().update(|supply| *supply -= amount);
        self.loot_transfer_event(from, &ManagedAddress::zero(), amount);
    }

    fn set_voice_balance(&self, holder: &ManagedAddress, before: &BigUint, after: &BigUint) {
        self.voice_balance(holder).set(after);
        self.rebalance_votes(holder, before, after);
        self.sync_registry(holder, after);
    }

    // ========================================================
    // INTERNAL: vote accounting
    // ========================================================

    /// Re-credits a holder's delegates after its balance moved from
    /// `before` to `after`. Split legs get their basis-point share of the
    /// new balance, the last leg takes the rounding remainder, and only the
    /// difference to what each leg already held is moved.
    fn rebalance_votes(&self, holder: &ManagedAddress, before: &BigUint, after: &BigUint) {
        let mut slots = self.delegation_slots(holder);
        if slots.is_empty() {
            self.shift_votes(holder, before, after);
            return;
        }

        let count = slots.len();
        let mut allocated = BigUint::zero();
        for index in 1..=count {
            let mut slot = slots.get(index);
            let target = if index == count {
                after - &allocated
            } else {
                split_share(after, slot.bps)
            };
            allocated += &target;
            if target != slot.applied {
                self.shift_votes(&slot.delegate, &slot.applied, &target);
                slot.applied = target;
                slots.set(index, &slot);
            }
        }
    }

    /// Replaces the holder's delegation. An empty list, or a single entry
    /// naming the holder itself, means self-delegation.
    fn redelegate(
        &self,
        holder: &ManagedAddress,
        delegates: &ManagedVec<ManagedAddress>,
        bps: &ManagedVec<u32>,
    ) {
        let balance = self.voice_balance(holder).get();
        let previous = self.current_allocation(holder);

        let mut slots = self.delegation_slots(holder);
        slots.clear();

        let mut next = ManagedVec::new();
        let self_delegated =
            delegates.is_empty() || (delegates.len() == 1 && *delegates.get(0) == *holder);
        if self_delegated {
            next.push(VoteAllocation {
                delegate: holder.clone(),
                amount: balance,
            });
        } else {
            let count = delegates.len();
            let mut allocated = BigUint::zero();
            for index in 0..count {
                let leg_bps = bps.get(index);
                let amount = if index + 1 == count {
                    &balance - &allocated
                } else {
                    split_share(&balance, leg_bps)
                };
                allocated += &amount;

                let delegate = (*delegates.get(index)).clone();
                slots.push(&DelegationSlot {
                    delegate: delegate.clone(),
                    bps: leg_bps,
                    applied: amount.clone(),
                });
                next.push(VoteAllocation { delegate, amount });
            }
        }

        for entry in previous.iter() {
            let target = allocated_to(&next, &entry.delegate).unwrap_or_else(BigUint::zero);
            self.shift_votes(&entry.delegate, &entry.amount, &target);
        }
        for entry in next.iter() {
            if allocated_to(&previous, &entry.delegate).is_none() {
                self.shift_votes(&entry.delegate, &BigUint::zero(), &entry.amount);
            }
        }

        self.delegation_changed_event(holder);
    }

    /// The slice of the holder's balance each delegate currently carries.
    fn current_allocation(&self, holder: &ManagedAddress) -> ManagedVec<VoteAllocation<Self::Api>> {
        let mut allocation = ManagedVec::new();
        let slots = self.delegation_slots(holder);
        if slots.is_empty() {
            allocation.push(VoteAllocation {
                delegate: holder.clone(),
                amount: self.voice_balance(holder).get(),
            });
            return allocation;
        }
        for slot in slots.iter() {
            allocation.push(VoteAllocation {
                delegate: slot.delegate,
                amount: slot.applied,
            });
        }
        allocation
    }

    fn shift_votes(&self, delegate: &ManagedAddress, from_amount: &BigUint, to_amount: &BigUint) {
        if from_amount == to_amount {
            return;
        }
        let key = CheckpointKey::Votes(delegate.clone());
        let previous = self.latest_checkpoint(&key);
        let current = if to_amount > from_amount {
            &previous + &(to_amount - from_amount)
        } else {
            &previous - &(from_amount - to_amount)
        };
        self.write_checkpoint(&key, &current);
        self.votes_changed_event(delegate, &previous, &current);
    }

    // ========================================================
    // INTERNAL: checkpoints
    // ========================================================

    /// One checkpoint per height: a second write at the same height
    /// overwrites, and a write equal to the latest value is skipped.
    fn write_checkpoint(&self, key: &CheckpointKey<Self::Api>, value: &BigUint) {
        let height = self.blockchain().get_block_nonce();
        let mut list = self.checkpoints(key);
        let len = list.len();
        let entry = Checkpoint {
            height,
            value: value.clone(),
        };

        if len == 0 {
            if *value != 0u64 {
                list.push(&entry);
            }
            return;
        }

        let last = list.get(len);
        if last.value == *value {
            return;
        }
        if last.height == height {
            list.set(len, &entry);
        } else {
            list.push(&entry);
        }
    }

    fn latest_checkpoint(&self, key: &CheckpointKey<Self::Api>) -> BigUint {
        let list = self.checkpoints(key);
        let len = list.len();
        if len == 0 {
            return BigUint::zero();
        }
        list.get(len).value
    }

    /// Value of the latest checkpoint at or below `height`, zero if none.
    fn checkpoint_at(&self, key: &CheckpointKey<Self::Api>, height: u64) -> BigUint {
        let list = self.checkpoints(key);
        let len = list.len();
        if len == 0 {
            return BigUint::zero();
        }
        let last = list.get(len);
        if last.height <= height {
            return last.value;
        }

        let mut low = 1usize;
        let mut high = len - 1;
        let mut found = 0usize;
        while low <= high {
            let mid = low + (high - low) / 2;
            if list.get(mid).height <= height {
                found = mid;
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }

        if found == 0 {
            BigUint::zero()
        } else {
            list.get(found).value
        }
    }

    fn votes_at(&self, account: &ManagedAddress, height: u64) -> BigUint {
        self.checkpoint_at(&CheckpointKey::Votes(account.clone()), height)
    }

    fn total_supply_at(&self, height: u64) -> BigUint {
        self.checkpoint_at(&CheckpointKey::TotalSupply, height)
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getVotes)]
    fn get_votes(&self, account: ManagedAddress) -> BigUint {
        self.latest_checkpoint(&CheckpointKey::Votes(account))
    }

    #[view(getPastVotes)]
    fn get_past_votes(&self, account: ManagedAddress, height: u64) -> BigUint {
        require!(height < self.blockchain().get_block_nonce(), ERR_NOT_HISTORICAL);
        self.votes_at(&account, height)
    }

    #[view(getPastTotalSupply)]
    fn get_past_total_supply(&self, height: u64) -> BigUint {
        require!(height < self.blockchain().get_block_nonce(), ERR_NOT_HISTORICAL);
        self.total_supply_at(height)
    }

    /// (delegate, basis points, credited amount) per leg.
    #[view(getDelegation)]
    fn get_delegation(
        &self,
        holder: ManagedAddress,
    ) -> MultiValueEncoded<MultiValue3<ManagedAddress, u32, BigUint>> {
        let mut result = MultiValueEncoded::new();
        let slots = self.delegation_slots(&holder);
        if slots.is_empty() {
            let balance = self.voice_balance(&holder).get();
            result.push((holder, BPS_DENOMINATOR, balance).into());
            return result;
        }
        for slot in slots.iter() {
            result.push((slot.delegate, slot.bps, slot.applied).into());
        }
        result
    }

    #[view(getCheckpointCount)]
    fn get_checkpoint_count(&self, account: ManagedAddress) -> usize {
        self.checkpoints(&CheckpointKey::Votes(account)).len()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("voiceTransfer")]
    fn voice_transfer_event(
        &self,
        #[indexed] from: &ManagedAddress,
        #[indexed] to: &ManagedAddress,
        amount: &BigUint,
    );

    #[event("lootTransfer")]
    fn loot_transfer_event(
        &self,
        #[indexed] from: &ManagedAddress,
        #[indexed] to: &ManagedAddress,
        amount: &BigUint,
    );

    #[event("delegationChanged")]
    fn delegation_changed_event(&self, #[indexed] holder: &ManagedAddress);

    #[event("votesChanged")]
    fn votes_changed_event(
        &self,
        #[indexed] delegate: &ManagedAddress,
        #[indexed] previous: &BigUint,
        current: &BigUint,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[view(getVoiceBalance)]
    #[storage_mapper("voiceBalance")]
    fn voice_balance(&self, holder: &ManagedAddress) -> SingleValueMapper<BigUint>;

    #[view(getLootBalance)]
    #[storage_mapper("lootBalance")]
    fn loot_balance(&self, holder: &ManagedAddress) -> SingleValueMapper<BigUint>;

    #[view(getVoiceSupply)]
    #[storage_mapper("voiceSupply")]
    fn voice_supply(&self) -> SingleValueMapper<BigUint>;

    #[view(getLootSupply)]
    #[storage_mapper("lootSupply")]
    fn loot_supply(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("checkpoints")]
    fn checkpoints(&self, key: &CheckpointKey<Self::Api>) -> VecMapper<Checkpoint<Self::Api>>;

    #[storage_mapper("delegationSlots")]
    fn delegation_slots(&self, holder: &ManagedAddress) -> VecMapper<DelegationSlot<Self::Api>>;
}
