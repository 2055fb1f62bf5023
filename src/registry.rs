multiversx_sc::imports!();

use crate::errors::{ERR_BADGE_EXISTS, ERR_BADGE_MISSING};
use crate::types::RegistrySlot;

/// Fixed capacity of the holder registry.
pub const REGISTRY_CAPACITY: usize = 256;

// ============================================================
// Top-K holder registry
// A fixed array of slots holding the largest voice balances.
// Slot indices never move; membership is mirrored by a
// non-transferable badge.
// ============================================================

#[multiversx_sc::module]
pub trait RegistryModule {
    /// Called after every voice balance change.
    fn sync_registry(&self, holder: &ManagedAddress, balance: &BigUint) {
        if *holder == self.blockchain().get_sc_address() {
            return;
        }

        let rank = self.registry_rank(holder).get();
        if rank != 0 {
            let index = rank as usize - 1;
            if *balance == 0u64 {
                self.free_slot(index, holder);
            } else {
                self.registry_slot(index).set(&RegistrySlot {
                    holder: holder.clone(),
                    balance: balance.clone(),
                });
            }
            return;
        }

        if *balance == 0u64 {
            return;
        }

        if (self.registry_size().get() as usize) < REGISTRY_CAPACITY {
            if let Some(index) = self.first_free_slot() {
                self.fill_slot(index, holder, balance);
            }
            return;
        }

        let (index, smallest) = self.smallest_slot();
        if *balance > smallest.balance {
            self.free_slot(index, &smallest.holder);
            self.fill_slot(index, holder, balance);
        }
    }

    fn first_free_slot(&self) -> Option<usize> {
        (0..REGISTRY_CAPACITY).find(|index| self.registry_slot(*index).is_empty())
    }

    /// Strictly smallest balance across all slots; ties keep the lowest index.
    fn smallest_slot(&self) -> (usize, RegistrySlot<Self::Api>) {
        let mut min_index = 0usize;
        let mut min_slot = self.registry_slot(0).get();
        for index in 1..REGISTRY_CAPACITY {
            let slot = self.registry_slot(index).get();
            if slot.balance < min_slot.balance {
                min_index = index;
                min_slot = slot;
            }
        }
        (min_index, min_slot)
    }

    fn fill_slot(&self, index: usize, holder: &ManagedAddress, balance: &BigUint) {
        self.registry_slot(index).set(&RegistrySlot {
            holder: holder.clone(),
            balance: balance.clone(),
        });
        self.registry_rank(holder).set(index as u32 + 1);
        self.registry_size().update(|size| *size += 1);
        self.mint_badge(holder);
    }

    fn free_slot(&self, index: usize, holder: &ManagedAddress) {
        self.registry_slot(index).clear();
        self.registry_rank(holder).clear();
        self.registry_size().update(|size| *size -= 1);
        self.burn_badge(holder);
    }

    fn mint_badge(&self, holder: &ManagedAddress) {
        require!(!self.badge(holder).get(), ERR_BADGE_EXISTS);
        self.badge(holder).set(true);
        self.badge_minted_event(holder);
    }

    fn burn_badge(&self, holder: &ManagedAddress) {
        require!(self.badge(holder).get(), ERR_BADGE_MISSING);
        self.badge(holder).clear();
        self.badge_burned_event(holder);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getRegistryMembers)]
    fn get_registry_members(&self) -> MultiValueEncoded<MultiValue2<ManagedAddress, BigUint>> {
        let mut result = MultiValueEncoded::new();
        for index in 0..REGISTRY_CAPACITY {
            if self.registry_slot(index).is_empty() {
                continue;
            }
            let slot = self.registry_slot(index).get();
            result.push((slot.holder, slot.balance).into());
        }
        result
    }

    #[view(hasBadge)]
    fn has_badge(&self, holder: ManagedAddress) -> bool {
        self.badge(&holder).get()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("badgeMinted")]
    fn badge_minted_event(&self, #[indexed] holder: &ManagedAddress);

    #[event("badgeBurned")]
    fn badge_burned_event(&self, #[indexed] holder: &ManagedAddress);

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("registrySlot")]
    fn registry_slot(&self, index: usize) -> SingleValueMapper<RegistrySlot<Self::Api>>;

    /// Slot index + 1; 0 means not registered.
    #[view(getRegistryRank)]
    #[storage_mapper("registryRank")]
    fn registry_rank(&self, holder: &ManagedAddress) -> SingleValueMapper<u32>;

    #[view(getRegistrySize)]
    #[storage_mapper("registrySize")]
    fn registry_size(&self) -> SingleValueMapper<u32>;

    #[storage_mapper("badge")]
    fn badge(&self, holder: &ManagedAddress) -> SingleValueMapper<bool>;
}
