multiversx_sc::imports!();

use crate::errors::{ERR_NOTHING_TO_QUIT, ERR_UNSORTED_ASSETS};

/// Longest token identifier name we compare by bytes.
const MAX_TOKEN_NAME_LEN: usize = 32;

fn token_precedes<M: ManagedTypeApi>(
    left: &EgldOrEsdtTokenIdentifier<M>,
    right: &EgldOrEsdtTokenIdentifier<M>,
) -> bool {
    let left_name = left.clone().into_name();
    let right_name = right.clone().into_name();
    let mut left_bytes = [0u8; MAX_TOKEN_NAME_LEN];
    let mut right_bytes = [0u8; MAX_TOKEN_NAME_LEN];
    left_name.load_to_byte_array(&mut left_bytes) < right_name.load_to_byte_array(&mut right_bytes)
}

// ============================================================
// Ragequit
// A holder burns all voice and loot and leaves with a pro-rata
// share of every listed treasury asset. Funded futarchy pools
// are not treasury.
// ============================================================

#[multiversx_sc::module]
pub trait RageQuitModule:
    crate::ledger::LedgerModule
    + crate::registry::RegistryModule
    + crate::futarchy::FutarchyModule
    + crate::proposals::ProposalModule
    + crate::config::ConfigModule
    + crate::tokens::TokenLedgerModule
    + crate::guard::GuardModule
{
    /// `assets` must be strictly ascending by identifier. Assets whose share
    /// rounds to zero are skipped.
    #[endpoint(rageQuit)]
    fn rage_quit(&self, assets: MultiValueEncoded<EgldOrEsdtTokenIdentifier>) {
        self.lock();
        let assets = assets.to_vec();
        for index in 1..assets.len() {
            let previous = assets.get(index - 1);
            let current = assets.get(index);
            require!(
                token_precedes::<Self::Api>(&previous, &current),
                ERR_UNSORTED_ASSETS
            );
        }

        let caller = self.blockchain().get_caller();
        let voice = self.voice_balance(&caller).get();
        let loot = self.loot_balance(&caller).get();
        let burned = &voice + &loot;
        require!(burned > 0u64, ERR_NOTHING_TO_QUIT);
        // Shares are taken against the supply before this exit.
        let total = &self.voice_supply().get() + &self.loot_supply().get();

        if voice > 0u64 {
            self.burn_voice(&caller, &voice);
        }
        if loot > 0u64 {
            self.burn_loot(&caller, &loot);
        }

        for token in assets.iter() {
            let token = token.clone();
            let held = self.blockchain().get_sc_balance(&token, 0);
            let locked = self.futarchy_locked(&token).get();
            if held <= locked {
                continue;
            }
            let share = &(&(held - &locked) * &burned) / &total;
            if share == 0u64 {
                continue;
            }
            self.send().direct(&caller, &token, 0, &share);
        }

        self.rage_quit_event(&caller, &voice, &loot);
        self.unlock();
    }

    #[event("rageQuit")]
    fn rage_quit_event(
        &self,
        #[indexed] holder: &ManagedAddress,
        #[indexed] voice: &BigUint,
        loot: &BigUint,
    );
}
