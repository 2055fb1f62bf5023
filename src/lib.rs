#![no_std]

multiversx_sc::imports!();

pub mod config;
pub mod errors;
pub mod futarchy;
pub mod governance;
pub mod guard;
pub mod ledger;
pub mod permits;
pub mod proposals;
pub mod rage_quit;
pub mod registry;
pub mod tokens;
pub mod types;

use errors::ERR_ZERO_AMOUNT;

// ============================================================
// Contract
// A member-governed organization: checkpointed voice ledger,
// proposal engine with timelock and permits, futarchy side
// markets and a top-256 holder registry.
// ============================================================

#[multiversx_sc::contract]
pub trait OrgGovernor:
    config::ConfigModule
    + guard::GuardModule
    + tokens::TokenLedgerModule
    + registry::RegistryModule
    + ledger::LedgerModule
    + proposals::ProposalModule
    + futarchy::FutarchyModule
    + governance::GovernanceModule
    + permits::PermitModule
    + rage_quit::RageQuitModule
{
    // ========================================================
    // Init / Upgrade
    // ========================================================

    /// `holders` lists (holder, voice, loot) genesis allocations.
    #[init]
    fn init(
        &self,
        quorum_bps: u32,
        quorum_absolute: BigUint,
        min_yes_votes: BigUint,
        proposal_ttl: u64,
        timelock_delay: u64,
        proposal_threshold: BigUint,
        holders: MultiValueEncoded<MultiValue3<ManagedAddress, BigUint, BigUint>>,
    ) {
        self.init_config(
            quorum_bps,
            quorum_absolute,
            min_yes_votes,
            proposal_ttl,
            timelock_delay,
            proposal_threshold,
        );

        for entry in holders.into_iter() {
            let (holder, voice, loot) = entry.into_tuple();
            if voice > 0u64 {
                self.mint_voice(&holder, &voice);
            }
            if loot > 0u64 {
                self.mint_loot(&holder, &loot);
            }
        }
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: donate
    // Treasury intake for EGLD or any fungible ESDT.
    // ========================================================

    #[payable("*")]
    #[endpoint(donate)]
    fn donate(&self) {
        let (token, amount) = self.call_value().egld_or_single_fungible_esdt();
        require!(amount > 0u64, ERR_ZERO_AMOUNT);
        let caller = self.blockchain().get_caller();
        self.donation_event(&caller, &token, &amount);
    }

    #[event("donation")]
    fn donation_event(
        &self,
        #[indexed] donor: &ManagedAddress,
        #[indexed] token: &EgldOrEsdtTokenIdentifier,
        amount: &BigUint,
    );
}
