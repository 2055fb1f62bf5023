multiversx_sc::imports!();

use crate::errors::ERR_QUORUM_BPS_RANGE;

/// Basis points denominator
pub const BPS_DENOMINATOR: u32 = 10_000;

// ============================================================
// Governance parameters
// Only reachable through the organization acting on itself,
// i.e. a passed proposal or a permit targeting this contract.
// ============================================================

#[multiversx_sc::module]
pub trait ConfigModule: crate::guard::GuardModule {
    fn init_config(
        &self,
        quorum_bps: u32,
        quorum_absolute: BigUint,
        min_yes_votes: BigUint,
        proposal_ttl: u64,
        timelock_delay: u64,
        proposal_threshold: BigUint,
    ) {
        require!(quorum_bps <= BPS_DENOMINATOR, ERR_QUORUM_BPS_RANGE);
        self.quorum_bps().set(quorum_bps);
        self.quorum_absolute().set(&quorum_absolute);
        self.min_yes_votes().set(&min_yes_votes);
        self.proposal_ttl().set(proposal_ttl);
        self.timelock_delay().set(timelock_delay);
        self.proposal_threshold().set(&proposal_threshold);
        self.config_generation().set(0u64);
    }

    #[endpoint(setQuorumBps)]
    fn set_quorum_bps(&self, quorum_bps: u32) {
        self.require_organization();
        require!(quorum_bps <= BPS_DENOMINATOR, ERR_QUORUM_BPS_RANGE);
        self.quorum_bps().set(quorum_bps);
        self.config_changed_event(&ManagedBuffer::from(b"quorumBps"));
    }

    #[endpoint(setQuorumAbsolute)]
    fn set_quorum_absolute(&self, quorum_absolute: BigUint) {
        self.require_organization();
        self.quorum_absolute().set(&quorum_absolute);
        self.config_changed_event(&ManagedBuffer::from(b"quorumAbsolute"));
    }

    #[endpoint(setMinYesVotes)]
    fn set_min_yes_votes(&self, min_yes_votes: BigUint) {
        self.require_organization();
        self.min_yes_votes().set(&min_yes_votes);
        self.config_changed_event(&ManagedBuffer::from(b"minYesVotes"));
    }

    /// Decision window in seconds. 0 = unlimited.
    #[endpoint(setProposalTtl)]
    fn set_proposal_ttl(&self, proposal_ttl: u64) {
        self.require_organization();
        self.proposal_ttl().set(proposal_ttl);
        self.config_changed_event(&ManagedBuffer::from(b"proposalTtl"));
    }

    #[endpoint(setTimelockDelay)]
    fn set_timelock_delay(&self, timelock_delay: u64) {
        self.require_organization();
        self.timelock_delay().set(timelock_delay);
        self.config_changed_event(&ManagedBuffer::from(b"timelockDelay"));
    }

    #[endpoint(setProposalThreshold)]
    fn set_proposal_threshold(&self, proposal_threshold: BigUint) {
        self.require_organization();
        self.proposal_threshold().set(&proposal_threshold);
        self.config_changed_event(&ManagedBuffer::from(b"proposalThreshold"));
    }

    /// Every fingerprint covers the generation, so bumping it revokes all
    /// pending proposals and permits at once.
    #[endpoint(bumpConfig)]
    fn bump_config(&self) -> u64 {
        self.require_organization();
        let generation = self.config_generation().update(|generation| {
            *generation += 1;
            *generation
        });
        self.config_bumped_event(generation);
        generation
    }

    #[view(getGovernanceConfig)]
    fn get_governance_config(&self) -> MultiValue7<u32, BigUint, BigUint, u64, u64, BigUint, u64> {
        (
            self.quorum_bps().get(),
            self.quorum_absolute().get(),
            self.min_yes_votes().get(),
            self.proposal_ttl().get(),
            self.timelock_delay().get(),
            self.proposal_threshold().get(),
            self.config_generation().get(),
        )
            .into()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("configChanged")]
    fn config_changed_event(&self, #[indexed] parameter: &ManagedBuffer);

    #[event("configBumped")]
    fn config_bumped_event(&self, #[indexed] generation: u64);

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("quorumBps")]
    fn quorum_bps(&self) -> SingleValueMapper<u32>;

    #[storage_mapper("quorumAbsolute")]
    fn quorum_absolute(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("minYesVotes")]
    fn min_yes_votes(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("proposalTtl")]
    fn proposal_ttl(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("timelockDelay")]
    fn timelock_delay(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("proposalThreshold")]
    fn proposal_threshold(&self) -> SingleValueMapper<BigUint>;

    #[view(getConfigGeneration)]
    #[storage_mapper("configGeneration")]
    fn config_generation(&self) -> SingleValueMapper<u64>;
}
