multiversx_sc::imports!();

use crate::errors::{
    ERR_ALREADY_EXECUTED, ERR_ALREADY_VOTED, ERR_BELOW_PROPOSAL_THRESHOLD, ERR_MISSING_ENDPOINT,
    ERR_NOT_EXECUTABLE, ERR_NOT_SUCCEEDED, ERR_NO_VOTING_POWER, ERR_TIMELOCKED, ERR_VOTING_CLOSED,
};
use crate::types::{Ballot, CheckpointKey, IntentId, OpKind, ProposalRecord, ProposalState, VoteDirection};

// ============================================================
// Governance
// Lifecycle: Unopened → Active → Succeeded / Defeated / Expired;
// Succeeded → Queued (non-zero timelock) → Executed, or
// Succeeded → Executed directly without a timelock.
// ============================================================

#[multiversx_sc::module]
pub trait GovernanceModule:
    crate::ledger::LedgerModule
    + crate::registry::RegistryModule
    + crate::proposals::ProposalModule
    + crate::config::ConfigModule
    + crate::futarchy::FutarchyModule
    + crate::tokens::TokenLedgerModule
    + crate::guard::GuardModule
{
    // ========================================================
    // ENDPOINT: openProposal
    // Snapshots height and supply. Reopening changes nothing.
    // ========================================================

    #[endpoint(openProposal)]
    fn open_proposal(&self, id: IntentId<Self::Api>) {
        self.lock();
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);
        self.open_if_needed(&id);
        self.unlock();
    }

    // ========================================================
    // ENDPOINT: castVote
    // One ballot per voter, weighted at the snapshot height.
    // ========================================================

    #[endpoint(castVote)]
    fn cast_vote(&self, id: IntentId<Self::Api>, direction: VoteDirection) -> BigUint {
        self.lock();
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);
        self.open_if_needed(&id);

        let mut proposal = self.proposals(&id).get();
        require!(!self.is_past_deadline(&proposal), ERR_VOTING_CLOSED);

        let caller = self.blockchain().get_caller();
        require!(self.ballots(&id, &caller).is_empty(), ERR_ALREADY_VOTED);

        let weight = self.votes_at(&caller, proposal.snapshot_height);
        require!(weight > 0u64, ERR_NO_VOTING_POWER);

        match direction {
            VoteDirection::For => proposal.for_votes += &weight,
            VoteDirection::Against => proposal.against_votes += &weight,
            VoteDirection::Abstain => proposal.abstain_votes += &weight,
        }
        self.proposals(&id).set(&proposal);
        self.ballots(&id, &caller).set(Ballot {
            direction,
            weight: weight.clone(),
        });
        self.mint_receipts(&id, &caller, direction, &weight);

        self.vote_cast_event(&id, &caller, direction, &weight);
        self.unlock();
        weight
    }

    // ========================================================
    // ENDPOINT: queue
    // Starts the timelock. A no-op when no delay is configured.
    // ========================================================

    #[endpoint(queue)]
    fn queue(&self, id: IntentId<Self::Api>) {
        self.lock();
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);
        self.open_if_needed(&id);
        require!(
            self.proposal_state(&id) == ProposalState::Succeeded,
            ERR_NOT_SUCCEEDED
        );
        if self.timelock_delay().get() > 0 {
            self.mark_queued(&id);
        }
        self.unlock();
    }

    // ========================================================
    // ENDPOINT: executeByVotes
    // With a timelock the first call on a Succeeded proposal only
    // queues it; the effect runs once the delay has elapsed.
    // ========================================================

    #[endpoint(executeByVotes)]
    fn execute_by_votes(
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
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);
        self.open_if_needed(&id);

        let delay = self.timelock_delay().get();
        match self.proposal_state(&id) {
            ProposalState::Succeeded => {
                if delay > 0 {
                    self.mark_queued(&id);
                    self.unlock();
                    return (true, ManagedVec::new()).into();
                }
            },
            ProposalState::Queued => {
                let queued_at = self.proposals(&id).get().queued_at.unwrap_or_default();
                let now = self.blockchain().get_block_timestamp();
                require!(now >= queued_at.saturating_add(delay), ERR_TIMELOCKED);
            },
            _ => sc_panic!(ERR_NOT_EXECUTABLE),
        }

        self.executed(&id).set(true);
        self.resolve_on_execution(&id);
        let results = self.perform_call(kind, &target, &value, &endpoint, &args);

        self.proposal_executed_event(&id, &target, &value);
        self.unlock();
        (true, results).into()
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn open_if_needed(&self, id: &IntentId<Self::Api>) {
        if !self.proposals(id).is_empty() {
            return;
        }

        let threshold = self.proposal_threshold().get();
        if threshold > 0u64 {
            let caller = self.blockchain().get_caller();
            let votes = self.latest_checkpoint(&CheckpointKey::Votes(caller));
            require!(votes >= threshold, ERR_BELOW_PROPOSAL_THRESHOLD);
        }

        // Genesis proposals snapshot height 0 itself.
        let snapshot_height = self.blockchain().get_block_nonce().saturating_sub(1);
        let supply_at_snapshot = self.total_supply_at(snapshot_height);
        let created_at = self.blockchain().get_block_timestamp();

        self.proposals(id).set(ProposalRecord {
            snapshot_height,
            created_at,
            supply_at_snapshot: supply_at_snapshot.clone(),
            for_votes: BigUint::zero(),
            against_votes: BigUint::zero(),
            abstain_votes: BigUint::zero(),
            queued_at: None,
        });
        self.proposal_opened_event(id, snapshot_height, &supply_at_snapshot);
    }

    fn mark_queued(&self, id: &IntentId<Self::Api>) {
        let now = self.blockchain().get_block_timestamp();
        self.proposals(id).update(|proposal| proposal.queued_at = Some(now));
        self.proposal_queued_event(id, now);
    }

    /// Runs an approved effect. An empty endpoint is a plain EGLD transfer.
    fn perform_call(
        &self,
        kind: OpKind,
        target: &ManagedAddress,
        value: &BigUint,
        endpoint: &ManagedBuffer,
        args: &ManagedVec<ManagedBuffer>,
    ) -> ManagedVec<ManagedBuffer> {
        if endpoint.is_empty() {
            require!(kind == OpKind::Call, ERR_MISSING_ENDPOINT);
            if *value > 0u64 {
                self.send().direct_egld(target, value);
            }
            return ManagedVec::new();
        }

        let call = self
            .tx()
            .to(target)
            .egld(value)
            .raw_call(endpoint.clone())
            .arguments_raw(ManagedArgBuffer::from(args.clone()))
            .returns(ReturnsRawResult);
        match kind {
            OpKind::Call => call.sync_call(),
            OpKind::SameContext => call.sync_call_same_context(),
        }
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("proposalOpened")]
    fn proposal_opened_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] snapshot_height: u64,
        supply_at_snapshot: &BigUint,
    );

    #[event("voteCast")]
    fn vote_cast_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] voter: &ManagedAddress,
        #[indexed] direction: VoteDirection,
        weight: &BigUint,
    );

    #[event("proposalQueued")]
    fn proposal_queued_event(&self, #[indexed] id: &IntentId<Self::Api>, #[indexed] queued_at: u64);

    #[event("proposalExecuted")]
    fn proposal_executed_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] target: &ManagedAddress,
        value: &BigUint,
    );
}
