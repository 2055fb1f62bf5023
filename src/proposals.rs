multiversx_sc::imports!();

use crate::config::BPS_DENOMINATOR;
use crate::types::{Ballot, IntentId, OpKind, ProposalRecord, ProposalState};

const INTENT_DOMAIN: &[u8] = b"org-governor:intent";

fn append_framed<M: ManagedTypeApi>(data: &mut ManagedBuffer<M>, part: &ManagedBuffer<M>) {
    data.append_u32_be(part.len() as u32);
    data.append(part);
}

// ============================================================
// Proposals
// Fingerprint derivation, proposal records and state
// evaluation. Nothing here mutates balances.
// ============================================================

#[multiversx_sc::module]
pub trait ProposalModule: crate::config::ConfigModule + crate::guard::GuardModule {
    /// Fingerprint of an effect under the current config generation.
    #[view(getIntentId)]
    fn intent_id(
        &self,
        kind: OpKind,
        target: &ManagedAddress,
        value: &BigUint,
        nonce: u64,
        endpoint: &ManagedBuffer,
        args: &ManagedVec<ManagedBuffer>,
    ) -> IntentId<Self::Api> {
        let mut data = ManagedBuffer::new_from_bytes(INTENT_DOMAIN);
        data.append_bytes(&[kind.code()]);
        data.append(target.as_managed_buffer());
        append_framed(&mut data, &value.to_bytes_be_buffer());
        data.append_bytes(&nonce.to_be_bytes());
        append_framed(&mut data, endpoint);
        data.append_u32_be(args.len() as u32);
        for arg in args.iter() {
            append_framed::<Self::Api>(&mut data, &arg);
        }
        data.append_bytes(&self.config_generation().get().to_be_bytes());

        self.crypto().keccak256(&data)
    }

    #[view(getProposalState)]
    fn proposal_state(&self, id: &IntentId<Self::Api>) -> ProposalState {
        if self.executed(id).get() {
            return ProposalState::Executed;
        }
        if self.proposals(id).is_empty() {
            return ProposalState::Unopened;
        }

        let proposal = self.proposals(id).get();
        if proposal.queued_at.is_some() {
            return ProposalState::Queued;
        }
        if self.is_past_deadline(&proposal) {
            return ProposalState::Expired;
        }
        if !self.quorum_reached(&proposal) {
            return ProposalState::Active;
        }
        if proposal.for_votes > proposal.against_votes {
            ProposalState::Succeeded
        } else {
            ProposalState::Defeated
        }
    }

    /// Decision window (TTL) elapsed. A TTL of 0 never elapses.
    fn is_past_deadline(&self, proposal: &ProposalRecord<Self::Api>) -> bool {
        let ttl = self.proposal_ttl().get();
        if ttl == 0 {
            return false;
        }
        let now = self.blockchain().get_block_timestamp();
        now > proposal.created_at.saturating_add(ttl)
    }

    /// Relative turnout, absolute turnout and absolute yes floor must all hold.
    fn quorum_reached(&self, proposal: &ProposalRecord<Self::Api>) -> bool {
        let turnout = proposal.turnout();

        let quorum_bps = self.quorum_bps().get();
        if quorum_bps > 0 {
            let required = &proposal.supply_at_snapshot * u64::from(quorum_bps);
            if &turnout * u64::from(BPS_DENOMINATOR) < required {
                return false;
            }
        }

        let quorum_absolute = self.quorum_absolute().get();
        if quorum_absolute > 0u64 && turnout < quorum_absolute {
            return false;
        }

        let min_yes_votes = self.min_yes_votes().get();
        if min_yes_votes > 0u64 && proposal.for_votes < min_yes_votes {
            return false;
        }

        true
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getProposal)]
    fn get_proposal(&self, id: IntentId<Self::Api>) -> OptionalValue<ProposalRecord<Self::Api>> {
        if self.proposals(&id).is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(self.proposals(&id).get())
        }
    }

    #[view(getBallot)]
    fn get_ballot(
        &self,
        id: IntentId<Self::Api>,
        voter: ManagedAddress,
    ) -> OptionalValue<Ballot<Self::Api>> {
        if self.ballots(&id, &voter).is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(self.ballots(&id, &voter).get())
        }
    }

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("proposals")]
    fn proposals(&self, id: &IntentId<Self::Api>) -> SingleValueMapper<ProposalRecord<Self::Api>>;

    #[storage_mapper("ballots")]
    fn ballots(
        &self,
        id: &IntentId<Self::Api>,
        voter: &ManagedAddress,
    ) -> SingleValueMapper<Ballot<Self::Api>>;

    /// Set by vote execution and by permit spends alike.
    #[view(isExecuted)]
    #[storage_mapper("executed")]
    fn executed(&self, id: &IntentId<Self::Api>) -> SingleValueMapper<bool>;
}
