multiversx_sc::imports!();

use crate::errors::{
    ERR_ALREADY_EXECUTED, ERR_FUTARCHY_DISABLED, ERR_FUTARCHY_EXISTS, ERR_FUTARCHY_RESOLVED,
    ERR_FUTARCHY_UNRESOLVED, ERR_FUTARCHY_WRONG_ASSET, ERR_NOT_EXPIRED, ERR_ZERO_AMOUNT,
};
use crate::types::{FutarchyMarket, IntentId, ProposalState, VoteDirection};

const RECEIPT_DOMAIN: &[u8] = b"org-governor:receipt";

// ============================================================
// Futarchy
// A funded side market per proposal. Voters receive receipts
// for their side; the side that matches the outcome splits the
// pool pro rata once the proposal executes (for) or expires
// (against).
// ============================================================

#[multiversx_sc::module]
pub trait FutarchyModule:
    crate::proposals::ProposalModule
    + crate::config::ConfigModule
    + crate::tokens::TokenLedgerModule
    + crate::guard::GuardModule
{
    // ========================================================
    // ENDPOINTS
    // ========================================================

    /// Organization-only. One market per proposal, one reward asset per market.
    #[endpoint(openFutarchy)]
    fn open_futarchy(&self, id: IntentId<Self::Api>, reward_token: EgldOrEsdtTokenIdentifier) {
        self.require_organization();
        require!(self.futarchy(&id).is_empty(), ERR_FUTARCHY_EXISTS);
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);

        self.futarchy(&id).set(FutarchyMarket {
            reward_token: reward_token.clone(),
            pool: BigUint::zero(),
            resolved: false,
            winner: VoteDirection::For,
            winning_supply: BigUint::zero(),
            payout_per_unit: BigUint::zero(),
        });
        self.futarchy_opened_event(&id, &reward_token);
    }

    #[payable("*")]
    #[endpoint(fundFutarchy)]
    fn fund_futarchy(&self, id: IntentId<Self::Api>) {
        self.lock();
        require!(!self.futarchy(&id).is_empty(), ERR_FUTARCHY_DISABLED);
        let (token, amount) = self.call_value().egld_or_single_fungible_esdt();
        let mut market = self.futarchy(&id).get();
        require!(!market.resolved, ERR_FUTARCHY_RESOLVED);
        require!(token == market.reward_token, ERR_FUTARCHY_WRONG_ASSET);
        require!(amount > 0u64, ERR_ZERO_AMOUNT);

        market.pool += &amount;
        self.futarchy(&id).set(&market);
        self.futarchy_locked(&token).update(|locked| *locked += &amount);

        let caller = self.blockchain().get_caller();
        self.futarchy_funded_event(&id, &caller, &amount);
        self.unlock();
    }

    /// Settles the market for "against" once the proposal has expired
    /// without executing, so funded pools cannot stay locked forever.
    #[endpoint(resolveFutarchyAgainst)]
    fn resolve_futarchy_against(&self, id: IntentId<Self::Api>) {
        self.lock();
        require!(!self.futarchy(&id).is_empty(), ERR_FUTARCHY_DISABLED);
        require!(!self.futarchy(&id).get().resolved, ERR_FUTARCHY_RESOLVED);
        require!(!self.executed(&id).get(), ERR_ALREADY_EXECUTED);
        require!(
            self.proposal_state(&id) == ProposalState::Expired,
            ERR_NOT_EXPIRED
        );

        self.resolve_market(&id, VoteDirection::Against);
        self.unlock();
    }

    /// Burns winning receipts and pays `amount * payout_per_unit`.
    #[endpoint(cashOutFutarchy)]
    fn cash_out_futarchy(&self, id: IntentId<Self::Api>, amount: BigUint) -> BigUint {
        self.lock();
        require!(!self.futarchy(&id).is_empty(), ERR_FUTARCHY_DISABLED);
        let mut market = self.futarchy(&id).get();
        require!(market.resolved, ERR_FUTARCHY_UNRESOLVED);
        require!(amount > 0u64, ERR_ZERO_AMOUNT);

        let caller = self.blockchain().get_caller();
        let receipt = self.receipt_id(&id, market.winner);
        self.burn_tokens(&receipt, &caller, &amount);

        let payout = &amount * &market.payout_per_unit;
        if payout > 0u64 {
            market.pool -= &payout;
            self.futarchy(&id).set(&market);
            self.futarchy_locked(&market.reward_token)
                .update(|locked| *locked -= &payout);
            self.send().direct(&caller, &market.reward_token, 0, &payout);
        }

        self.futarchy_cashed_out_event(&id, &caller, &amount, &payout);
        self.unlock();
        payout
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn receipt_id(&self, id: &IntentId<Self::Api>, direction: VoteDirection) -> IntentId<Self::Api> {
        let mut data = ManagedBuffer::new_from_bytes(RECEIPT_DOMAIN);
        data.append(id.as_managed_buffer());
        data.append_bytes(&[direction.code()]);
        self.crypto().keccak256(&data)
    }

    fn mint_receipts(
        &self,
        id: &IntentId<Self::Api>,
        voter: &ManagedAddress,
        direction: VoteDirection,
        weight: &BigUint,
    ) {
        if self.futarchy(id).is_empty() || self.futarchy(id).get().resolved {
            return;
        }
        let receipt = self.receipt_id(id, direction);
        self.mint_tokens(&receipt, voter, weight);
    }

    /// Execution by votes or by permit settles an open market for "for".
    fn resolve_on_execution(&self, id: &IntentId<Self::Api>) {
        if self.futarchy(id).is_empty() || self.futarchy(id).get().resolved {
            return;
        }
        self.resolve_market(id, VoteDirection::For);
    }

    /// Freezes payout-per-unit. The rounding remainder, or the whole pool
    /// when nobody backed the winner, goes back to the treasury.
    fn resolve_market(&self, id: &IntentId<Self::Api>, winner: VoteDirection) {
        let mut market = self.futarchy(id).get();
        let receipt = self.receipt_id(id, winner);
        let winning_supply = self.token_supply(&receipt).get();

        let payout_per_unit = if winning_supply == 0u64 {
            BigUint::zero()
        } else {
            &market.pool / &winning_supply
        };
        let claimable = &payout_per_unit * &winning_supply;
        let released = &market.pool - &claimable;
        if released > 0u64 {
            self.futarchy_locked(&market.reward_token)
                .update(|locked| *locked -= &released);
        }

        market.resolved = true;
        market.winner = winner;
        market.winning_supply = winning_supply;
        market.payout_per_unit = payout_per_unit;
        market.pool = claimable;
        self.futarchy(id).set(&market);

        self.futarchy_resolved_event(id, winner, &market.payout_per_unit);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getFutarchy)]
    fn get_futarchy(&self, id: IntentId<Self::Api>) -> OptionalValue<FutarchyMarket<Self::Api>> {
        if self.futarchy(&id).is_empty() {
            OptionalValue::None
        } else {
            OptionalValue::Some(self.futarchy(&id).get())
        }
    }

    #[view(getReceiptId)]
    fn get_receipt_id(&self, id: IntentId<Self::Api>, direction: VoteDirection) -> IntentId<Self::Api> {
        self.receipt_id(&id, direction)
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("futarchyOpened")]
    fn futarchy_opened_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] reward_token: &EgldOrEsdtTokenIdentifier,
    );

    #[event("futarchyFunded")]
    fn futarchy_funded_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] funder: &ManagedAddress,
        amount: &BigUint,
    );

    #[event("futarchyResolved")]
    fn futarchy_resolved_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] winner: VoteDirection,
        payout_per_unit: &BigUint,
    );

    #[event("futarchyCashedOut")]
    fn futarchy_cashed_out_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] holder: &ManagedAddress,
        #[indexed] receipts: &BigUint,
        payout: &BigUint,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("futarchy")]
    fn futarchy(&self, id: &IntentId<Self::Api>) -> SingleValueMapper<FutarchyMarket<Self::Api>>;

    /// Pool funds per asset, excluded from the ragequit treasury.
    #[view(getFutarchyLocked)]
    #[storage_mapper("futarchyLocked")]
    fn futarchy_locked(&self, token: &EgldOrEsdtTokenIdentifier) -> SingleValueMapper<BigUint>;
}
