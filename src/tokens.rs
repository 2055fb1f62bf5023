multiversx_sc::imports!();

use crate::errors::{ERR_INSUFFICIENT_BALANCE, ERR_ZERO_ADDRESS, ERR_ZERO_AMOUNT};
use crate::types::IntentId;

/// Multi-id balance ledger. Holds futarchy receipts keyed by
/// (proposal, direction) and the mirrored balances of finite permits.
#[multiversx_sc::module]
pub trait TokenLedgerModule {
    fn mint_tokens(&self, id: &IntentId<Self::Api>, holder: &ManagedAddress, amount: &BigUint) {
        if *amount == 0u64 {
            return;
        }
        self.token_balance(id, holder).update(|balance| *balance += amount);
        self.token_supply(id).update(|supply| *supply += amount);
        self.token_transfer_event(id, &ManagedAddress::zero(), holder, amount);
    }

    fn burn_tokens(&self, id: &IntentId<Self::Api>, holder: &ManagedAddress, amount: &BigUint) {
        if *amount == 0u64 {
            return;
        }
        let balance = self.token_balance(id, holder).get();
        require!(balance >= *amount, ERR_INSUFFICIENT_BALANCE);
        self.token_balance(id, holder).set(&(balance - amount));
        self.token_supply(id).update(|supply| *supply -= amount);
        self.token_transfer_event(id, holder, &ManagedAddress::zero(), amount);
    }

    /// Receipts stay transferable whether or not their side won.
    #[endpoint(transferReceipt)]
    fn transfer_receipt(&self, id: IntentId<Self::Api>, to: ManagedAddress, amount: BigUint) {
        require!(amount > 0u64, ERR_ZERO_AMOUNT);
        require!(!to.is_zero(), ERR_ZERO_ADDRESS);
        let caller = self.blockchain().get_caller();
        let balance = self.token_balance(&id, &caller).get();
        require!(balance >= amount, ERR_INSUFFICIENT_BALANCE);

        self.token_balance(&id, &caller).set(&(balance - &amount));
        self.token_balance(&id, &to).update(|balance| *balance += &amount);
        self.token_transfer_event(&id, &caller, &to, &amount);
    }

    #[event("tokenTransfer")]
    fn token_transfer_event(
        &self,
        #[indexed] id: &IntentId<Self::Api>,
        #[indexed] from: &ManagedAddress,
        #[indexed] to: &ManagedAddress,
        amount: &BigUint,
    );

    #[view(getTokenBalance)]
    #[storage_mapper("tokenBalance")]
    fn token_balance(
        &self,
        id: &IntentId<Self::Api>,
        holder: &ManagedAddress,
    ) -> SingleValueMapper<BigUint>;

    #[view(getTokenSupply)]
    #[storage_mapper("tokenSupply")]
    fn token_supply(&self, id: &IntentId<Self::Api>) -> SingleValueMapper<BigUint>;
}
