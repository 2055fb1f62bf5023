multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// Proposal and permit fingerprint.
pub type IntentId<M> = ManagedByteArray<M, 32>;

// ============================================================
// Execution: how an approved effect reaches its target
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum OpKind {
    /// Sync call executed in the target's own context.
    Call,
    /// Sync call running the target's code against the organization's storage.
    SameContext,
}

impl OpKind {
    pub fn code(self) -> u8 {
        match self {
            OpKind::Call => 0,
            OpKind::SameContext => 1,
        }
    }
}

// ============================================================
// Proposal state: evaluated lifecycle
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum ProposalState {
    /// Never referenced, or referenced but not opened.
    Unopened,
    /// Open for voting, quorum not yet met.
    Active,
    /// Succeeded and waiting out the timelock.
    Queued,
    /// Quorum met and for > against.
    Succeeded,
    /// Quorum met and for <= against.
    Defeated,
    /// Decision window elapsed without queueing or execution.
    Expired,
    /// Effect performed, by votes or by permit. Terminal.
    Executed,
}

// ============================================================
// Proposal: the governance record behind a fingerprint
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct ProposalRecord<M: ManagedTypeApi> {
    /// Height whose checkpoints weigh every vote (current height - 1 at open).
    pub snapshot_height: u64,
    pub created_at: u64,
    pub supply_at_snapshot: BigUint<M>,
    pub for_votes: BigUint<M>,
    pub against_votes: BigUint<M>,
    pub abstain_votes: BigUint<M>,
    /// Block timestamp when queued behind the timelock
    pub queued_at: Option<u64>,
}

impl<M: ManagedTypeApi> ProposalRecord<M> {
    pub fn turnout(&self) -> BigUint<M> {
        &(&self.for_votes + &self.against_votes) + &self.abstain_votes
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum VoteDirection {
    Against,
    For,
    Abstain,
}

impl VoteDirection {
    pub fn code(self) -> u8 {
        match self {
            VoteDirection::Against => 0,
            VoteDirection::For => 1,
            VoteDirection::Abstain => 2,
        }
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Ballot<M: ManagedTypeApi> {
    pub direction: VoteDirection,
    pub weight: BigUint<M>,
}

// ============================================================
// Permits
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum PermitAllowance {
    Finite(u64),
    Unlimited,
}

/// Interface value standing for `PermitAllowance::Unlimited`.
pub const UNLIMITED_PERMIT: u64 = u64::MAX;

impl PermitAllowance {
    pub fn from_count(count: u64) -> Self {
        if count == UNLIMITED_PERMIT {
            PermitAllowance::Unlimited
        } else {
            PermitAllowance::Finite(count)
        }
    }

    pub fn to_count(self) -> u64 {
        match self {
            PermitAllowance::Finite(count) => count,
            PermitAllowance::Unlimited => UNLIMITED_PERMIT,
        }
    }

    /// Additive top-up. Reaching or passing the sentinel yields `Unlimited`.
    pub fn saturating_add(self, count: u64) -> Self {
        match self {
            PermitAllowance::Unlimited => PermitAllowance::Unlimited,
            PermitAllowance::Finite(current) => match current.checked_add(count) {
                Some(total) => PermitAllowance::from_count(total),
                None => PermitAllowance::Unlimited,
            },
        }
    }

    pub fn is_spendable(self) -> bool {
        !matches!(self, PermitAllowance::Finite(0))
    }
}

// ============================================================
// Ledger
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct Checkpoint<M: ManagedTypeApi> {
    pub height: u64,
    pub value: BigUint<M>,
}

/// Which checkpoint list a write or lookup targets.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub enum CheckpointKey<M: ManagedTypeApi> {
    Votes(ManagedAddress<M>),
    TotalSupply,
}

/// One leg of a split delegation. `applied` is the slice of the holder's
/// balance currently credited to `delegate`.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct DelegationSlot<M: ManagedTypeApi> {
    pub delegate: ManagedAddress<M>,
    pub bps: u32,
    pub applied: BigUint<M>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone, PartialEq, Debug)]
pub struct VoteAllocation<M: ManagedTypeApi> {
    pub delegate: ManagedAddress<M>,
    pub amount: BigUint<M>,
}

// ============================================================
// Registry
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub struct RegistrySlot<M: ManagedTypeApi> {
    pub holder: ManagedAddress<M>,
    pub balance: BigUint<M>,
}

// ============================================================
// Futarchy
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct FutarchyMarket<M: ManagedTypeApi> {
    pub reward_token: EgldOrEsdtTokenIdentifier<M>,
    pub pool: BigUint<M>,
    pub resolved: bool,
    pub winner: VoteDirection,
    /// Winning-side receipt supply frozen at resolution.
    pub winning_supply: BigUint<M>,
    pub payout_per_unit: BigUint<M>,
}
