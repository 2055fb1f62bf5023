#![allow(dead_code)]

use multiversx_sc_scenario::imports::*;

use org_governor::governance::GovernanceModule;
use org_governor::ledger::LedgerModule;
use org_governor::proposals::ProposalModule;
use org_governor::types::{IntentId, OpKind, ProposalState, VoteDirection};
use org_governor::OrgGovernor;

pub const OWNER: TestAddress = TestAddress::new("owner");
pub const ALICE: TestAddress = TestAddress::new("alice");
pub const BOB: TestAddress = TestAddress::new("bob");
pub const CAROL: TestAddress = TestAddress::new("carol");
pub const DAVE: TestAddress = TestAddress::new("dave");
pub const ORG: TestSCAddress = TestSCAddress::new("org-governor");
pub const CODE_PATH: MxscPath = MxscPath::new("output/org-governor.mxsc.json");

pub const OWNER_EGLD: u64 = 1_000_000;

pub struct Governance {
    pub quorum_bps: u32,
    pub quorum_absolute: u64,
    pub min_yes_votes: u64,
    pub proposal_ttl: u64,
    pub timelock_delay: u64,
    pub proposal_threshold: u64,
}

impl Default for Governance {
    fn default() -> Self {
        Governance {
            quorum_bps: 5_000,
            quorum_absolute: 0,
            min_yes_votes: 0,
            proposal_ttl: 0,
            timelock_delay: 0,
            proposal_threshold: 0,
        }
    }
}

/// Deploys at block 0 with (holder, voice, loot) genesis allocations.
pub fn setup(governance: Governance, holders: &[(TestAddress, u64, u64)]) -> ScenarioWorld {
    let mut world = ScenarioWorld::new();
    world.register_contract(CODE_PATH, org_governor::ContractBuilder);

    world.account(OWNER).nonce(1).balance(OWNER_EGLD);
    for user in [ALICE, BOB, CAROL, DAVE] {
        world.account(user).nonce(1);
    }

    world
        .tx()
        .from(OWNER)
        .raw_deploy()
        .code(CODE_PATH)
        .new_address(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            let mut genesis = MultiValueEncoded::new();
            for (holder, voice, loot) in holders.iter() {
                genesis.push(
                    (
                        holder.to_managed_address(),
                        BigUint::from(*voice),
                        BigUint::from(*loot),
                    )
                        .into(),
                );
            }
            sc.init(
                governance.quorum_bps,
                BigUint::from(governance.quorum_absolute),
                BigUint::from(governance.min_yes_votes),
                governance.proposal_ttl,
                governance.timelock_delay,
                BigUint::from(governance.proposal_threshold),
                genesis,
            );
        });

    world
}

pub fn at_block(world: &mut ScenarioWorld, nonce: u64, timestamp: u64) {
    world
        .current_block()
        .block_nonce(nonce)
        .block_timestamp(timestamp);
}

pub fn intent<M: ManagedTypeApi>(bytes: &[u8; 32]) -> IntentId<M> {
    ManagedByteArray::new_from_bytes(bytes)
}

/// Fingerprint of "send `value` EGLD to `target`" under the current generation.
pub fn transfer_intent(
    world: &mut ScenarioWorld,
    target: TestAddress,
    value: u64,
    nonce: u64,
) -> [u8; 32] {
    let mut id = [0u8; 32];
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            id = sc
                .intent_id(
                    OpKind::Call,
                    &target.to_managed_address(),
                    &BigUint::from(value),
                    nonce,
                    &ManagedBuffer::new(),
                    &ManagedVec::new(),
                )
                .to_byte_array();
        });
    id
}

pub fn vote(world: &mut ScenarioWorld, voter: TestAddress, id: &[u8; 32], direction: VoteDirection) {
    world
        .tx()
        .from(voter)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.cast_vote(intent(id), direction);
        });
}

pub fn execute_transfer(
    world: &mut ScenarioWorld,
    caller: TestAddress,
    target: TestAddress,
    value: u64,
    nonce: u64,
) {
    world
        .tx()
        .from(caller)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.execute_by_votes(
                OpKind::Call,
                target.to_managed_address(),
                BigUint::from(value),
                nonce,
                ManagedBuffer::new(),
                MultiValueEncoded::new(),
            );
        });
}

pub fn state(world: &mut ScenarioWorld, id: &[u8; 32]) -> ProposalState {
    let mut state = ProposalState::Unopened;
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            state = sc.proposal_state(&intent(id));
        });
    state
}

pub fn votes(world: &mut ScenarioWorld, account: TestAddress) -> u64 {
    let mut votes = 0u64;
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            votes = sc
                .get_votes(account.to_managed_address())
                .to_u64()
                .unwrap();
        });
    votes
}

pub fn voice_supply(world: &mut ScenarioWorld) -> u64 {
    let mut supply = 0u64;
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            supply = sc.voice_supply().get().to_u64().unwrap();
        });
    supply
}

pub fn donate(world: &mut ScenarioWorld, amount: u64) {
    world
        .tx()
        .from(OWNER)
        .to(ORG)
        .egld(amount)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.donate();
        });
}
