mod common;

use common::*;
use multiversx_sc_scenario::api::DebugApi;
use multiversx_sc_scenario::imports::*;

use org_governor::errors::{
    ERR_INSUFFICIENT_BALANCE, ERR_NOT_HISTORICAL, ERR_NOT_ORGANIZATION, ERR_SPLIT_ARITY,
    ERR_SPLIT_BPS_SUM, ERR_SPLIT_DUPLICATE, ERR_SPLIT_LENGTH, ERR_ZERO_ADDRESS,
};
use org_governor::ledger::LedgerModule;
use org_governor::registry::RegistryModule;

type OrgContract = org_governor::ContractObj<DebugApi>;

#[test]
fn test_contract_builds() {
    let _: fn() -> OrgContract = org_governor::contract_obj;
}

#[test]
fn test_votes_follow_transfers() {
    let mut world = setup(Governance::default(), &[(ALICE, 100, 0), (BOB, 50, 0)]);
    at_block(&mut world, 2, 100);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer(CAROL.to_managed_address(), BigUint::from(30u64));
        });

    assert_eq!(votes(&mut world, ALICE), 70);
    assert_eq!(votes(&mut world, BOB), 50);
    assert_eq!(votes(&mut world, CAROL), 30);
    assert_eq!(voice_supply(&mut world), 150);

    world
        .tx()
        .from(BOB)
        .to(ORG)
        .returns(ExpectError(4, ERR_INSUFFICIENT_BALANCE))
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer(CAROL.to_managed_address(), BigUint::from(51u64));
        });
}

#[test]
fn test_loot_carries_no_votes() {
    let mut world = setup(Governance::default(), &[(ALICE, 10, 40)]);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer_loot(BOB.to_managed_address(), BigUint::from(15u64));
        });

    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            assert_eq!(sc.loot_balance(&ALICE.to_managed_address()).get(), 25u64);
            assert_eq!(sc.loot_balance(&BOB.to_managed_address()).get(), 15u64);
            assert_eq!(sc.loot_supply().get(), 40u64);
            assert!(!sc.has_badge(BOB.to_managed_address()));
        });
    assert_eq!(votes(&mut world, BOB), 0);
    assert_eq!(votes(&mut world, ALICE), 10);
}

#[test]
fn test_split_delegation_rebalances() {
    let mut world = setup(Governance::default(), &[(ALICE, 101, 0), (DAVE, 50, 0)]);
    at_block(&mut world, 1, 10);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(BOB.to_managed_address());
            delegates.push(CAROL.to_managed_address());
            let mut bps = ManagedVec::new();
            bps.push(3_333u32);
            bps.push(6_667u32);
            sc.set_split_delegation(delegates, bps);
        });

    // 101 * 3333 / 10000 rounds down to 33, the last leg takes the rest.
    assert_eq!(votes(&mut world, ALICE), 0);
    assert_eq!(votes(&mut world, BOB), 33);
    assert_eq!(votes(&mut world, CAROL), 68);

    at_block(&mut world, 2, 20);
    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer(DAVE.to_managed_address(), BigUint::from(10u64));
        });

    assert_eq!(votes(&mut world, BOB), 30);
    assert_eq!(votes(&mut world, CAROL), 61);
    assert_eq!(votes(&mut world, DAVE), 60);
    assert_eq!(
        votes(&mut world, BOB) + votes(&mut world, CAROL) + votes(&mut world, DAVE),
        voice_supply(&mut world)
    );

    at_block(&mut world, 3, 30);
    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(BOB.to_managed_address());
            delegates.push(CAROL.to_managed_address());
            let mut bps = ManagedVec::new();
            bps.push(5_000u32);
            bps.push(5_000u32);
            sc.set_split_delegation(delegates, bps);
        });

    assert_eq!(votes(&mut world, BOB), 45);
    assert_eq!(votes(&mut world, CAROL), 46);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.clear_split_delegation();
        });

    assert_eq!(votes(&mut world, ALICE), 91);
    assert_eq!(votes(&mut world, BOB), 0);
    assert_eq!(votes(&mut world, CAROL), 0);
}

#[test]
fn test_split_delegation_validation() {
    let mut world = setup(Governance::default(), &[(ALICE, 100, 0)]);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_SPLIT_LENGTH))
        .whitebox(org_governor::contract_obj, |sc| {
            sc.set_split_delegation(ManagedVec::new(), ManagedVec::new());
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_SPLIT_LENGTH))
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            let mut bps = ManagedVec::new();
            for index in 0..5u8 {
                delegates.push(ManagedAddress::new_from_bytes(&[index + 1; 32]));
                bps.push(2_000u32);
            }
            sc.set_split_delegation(delegates, bps);
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_SPLIT_ARITY))
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(BOB.to_managed_address());
            let mut bps = ManagedVec::new();
            bps.push(5_000u32);
            bps.push(5_000u32);
            sc.set_split_delegation(delegates, bps);
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_SPLIT_DUPLICATE))
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(BOB.to_managed_address());
            delegates.push(BOB.to_managed_address());
            let mut bps = ManagedVec::new();
            bps.push(5_000u32);
            bps.push(5_000u32);
            sc.set_split_delegation(delegates, bps);
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_ZERO_ADDRESS))
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(ManagedAddress::zero());
            let mut bps = ManagedVec::new();
            bps.push(10_000u32);
            sc.set_split_delegation(delegates, bps);
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_SPLIT_BPS_SUM))
        .whitebox(org_governor::contract_obj, |sc| {
            let mut delegates = ManagedVec::new();
            delegates.push(BOB.to_managed_address());
            delegates.push(CAROL.to_managed_address());
            let mut bps = ManagedVec::new();
            bps.push(5_000u32);
            bps.push(4_999u32);
            sc.set_split_delegation(delegates, bps);
        });

    assert_eq!(votes(&mut world, ALICE), 100);
}

#[test]
fn test_past_votes_lookup() {
    let mut world = setup(Governance::default(), &[(ALICE, 100, 0), (BOB, 50, 0)]);

    at_block(&mut world, 5, 50);
    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer(BOB.to_managed_address(), BigUint::from(10u64));
        });

    // Two moves in one block leave a single checkpoint at that height.
    at_block(&mut world, 9, 90);
    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.transfer(BOB.to_managed_address(), BigUint::from(15u64));
            sc.transfer(BOB.to_managed_address(), BigUint::from(5u64));
        });

    at_block(&mut world, 12, 120);
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            let alice = ALICE.to_managed_address();
            assert_eq!(sc.get_past_votes(alice.clone(), 0), 100u64);
            assert_eq!(sc.get_past_votes(alice.clone(), 4), 100u64);
            assert_eq!(sc.get_past_votes(alice.clone(), 5), 90u64);
            assert_eq!(sc.get_past_votes(alice.clone(), 8), 90u64);
            assert_eq!(sc.get_past_votes(alice.clone(), 9), 70u64);
            assert_eq!(sc.get_past_votes(alice.clone(), 11), 70u64);
            assert_eq!(sc.get_past_votes(BOB.to_managed_address(), 7), 60u64);
            assert_eq!(sc.get_past_votes(CAROL.to_managed_address(), 11), 0u64);
            assert_eq!(sc.get_checkpoint_count(alice), 3);
            assert_eq!(sc.get_past_total_supply(3), 150u64);
        });

    world
        .tx()
        .from(OWNER)
        .to(ORG)
        .returns(ExpectError(4, ERR_NOT_HISTORICAL))
        .whitebox(org_governor::contract_obj, |sc| {
            sc.get_past_votes(ALICE.to_managed_address(), 12);
        });

    world
        .tx()
        .from(OWNER)
        .to(ORG)
        .returns(ExpectError(4, ERR_NOT_HISTORICAL))
        .whitebox(org_governor::contract_obj, |sc| {
            sc.get_past_total_supply(13);
        });
}

#[test]
fn test_self_delegation_is_noop() {
    let mut world = setup(Governance::default(), &[(ALICE, 100, 0)]);
    at_block(&mut world, 3, 30);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.delegate(ALICE.to_managed_address());
        });

    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            assert_eq!(sc.get_checkpoint_count(ALICE.to_managed_address()), 1);
        });

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.delegate(BOB.to_managed_address());
        });
    assert_eq!(votes(&mut world, ALICE), 0);
    assert_eq!(votes(&mut world, BOB), 100);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.delegate(ALICE.to_managed_address());
        });
    assert_eq!(votes(&mut world, ALICE), 100);
    assert_eq!(votes(&mut world, BOB), 0);
}

#[test]
fn test_supply_changes_are_organization_only() {
    let mut world = setup(Governance::default(), &[(ALICE, 100, 0), (BOB, 50, 0)]);

    world
        .tx()
        .from(ALICE)
        .to(ORG)
        .returns(ExpectError(4, ERR_NOT_ORGANIZATION))
        .whitebox(org_governor::contract_obj, |sc| {
            sc.mint_voice_endpoint(ALICE.to_managed_address(), BigUint::from(1u64));
        });

    at_block(&mut world, 4, 40);
    world
        .tx()
        .from(ORG)
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            sc.mint_voice_endpoint(CAROL.to_managed_address(), BigUint::from(25u64));
            sc.burn_voice_endpoint(BOB.to_managed_address(), BigUint::from(50u64));
            sc.mint_loot_endpoint(DAVE.to_managed_address(), BigUint::from(7u64));
        });

    assert_eq!(voice_supply(&mut world), 125);
    assert_eq!(votes(&mut world, CAROL), 25);
    assert_eq!(votes(&mut world, BOB), 0);

    at_block(&mut world, 5, 50);
    world
        .query()
        .to(ORG)
        .whitebox(org_governor::contract_obj, |sc| {
            assert_eq!(sc.get_past_total_supply(3), 150u64);
            assert_eq!(sc.get_past_total_supply(4), 125u64);
            assert!(sc.has_badge(CAROL.to_managed_address()));
            assert!(!sc.has_badge(BOB.to_managed_address()));
            assert_eq!(sc.loot_supply().get(), 7u64);
        });
}
