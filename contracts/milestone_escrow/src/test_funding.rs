extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, vec, Address, Env,
};

use crate::invariants::{assert_all_status_invariants, assert_conservation};
use crate::storage;
use crate::test_support::{
    create_token, five_stages, setup_campaign, setup_unbound, DEADLINE, GOAL, START,
};
use crate::{Error, MilestoneEscrow, MilestoneEscrowClient};

fn fresh() -> (Env, MilestoneEscrowClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);
    let contract_id = env.register(MilestoneEscrow, ());
    let client = MilestoneEscrowClient::new(&env, &contract_id);
    let token_admin = Address::generate(&env);
    let token = create_token(&env, &token_admin);
    let beneficiary = Address::generate(&env);
    (env, client, beneficiary, token.address.clone())
}

#[test]
fn test_init_rejects_allocation_sum_mismatch() {
    let (env, client, beneficiary, token) = fresh();
    let stages = vec![&env, 2i128, 2, 2, 2, 3];
    assert_eq!(
        client.try_init(&beneficiary, &token, &GOAL, &DEADLINE, &stages),
        Err(Ok(Error::AllocationMismatch))
    );
}

#[test]
fn test_init_rejects_unsupported_stage_count() {
    let (env, client, beneficiary, token) = fresh();
    let stages = vec![&env, 5i128, 5];
    assert_eq!(
        client.try_init(&beneficiary, &token, &GOAL, &DEADLINE, &stages),
        Err(Ok(Error::InvalidStageCount))
    );
    let stages = vec![&env, 1i128, 2, 3, 4];
    assert_eq!(
        client.try_init(&beneficiary, &token, &GOAL, &DEADLINE, &stages),
        Err(Ok(Error::InvalidStageCount))
    );
}

#[test]
fn test_init_rejects_non_positive_stage() {
    let (env, client, beneficiary, token) = fresh();
    let stages = vec![&env, 5i128, 0, 5];
    assert_eq!(
        client.try_init(&beneficiary, &token, &GOAL, &DEADLINE, &stages),
        Err(Ok(Error::InvalidAllocation))
    );
}

#[test]
fn test_init_rejects_bad_goal_and_deadline() {
    let (env, client, beneficiary, token) = fresh();
    assert_eq!(
        client.try_init(&beneficiary, &token, &0, &DEADLINE, &five_stages(&env)),
        Err(Ok(Error::InvalidGoal))
    );
    assert_eq!(
        client.try_init(&beneficiary, &token, &GOAL, &START, &five_stages(&env)),
        Err(Ok(Error::InvalidDeadline))
    );
}

#[test]
fn test_init_only_once() {
    let c = setup_unbound();
    assert_eq!(
        c.escrow.try_init(
            &c.beneficiary,
            &c.token.address,
            &GOAL,
            &DEADLINE,
            &five_stages(&c.env)
        ),
        Err(Ok(Error::AlreadyInitialized))
    );
}

#[test]
fn test_queries_before_init_fail() {
    let (_env, client, _, _) = fresh();
    assert_eq!(client.try_get_status(), Err(Ok(Error::NotInitialized)));
    assert_eq!(client.governance(), None);
}

#[test]
fn test_governance_authority_set_once() {
    let c = setup_unbound();
    c.escrow.set_governance_authority(&c.governance);
    assert_eq!(c.escrow.governance(), Some(c.governance.clone()));

    let other = Address::generate(&c.env);
    assert_eq!(
        c.escrow.try_set_governance_authority(&other),
        Err(Ok(Error::GovernanceAlreadySet))
    );
    assert_eq!(c.escrow.governance(), Some(c.governance.clone()));
}

#[test]
fn test_governance_authority_rejects_beneficiary_and_self() {
    let c = setup_unbound();
    assert_eq!(
        c.escrow.try_set_governance_authority(&c.beneficiary),
        Err(Ok(Error::InvalidAuthority))
    );
    assert_eq!(
        c.escrow.try_set_governance_authority(&c.escrow.address),
        Err(Ok(Error::InvalidAuthority))
    );
    assert_eq!(c.escrow.governance(), None);
}

#[test]
fn test_donations_accumulate() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    c.fund(&donor, 3);
    c.fund(&donor, 2);

    let info = c.escrow.get_contribution(&donor);
    assert_eq!(info.contributed, 5);
    assert_eq!(info.refunded, 0);
    assert_eq!(info.claimable, 0);

    let status = c.escrow.get_status();
    assert_eq!(status.funds_raised, 5);
    assert!(!status.goal_reached);
    assert_eq!(c.escrow.escrow_balance(), 5);
    assert_eq!(c.token.balance(&c.escrow.address), 5);
}

#[test]
fn test_donation_overshoot_rejected_without_side_effects() {
    let c = setup_campaign();
    let donor_a = Address::generate(&c.env);
    let donor_b = Address::generate(&c.env);
    c.fund(&donor_a, 8);

    let sac = token::StellarAssetClient::new(&c.env, &c.token.address);
    sac.mint(&donor_b, &3);
    assert_eq!(
        c.escrow.try_donate(&donor_b, &3),
        Err(Ok(Error::GoalExceeded))
    );

    assert_eq!(c.escrow.get_status().funds_raised, 8);
    assert_eq!(c.escrow.get_contribution(&donor_b).contributed, 0);
    assert_eq!(c.token.balance(&donor_b), 3);

    // The exact remainder still fits.
    c.escrow.donate(&donor_b, &2);
    assert!(c.escrow.goal_reached());
}

#[test]
fn test_no_donations_after_goal_reached() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    c.fund(&donor, GOAL);
    assert!(c.escrow.get_status().goal_reached);

    let late = Address::generate(&c.env);
    let sac = token::StellarAssetClient::new(&c.env, &c.token.address);
    sac.mint(&late, &1);
    assert_eq!(c.escrow.try_donate(&late, &1), Err(Ok(Error::GoalExceeded)));
}

#[test]
fn test_zero_and_negative_donations_rejected() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    assert_eq!(c.escrow.try_donate(&donor, &0), Err(Ok(Error::InvalidAmount)));
    assert_eq!(c.escrow.try_donate(&donor, &-5), Err(Ok(Error::InvalidAmount)));
}

#[test]
fn test_donation_after_deadline_rejected() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    c.advance_to(DEADLINE);
    assert_eq!(c.escrow.get_status().time_remaining, 0);
    assert_eq!(c.escrow.try_donate(&donor, &1), Err(Ok(Error::DeadlinePassed)));
}

#[test]
fn test_time_remaining_counts_down() {
    let c = setup_campaign();
    assert_eq!(c.escrow.get_status().time_remaining, DEADLINE - START);
    c.advance_to(START + 100);
    assert_eq!(c.escrow.get_status().time_remaining, DEADLINE - START - 100);
    c.advance_to(DEADLINE + 5);
    assert_eq!(c.escrow.get_status().time_remaining, 0);
}

#[test]
fn test_conservation_over_mixed_sequence() {
    let c = setup_campaign();
    let donors = [
        Address::generate(&c.env),
        Address::generate(&c.env),
        Address::generate(&c.env),
    ];
    let attempts: [(usize, i128); 6] = [(0, 3), (1, 4), (2, 0), (0, 5), (2, 2), (1, 1)];
    let mut accepted = std::vec::Vec::new();

    let sac = token::StellarAssetClient::new(&c.env, &c.token.address);
    for (who, amount) in attempts {
        if amount > 0 {
            sac.mint(&donors[who], &amount);
        }
        if c.escrow.try_donate(&donors[who], &amount).is_ok() {
            accepted.push(amount);
        }
        let status = c.escrow.get_status();
        assert_conservation(&status, &accepted);
        assert_all_status_invariants(&status, &c.stages());
    }

    // 3 + 4 + 2 + 1 accepted; the zero and the overshooting 5 were not.
    assert_eq!(accepted, std::vec![3, 4, 2, 1]);
    assert!(c.escrow.goal_reached());
}

#[test]
fn test_latched_entry_points_reject_reentry() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    c.env.as_contract(&c.escrow.address, || {
        storage::enter_guard(&c.env).unwrap();
    });
    assert_eq!(c.escrow.try_donate(&donor, &1), Err(Ok(Error::Reentrancy)));
    assert_eq!(c.escrow.try_release_funds(&0), Err(Ok(Error::Reentrancy)));
    assert_eq!(c.escrow.try_refund(&donor), Err(Ok(Error::Reentrancy)));

    c.env.as_contract(&c.escrow.address, || storage::exit_guard(&c.env));
    c.fund(&donor, 1);
    assert_eq!(c.escrow.get_status().funds_raised, 1);
}
