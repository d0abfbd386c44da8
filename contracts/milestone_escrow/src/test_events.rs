extern crate std;

use soroban_sdk::{symbol_short, testutils::Address as _, vec, Address, IntoVal, TryIntoVal};

use crate::events::{
    FundsDonated, GoalReached, GovernanceSet, ProjectCancelled, ProjectFailed, RefundClaimed,
    RefundsEnabled, StageReleased,
};
use crate::test_support::{last_event, setup_campaign, setup_funded, setup_unbound};

#[test]
fn test_governance_set_event() {
    let c = setup_unbound();
    c.escrow.set_governance_authority(&c.governance);

    let (topics, data) = last_event(&c.env, &c.escrow.address, symbol_short!("gov_set"))
        .expect("gov_set not emitted");
    assert_eq!(topics, vec![&c.env, symbol_short!("gov_set").into_val(&c.env)]);
    let data: GovernanceSet = data.try_into_val(&c.env).unwrap();
    assert_eq!(
        data,
        GovernanceSet {
            authority: c.governance.clone()
        }
    );
}

#[test]
fn test_donated_event() {
    let c = setup_campaign();
    let donor = Address::generate(&c.env);
    c.fund(&donor, 3);

    let (_, data) = last_event(&c.env, &c.escrow.address, symbol_short!("donated"))
        .expect("donated not emitted");
    let data: FundsDonated = data.try_into_val(&c.env).unwrap();
    assert_eq!(
        data,
        FundsDonated {
            donor: donor.clone(),
            amount: 3,
            funds_raised: 3,
        }
    );
    assert!(last_event(&c.env, &c.escrow.address, symbol_short!("goal_met")).is_none());
}

#[test]
fn test_goal_met_event_on_exact_goal() {
    let (c, _, _) = setup_funded();

    let (_, data) = last_event(&c.env, &c.escrow.address, symbol_short!("goal_met"))
        .expect("goal_met not emitted");
    let data: GoalReached = data.try_into_val(&c.env).unwrap();
    assert_eq!(data, GoalReached { funds_raised: 10 });
}

#[test]
fn test_released_event_carries_stage_topic() {
    let (c, _, _) = setup_funded();
    c.escrow.release_funds(&0);

    let (topics, data) = last_event(&c.env, &c.escrow.address, symbol_short!("released"))
        .expect("released not emitted");
    assert_eq!(
        topics,
        vec![
            &c.env,
            symbol_short!("released").into_val(&c.env),
            0u32.into_val(&c.env),
        ]
    );
    let data: StageReleased = data.try_into_val(&c.env).unwrap();
    assert_eq!(
        data,
        StageReleased {
            stage_index: 0,
            beneficiary: c.beneficiary.clone(),
            amount: 2,
        }
    );
}

#[test]
fn test_failure_and_refund_events() {
    let (c, donor_a, _) = setup_funded();
    c.escrow.release_funds(&0);
    c.escrow.mark_failed();

    let (_, failed) = last_event(&c.env, &c.escrow.address, symbol_short!("failed"))
        .expect("failed not emitted");
    let failed: ProjectFailed = failed.try_into_val(&c.env).unwrap();
    assert_eq!(
        failed,
        ProjectFailed {
            current_stage: 1,
            balance: 8,
        }
    );

    let (_, enabled) = last_event(&c.env, &c.escrow.address, symbol_short!("refunds"))
        .expect("refunds not emitted");
    let enabled: RefundsEnabled = enabled.try_into_val(&c.env).unwrap();
    assert_eq!(
        enabled,
        RefundsEnabled {
            refund_pool: 8,
            total_contributions: 10,
        }
    );

    c.escrow.refund(&donor_a);
    let (_, claimed) = last_event(&c.env, &c.escrow.address, symbol_short!("refunded"))
        .expect("refunded not emitted");
    let claimed: RefundClaimed = claimed.try_into_val(&c.env).unwrap();
    assert_eq!(
        claimed,
        RefundClaimed {
            contributor: donor_a.clone(),
            amount: 4,
        }
    );
}

#[test]
fn test_cancelled_event() {
    let (c, _, _) = setup_funded();
    c.escrow.cancel_project();

    let (_, data) = last_event(&c.env, &c.escrow.address, symbol_short!("cancelled"))
        .expect("cancelled not emitted");
    let data: ProjectCancelled = data.try_into_val(&c.env).unwrap();
    assert_eq!(data, ProjectCancelled { balance: 10 });
}
