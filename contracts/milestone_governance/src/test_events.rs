use soroban_sdk::{symbol_short, vec, IntoVal, TryIntoVal};

use crate::events::{FailureDeclared, ProposalCreated, ProposalFinalized, StakeChanged, VoteCast};
use crate::test_support::{last_event, setup_dao, setup_voting_dao};
use crate::ProposalStatus;

#[test]
fn test_stake_events() {
    let dao = setup_dao();
    let voter = dao.staker(4);

    let (_, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("staked"))
        .expect("staked not emitted");
    let data: StakeChanged = data.try_into_val(&dao.env).unwrap();
    assert_eq!(
        data,
        StakeChanged {
            voter: voter.clone(),
            amount: 4,
            staked: 4,
            total_staked: 4,
        }
    );

    dao.gov.unstake(&voter, &1);
    let (_, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("unstaked"))
        .expect("unstaked not emitted");
    let data: StakeChanged = data.try_into_val(&dao.env).unwrap();
    assert_eq!(
        data,
        StakeChanged {
            voter,
            amount: 1,
            staked: 3,
            total_staked: 3,
        }
    );
}

#[test]
fn test_proposed_and_voted_events() {
    let (dao, light, _) = setup_voting_dao();
    let id = dao.propose(0);

    let (topics, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("proposed"))
        .expect("proposed not emitted");
    assert_eq!(
        topics,
        vec![
            &dao.env,
            symbol_short!("proposed").into_val(&dao.env),
            id.into_val(&dao.env),
        ]
    );
    let data: ProposalCreated = data.try_into_val(&dao.env).unwrap();
    assert_eq!(data.proposal_id, id);
    assert_eq!(data.stage_index, 0);
    assert_eq!(data.proposer, dao.beneficiary);
    assert_eq!(data.evidence, dao.evidence());
    assert_eq!(data.voting_end, dao.gov.get_proposal(&id).voting_end);

    dao.gov.vote(&light, &id, &false);
    let (_, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("voted"))
        .expect("voted not emitted");
    let data: VoteCast = data.try_into_val(&dao.env).unwrap();
    assert_eq!(
        data,
        VoteCast {
            proposal_id: id,
            voter: light,
            in_favor: false,
            weight: 2,
        }
    );
}

#[test]
fn test_finalized_event_reports_outcome() {
    let (dao, light, heavy) = setup_voting_dao();
    let id = dao.decide(0, &[&light, &heavy], true);

    let (topics, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("finalized"))
        .expect("finalized not emitted");
    let subject: u64 = topics.get(1).unwrap().try_into_val(&dao.env).unwrap();
    assert_eq!(subject, id);
    let data: ProposalFinalized = data.try_into_val(&dao.env).unwrap();
    assert_eq!(
        data,
        ProposalFinalized {
            proposal_id: id,
            stage_index: 0,
            status: ProposalStatus::Executed,
            votes_for: 5,
            votes_against: 0,
            quorum_met: true,
        }
    );
    assert!(last_event(&dao.env, &dao.escrow.address, symbol_short!("released")).is_some());
}

#[test]
fn test_failure_declared_event() {
    let (dao, light, heavy) = setup_voting_dao();
    dao.decide(0, &[&light, &heavy], false);
    assert!(last_event(&dao.env, &dao.gov.address, symbol_short!("fail_decl")).is_none());

    dao.decide(0, &[&light, &heavy], false);
    let (_, data) = last_event(&dao.env, &dao.gov.address, symbol_short!("fail_decl"))
        .expect("fail_decl not emitted");
    let data: FailureDeclared = data.try_into_val(&dao.env).unwrap();
    assert_eq!(
        data,
        FailureDeclared {
            stage_index: 0,
            rejections: 2,
        }
    );
    assert!(last_event(&dao.env, &dao.escrow.address, symbol_short!("failed")).is_some());
}
