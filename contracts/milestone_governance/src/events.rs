//! # Events
//!
//! | Topic                     | Data                  |
//! |---------------------------|-----------------------|
//! | `staked`                  | [`StakeChanged`]      |
//! | `unstaked`                | [`StakeChanged`]      |
//! | `proposed`, proposal id   | [`ProposalCreated`]   |
//! | `voted`, proposal id      | [`VoteCast`]          |
//! | `finalized`, proposal id  | [`ProposalFinalized`] |
//! | `fail_decl`, stage index  | [`FailureDeclared`]   |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

use crate::types::ProposalStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeChanged {
    pub voter: Address,
    pub amount: i128,
    /// Voter's stake after the change.
    pub staked: i128,
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalCreated {
    pub proposal_id: u64,
    pub stage_index: u32,
    pub proposer: Address,
    pub evidence: String,
    pub voting_end: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCast {
    pub proposal_id: u64,
    pub voter: Address,
    pub in_favor: bool,
    pub weight: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalFinalized {
    pub proposal_id: u64,
    pub stage_index: u32,
    pub status: ProposalStatus,
    pub votes_for: i128,
    pub votes_against: i128,
    pub quorum_met: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureDeclared {
    pub stage_index: u32,
    pub rejections: u32,
}

pub fn emit_staked(env: &Env, voter: Address, amount: i128, staked: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("staked"),),
        StakeChanged {
            voter,
            amount,
            staked,
            total_staked,
        },
    );
}

pub fn emit_unstaked(env: &Env, voter: Address, amount: i128, staked: i128, total_staked: i128) {
    env.events().publish(
        (symbol_short!("unstaked"),),
        StakeChanged {
            voter,
            amount,
            staked,
            total_staked,
        },
    );
}

pub fn emit_proposal_created(
    env: &Env,
    proposal_id: u64,
    stage_index: u32,
    proposer: Address,
    evidence: String,
    voting_end: u64,
) {
    env.events().publish(
        (symbol_short!("proposed"), proposal_id),
        ProposalCreated {
            proposal_id,
            stage_index,
            proposer,
            evidence,
            voting_end,
        },
    );
}

pub fn emit_vote_cast(env: &Env, proposal_id: u64, voter: Address, in_favor: bool, weight: i128) {
    env.events().publish(
        (symbol_short!("voted"), proposal_id),
        VoteCast {
            proposal_id,
            voter,
            in_favor,
            weight,
        },
    );
}

pub fn emit_proposal_finalized(env: &Env, event: ProposalFinalized) {
    env.events()
        .publish((symbol_short!("finalized"), event.proposal_id), event);
}

pub fn emit_failure_declared(env: &Env, stage_index: u32, rejections: u32) {
    env.events().publish(
        (symbol_short!("fail_decl"), stage_index),
        FailureDeclared {
            stage_index,
            rejections,
        },
    );
}
