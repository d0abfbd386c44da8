//! # Events
//!
//! Every escrow event is published with a short symbol as its leading topic
//! and a `#[contracttype]` struct as its data, so the indexer can decode the
//! payload by field name.
//!
//! | Topic                    | Data               |
//! |--------------------------|--------------------|
//! | `donated`                | [`FundsDonated`]   |
//! | `goal_met`               | [`GoalReached`]    |
//! | `gov_set`                | [`GovernanceSet`]  |
//! | `released`, stage index  | [`StageReleased`]  |
//! | `refunds`                | [`RefundsEnabled`] |
//! | `refunded`               | [`RefundClaimed`]  |
//! | `cancelled`              | [`ProjectCancelled`] |
//! | `failed`                 | [`ProjectFailed`]  |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsDonated {
    pub donor: Address,
    pub amount: i128,
    pub funds_raised: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalReached {
    pub funds_raised: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernanceSet {
    pub authority: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageReleased {
    pub stage_index: u32,
    pub beneficiary: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundsEnabled {
    pub refund_pool: i128,
    pub total_contributions: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundClaimed {
    pub contributor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCancelled {
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectFailed {
    pub current_stage: u32,
    pub balance: i128,
}

pub fn emit_funds_donated(env: &Env, donor: Address, amount: i128, funds_raised: i128) {
    env.events().publish(
        (symbol_short!("donated"),),
        FundsDonated {
            donor,
            amount,
            funds_raised,
        },
    );
}

pub fn emit_goal_reached(env: &Env, funds_raised: i128) {
    env.events()
        .publish((symbol_short!("goal_met"),), GoalReached { funds_raised });
}

pub fn emit_governance_set(env: &Env, authority: Address) {
    env.events()
        .publish((symbol_short!("gov_set"),), GovernanceSet { authority });
}

pub fn emit_stage_released(env: &Env, stage_index: u32, beneficiary: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("released"), stage_index),
        StageReleased {
            stage_index,
            beneficiary,
            amount,
        },
    );
}

pub fn emit_refunds_enabled(env: &Env, refund_pool: i128, total_contributions: i128) {
    env.events().publish(
        (symbol_short!("refunds"),),
        RefundsEnabled {
            refund_pool,
            total_contributions,
        },
    );
}

pub fn emit_refund_claimed(env: &Env, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"),),
        RefundClaimed {
            contributor,
            amount,
        },
    );
}

pub fn emit_project_cancelled(env: &Env, balance: i128) {
    env.events()
        .publish((symbol_short!("cancelled"),), ProjectCancelled { balance });
}

pub fn emit_project_failed(env: &Env, current_stage: u32, balance: i128) {
    env.events().publish(
        (symbol_short!("failed"),),
        ProjectFailed {
            current_stage,
            balance,
        },
    );
}
