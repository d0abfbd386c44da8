//! # Milestone Escrow Contract
//!
//! Holds the contributions of a single funding campaign and pays them out to
//! the beneficiary one stage at a time, on instruction from a governance
//! contract. If the goal is missed, or governance declares the project failed,
//! contributors reclaim a pro-rata share of whatever is still held.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Bootstrap    | [`MilestoneEscrow::init`], `set_governance_authority` |
//! | Funding      | [`MilestoneEscrow::donate`]                      |
//! | Release      | [`MilestoneEscrow::release_funds`] (governance)  |
//! | Failure      | `cancel_project`, `mark_failed` (governance)     |
//! | Refunds      | `enable_refunds`, [`MilestoneEscrow::refund`]    |
//! | Queries      | `get_status`, `get_stage`, `get_contribution`, … |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], event emission to [`events`]
//! and all arithmetic to `milestone_accounting`. Every mutating entry point
//! validates its preconditions, commits its state, and only then moves
//! tokens; each holds a re-entrancy latch for its whole duration.

#![no_std]

use milestone_accounting::{checked_accumulate, pro_rata_share, validate_allocations, AllocationError};
use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, Vec};

pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_funding;

pub use types::{ContributionInfo, EscrowConfig, EscrowState, FundingStatus, StageInfo};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidGoal = 3,
    InvalidDeadline = 4,
    InvalidStageCount = 5,
    InvalidAllocation = 6,
    AllocationMismatch = 7,
    InvalidAmount = 8,
    InvalidAuthority = 9,
    GovernanceAlreadySet = 10,
    GovernanceNotSet = 11,
    RefundsEnabled = 12,
    ProjectFailed = 13,
    DeadlinePassed = 14,
    GoalExceeded = 15,
    GoalNotReached = 16,
    StageOutOfRange = 17,
    StageAlreadyReleased = 18,
    StageOutOfOrder = 19,
    InsufficientBalance = 20,
    AlreadyFailed = 21,
    AllStagesReleased = 22,
    RefundsNotAvailable = 23,
    NothingToRefund = 24,
    Overflow = 25,
    Reentrancy = 26,
}

impl From<AllocationError> for Error {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::InvalidStageCount => Error::InvalidStageCount,
            AllocationError::NonPositiveAllocation => Error::InvalidAllocation,
            AllocationError::Overflow => Error::Overflow,
            AllocationError::SumMismatch => Error::AllocationMismatch,
        }
    }
}

#[contract]
pub struct MilestoneEscrow;

#[contractimpl]
impl MilestoneEscrow {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Open the campaign.
    ///
    /// Must be called exactly once. `beneficiary` must sign. The allocation
    /// table must hold 3, 5 or 7 positive amounts summing to `funding_goal`.
    pub fn init(
        env: Env,
        beneficiary: Address,
        token: Address,
        funding_goal: i128,
        deadline: u64,
        stage_allocations: Vec<i128>,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        beneficiary.require_auth();

        if funding_goal <= 0 {
            return Err(Error::InvalidGoal);
        }
        if deadline <= env.ledger().timestamp() {
            return Err(Error::InvalidDeadline);
        }
        validate_allocations(stage_allocations.iter(), funding_goal)?;

        let mut stage_released = Vec::new(&env);
        for _ in 0..stage_allocations.len() {
            stage_released.push_back(false);
        }

        let config = EscrowConfig {
            beneficiary,
            token,
            funding_goal,
            deadline,
            stage_allocations,
        };
        let state = EscrowState {
            funds_raised: 0,
            released_total: 0,
            balance: 0,
            current_stage: 0,
            stage_released,
            failed: false,
            cancelled: false,
            refunds_enabled: false,
            refund_pool_snapshot: 0,
            total_contribution_snapshot: 0,
        };
        storage::save_campaign(&env, &config, &state);
        Ok(())
    }

    /// Name the governance contract allowed to release and cancel.
    ///
    /// Beneficiary only, and only once.
    pub fn set_governance_authority(env: Env, authority: Address) -> Result<(), Error> {
        let config = storage::load_config(&env)?;
        config.beneficiary.require_auth();

        if storage::get_governance(&env).is_some() {
            return Err(Error::GovernanceAlreadySet);
        }
        if authority == config.beneficiary || authority == env.current_contract_address() {
            return Err(Error::InvalidAuthority);
        }

        storage::set_governance(&env, &authority);
        events::emit_governance_set(&env, authority);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` toward the goal.
    ///
    /// Rejected once refunds are enabled or the project failed, after the
    /// deadline, for non-positive amounts, and when it would overshoot the goal.
    pub fn donate(env: Env, donor: Address, amount: i128) -> Result<(), Error> {
        donor.require_auth();
        storage::enter_guard(&env)?;

        let (config, mut state) = storage::load_campaign(&env)?;

        if state.refunds_enabled {
            return Err(Error::RefundsEnabled);
        }
        if state.failed {
            return Err(Error::ProjectFailed);
        }
        if env.ledger().timestamp() >= config.deadline {
            return Err(Error::DeadlinePassed);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let raised = checked_accumulate(state.funds_raised, amount).ok_or(Error::Overflow)?;
        if raised > config.funding_goal {
            return Err(Error::GoalExceeded);
        }
        let contributed = checked_accumulate(storage::get_contribution(&env, &donor), amount)
            .ok_or(Error::Overflow)?;
        let balance = checked_accumulate(state.balance, amount).ok_or(Error::Overflow)?;

        state.funds_raised = raised;
        state.balance = balance;
        storage::set_contribution(&env, &donor, contributed);
        storage::save_state(&env, &state);

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&donor, &env.current_contract_address(), &amount);

        events::emit_funds_donated(&env, donor, amount, raised);
        if raised == config.funding_goal {
            events::emit_goal_reached(&env, raised);
        }

        storage::exit_guard(&env);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Governance-only entry points
    // ─────────────────────────────────────────────────────────

    /// Pay the allocation of `stage_index` to the beneficiary.
    ///
    /// Governance only. Stages are released strictly in order, each at most
    /// once, and only after the goal was met. Returns the amount paid.
    pub fn release_funds(env: Env, stage_index: u32) -> Result<i128, Error> {
        Self::require_governance(&env)?;
        storage::enter_guard(&env)?;

        let (config, mut state) = storage::load_campaign(&env)?;

        if state.refunds_enabled {
            return Err(Error::RefundsEnabled);
        }
        if state.failed {
            return Err(Error::ProjectFailed);
        }
        if state.funds_raised < config.funding_goal {
            return Err(Error::GoalNotReached);
        }
        let amount = config
            .stage_allocations
            .get(stage_index)
            .ok_or(Error::StageOutOfRange)?;
        if state.stage_released.get(stage_index).unwrap_or(false) {
            return Err(Error::StageAlreadyReleased);
        }
        if stage_index != state.current_stage {
            return Err(Error::StageOutOfOrder);
        }
        if state.balance < amount {
            return Err(Error::InsufficientBalance);
        }

        state.stage_released.set(stage_index, true);
        state.current_stage = stage_index.checked_add(1).ok_or(Error::Overflow)?;
        state.released_total = checked_accumulate(state.released_total, amount).ok_or(Error::Overflow)?;
        state.balance -= amount;
        storage::save_state(&env, &state);

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&env.current_contract_address(), &config.beneficiary, &amount);

        events::emit_stage_released(&env, stage_index, config.beneficiary, amount);

        storage::exit_guard(&env);
        Ok(amount)
    }

    /// Abandon the campaign and open refunds. Governance only.
    pub fn cancel_project(env: Env) -> Result<(), Error> {
        Self::require_governance(&env)?;
        storage::enter_guard(&env)?;

        let mut state = Self::fail_state(&env)?;
        state.cancelled = true;
        events::emit_project_cancelled(&env, state.balance);
        Self::open_refunds(&env, &mut state);
        storage::save_state(&env, &state);

        storage::exit_guard(&env);
        Ok(())
    }

    /// Record that the community rejected the project and open refunds.
    /// Governance only.
    pub fn mark_failed(env: Env) -> Result<(), Error> {
        Self::require_governance(&env)?;
        storage::enter_guard(&env)?;

        let mut state = Self::fail_state(&env)?;
        events::emit_project_failed(&env, state.current_stage, state.balance);
        Self::open_refunds(&env, &mut state);
        storage::save_state(&env, &state);

        storage::exit_guard(&env);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Refunds
    // ─────────────────────────────────────────────────────────

    /// Enable refunds once the deadline passed with the goal unmet.
    ///
    /// Anyone may call this; `refund` performs the same step lazily.
    pub fn enable_refunds(env: Env) -> Result<(), Error> {
        storage::enter_guard(&env)?;

        let (config, mut state) = storage::load_campaign(&env)?;
        if state.refunds_enabled {
            return Err(Error::RefundsEnabled);
        }
        if !Self::refund_condition(&env, &config, &state) {
            return Err(Error::RefundsNotAvailable);
        }
        Self::open_refunds(&env, &mut state);
        storage::save_state(&env, &state);

        storage::exit_guard(&env);
        Ok(())
    }

    /// Pay `contributor` their outstanding pro-rata share of the refund pool.
    ///
    /// Entitlement is `contribution * pool / total_contributions`, truncated,
    /// minus what was already refunded. Returns the amount paid.
    pub fn refund(env: Env, contributor: Address) -> Result<i128, Error> {
        contributor.require_auth();
        storage::enter_guard(&env)?;

        let (config, mut state) = storage::load_campaign(&env)?;
        if !state.refunds_enabled {
            if !Self::refund_condition(&env, &config, &state) {
                return Err(Error::RefundsNotAvailable);
            }
            Self::open_refunds(&env, &mut state);
        }

        let owed = Self::outstanding_refund(&env, &state, &contributor)?;
        if owed <= 0 {
            return Err(Error::NothingToRefund);
        }
        if state.balance < owed {
            return Err(Error::InsufficientBalance);
        }

        let refunded = checked_accumulate(storage::get_refunded(&env, &contributor), owed)
            .ok_or(Error::Overflow)?;
        storage::set_refunded(&env, &contributor, refunded);
        state.balance -= owed;
        storage::save_state(&env, &state);

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&env.current_contract_address(), &contributor, &owed);

        events::emit_refund_claimed(&env, contributor, owed);

        storage::exit_guard(&env);
        Ok(owed)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_status(env: Env) -> Result<FundingStatus, Error> {
        let (config, state) = storage::load_campaign(&env)?;
        Ok(FundingStatus {
            funds_raised: state.funds_raised,
            funding_goal: config.funding_goal,
            current_stage: state.current_stage,
            total_stages: config.stage_allocations.len(),
            goal_reached: state.funds_raised >= config.funding_goal,
            cancelled: state.cancelled,
            failed: state.failed,
            refunds_enabled: state.refunds_enabled,
            time_remaining: config.deadline.saturating_sub(env.ledger().timestamp()),
        })
    }

    pub fn get_config(env: Env) -> Result<EscrowConfig, Error> {
        storage::load_config(&env)
    }

    pub fn get_stage(env: Env, index: u32) -> Result<StageInfo, Error> {
        let (config, state) = storage::load_campaign(&env)?;
        let allocation = config
            .stage_allocations
            .get(index)
            .ok_or(Error::StageOutOfRange)?;
        Ok(StageInfo {
            index,
            allocation,
            released: state.stage_released.get(index).unwrap_or(false),
        })
    }

    /// Contribution, refunded amount and what `refund` would pay now.
    pub fn get_contribution(env: Env, contributor: Address) -> Result<ContributionInfo, Error> {
        let state = storage::load_state(&env)?;
        let claimable = if state.refunds_enabled {
            Self::outstanding_refund(&env, &state, &contributor)?.max(0)
        } else {
            0
        };
        Ok(ContributionInfo {
            contributed: storage::get_contribution(&env, &contributor),
            refunded: storage::get_refunded(&env, &contributor),
            claimable,
        })
    }

    pub fn beneficiary(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.beneficiary)
    }

    pub fn governance(env: Env) -> Option<Address> {
        storage::get_governance(&env)
    }

    pub fn current_stage(env: Env) -> Result<u32, Error> {
        Ok(storage::load_state(&env)?.current_stage)
    }

    pub fn goal_reached(env: Env) -> Result<bool, Error> {
        let (config, state) = storage::load_campaign(&env)?;
        Ok(state.funds_raised >= config.funding_goal)
    }

    /// `true` once the campaign failed or refunds opened.
    pub fn is_closed(env: Env) -> Result<bool, Error> {
        let state = storage::load_state(&env)?;
        Ok(state.failed || state.refunds_enabled)
    }

    pub fn escrow_balance(env: Env) -> Result<i128, Error> {
        Ok(storage::load_state(&env)?.balance)
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    fn require_governance(env: &Env) -> Result<(), Error> {
        let authority = storage::get_governance(env).ok_or(Error::GovernanceNotSet)?;
        authority.require_auth();
        Ok(())
    }

    /// Shared preconditions of `cancel_project` and `mark_failed`; returns the
    /// state with `failed` set.
    fn fail_state(env: &Env) -> Result<EscrowState, Error> {
        let (config, mut state) = storage::load_campaign(env)?;
        if state.failed {
            return Err(Error::AlreadyFailed);
        }
        if state.current_stage >= config.stage_allocations.len() {
            return Err(Error::AllStagesReleased);
        }
        state.failed = true;
        Ok(state)
    }

    fn refund_condition(env: &Env, config: &EscrowConfig, state: &EscrowState) -> bool {
        let expired_unmet = env.ledger().timestamp() >= config.deadline
            && state.funds_raised < config.funding_goal;
        state.failed || expired_unmet
    }

    /// Turn refunds on and capture the pool. Idempotent on the snapshot: the
    /// pool is only ever captured while `refunds_enabled` is still false.
    fn open_refunds(env: &Env, state: &mut EscrowState) {
        if state.refunds_enabled {
            return;
        }
        state.refunds_enabled = true;
        state.refund_pool_snapshot = state.balance;
        state.total_contribution_snapshot = state.funds_raised;
        events::emit_refunds_enabled(env, state.balance, state.funds_raised);
    }

    fn outstanding_refund(env: &Env, state: &EscrowState, contributor: &Address) -> Result<i128, Error> {
        let contributed = storage::get_contribution(env, contributor);
        if contributed == 0 || state.total_contribution_snapshot <= 0 {
            return Ok(0);
        }
        let entitlement = pro_rata_share(
            contributed,
            state.refund_pool_snapshot,
            state.total_contribution_snapshot,
        )
        .ok_or(Error::Overflow)?;
        Ok(entitlement - storage::get_refunded(env, contributor))
    }
}
