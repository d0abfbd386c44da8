//! # Milestone Governance Contract
//!
//! Stake-weighted voting that decides, stage by stage, whether the escrow may
//! pay the beneficiary. Voters lock a stake token to gain weight; the
//! beneficiary opens a proposal per stage; once the voting window closes
//! anyone may finalise it, which either releases the stage through the
//! escrow or counts a rejection. Too many consecutive rejections of the same
//! stage fail the project and open refunds.
//!
//! | Phase     | Entry Point(s)                                         |
//! |-----------|--------------------------------------------------------|
//! | Bootstrap | [`MilestoneGovernance::init`]                          |
//! | Voters    | [`MilestoneGovernance::stake`], `unstake`              |
//! | Proposals | `create_milestone_proposal`, `vote`, `check_vote_result` |
//! | Exit      | [`MilestoneGovernance::cancel_project`]                |
//! | Queries   | `get_proposal`, `get_voter`, `vote_weight`, …          |
//!
//! The escrow is reached through [`escrow_client::EscrowClient`]. Calls that
//! may legitimately be refused by the escrow use its `try_` variants.

#![no_std]

use milestone_accounting::{checked_accumulate, meets_quorum, weighted_stake, REPUTATION_BASELINE};
use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, String, Vec};

pub mod escrow_client;
pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_support;

use escrow_client::EscrowClient;
use events::ProposalFinalized;
pub use types::{
    GovernanceConfig, GovernanceSettings, Proposal, ProposalStatus, VoterInfo,
    DEFAULT_QUORUM_BPS, DEFAULT_REJECTION_LIMIT, DEFAULT_VOTING_PERIOD,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    InvalidConfig = 3,
    InvalidAmount = 4,
    NotEligibleVoter = 5,
    InsufficientStake = 6,
    ActiveVotesPending = 7,
    EmptyEvidence = 8,
    ProjectClosed = 9,
    GoalNotReached = 10,
    StageOutOfOrder = 11,
    ProposalPending = 12,
    ProposalNotFound = 13,
    AlreadyVoted = 14,
    VotingClosed = 15,
    VotingStillOpen = 16,
    AlreadyFinalized = 17,
    EscrowCallFailed = 18,
    Overflow = 19,
    Reentrancy = 20,
}

/// Largest page `proposal_voters` returns.
pub const MAX_VOTER_PAGE: u32 = 50;

#[contract]
pub struct MilestoneGovernance;

#[contractimpl]
impl MilestoneGovernance {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Bind this instance to `escrow`.
    ///
    /// The escrow's beneficiary must sign. The escrow still has to name this
    /// contract through its own `set_governance_authority`.
    pub fn init(
        env: Env,
        escrow: Address,
        stake_token: Address,
        config: GovernanceConfig,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if config.voting_period == 0
            || config.quorum_bps == 0
            || config.quorum_bps as i128 > milestone_accounting::BASIS_POINTS
            || config.rejection_limit == 0
        {
            return Err(Error::InvalidConfig);
        }

        let beneficiary = EscrowClient::new(&env, &escrow).beneficiary();
        beneficiary.require_auth();

        storage::save_settings(
            &env,
            &GovernanceSettings {
                escrow,
                stake_token,
                config,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Voters
    // ─────────────────────────────────────────────────────────

    /// Lock `amount` of the stake token. The first stake registers the voter.
    pub fn stake(env: Env, voter: Address, amount: i128) -> Result<(), Error> {
        voter.require_auth();
        storage::enter_guard(&env)?;

        let settings = storage::load_settings(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut info = storage::get_voter(&env, &voter).unwrap_or(VoterInfo {
            staked: 0,
            reputation: REPUTATION_BASELINE,
            active_votes: 0,
            pending: Vec::new(&env),
        });
        let staked = checked_accumulate(info.staked, amount).ok_or(Error::Overflow)?;
        let total_staked = Self::apply_stake_change(&env, &info, staked)?;
        info.staked = staked;
        storage::save_voter(&env, &voter, &info);

        let token_client = token::Client::new(&env, &settings.stake_token);
        token_client.transfer(&voter, &env.current_contract_address(), &amount);

        events::emit_staked(&env, voter, amount, staked, total_staked);

        storage::exit_guard(&env);
        Ok(())
    }

    /// Withdraw `amount` of stake. Refused while the voter has votes on
    /// proposals that are not finalised yet.
    pub fn unstake(env: Env, voter: Address, amount: i128) -> Result<(), Error> {
        voter.require_auth();
        storage::enter_guard(&env)?;

        let settings = storage::load_settings(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let mut info = storage::get_voter(&env, &voter).ok_or(Error::NotEligibleVoter)?;
        Self::settle_votes(&env, &mut info);
        if info.active_votes > 0 {
            return Err(Error::ActiveVotesPending);
        }
        if amount > info.staked {
            return Err(Error::InsufficientStake);
        }

        let staked = info.staked - amount;
        let total_staked = Self::apply_stake_change(&env, &info, staked)?;
        info.staked = staked;
        storage::save_voter(&env, &voter, &info);

        let token_client = token::Client::new(&env, &settings.stake_token);
        token_client.transfer(&env.current_contract_address(), &voter, &amount);

        events::emit_unstaked(&env, voter, amount, staked, total_staked);

        storage::exit_guard(&env);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Proposals
    // ─────────────────────────────────────────────────────────

    /// Ask the voters to release `stage_index`.
    ///
    /// Beneficiary only. The stage must be the escrow's next one, the goal
    /// must be met, and the previous proposal for the stage (if any) must be
    /// finalised. Returns the new proposal id.
    ///
    /// Only one proposal is open at a time: it must target the escrow's
    /// current stage, and that stage only advances once its proposal is
    /// finalised.
    pub fn create_milestone_proposal(
        env: Env,
        stage_index: u32,
        evidence: String,
    ) -> Result<u64, Error> {
        storage::enter_guard(&env)?;

        let settings = storage::load_settings(&env)?;
        let escrow = EscrowClient::new(&env, &settings.escrow);
        let proposer = escrow.beneficiary();
        proposer.require_auth();

        if evidence.len() == 0 {
            return Err(Error::EmptyEvidence);
        }
        if escrow.is_closed() {
            return Err(Error::ProjectClosed);
        }
        if !escrow.goal_reached() {
            return Err(Error::GoalNotReached);
        }
        if stage_index != escrow.current_stage() {
            return Err(Error::StageOutOfOrder);
        }
        if let Some(previous) = storage::get_stage_proposal(&env, stage_index) {
            if !storage::load_proposal(&env, previous)?.finalized {
                return Err(Error::ProposalPending);
            }
        }

        let now = env.ledger().timestamp();
        let voting_end = now
            .checked_add(settings.config.voting_period)
            .ok_or(Error::Overflow)?;
        let id = storage::get_and_increment_proposal_id(&env);
        let proposal = Proposal {
            id,
            stage_index,
            evidence: evidence.clone(),
            proposer: proposer.clone(),
            created_at: now,
            voting_end,
            votes_for: 0,
            votes_against: 0,
            quorum_base: 0,
            status: ProposalStatus::Active,
            finalized: false,
        };
        storage::save_proposal(&env, &proposal);
        storage::set_stage_proposal(&env, stage_index, id);

        events::emit_proposal_created(&env, id, stage_index, proposer, evidence, voting_end);

        storage::exit_guard(&env);
        Ok(id)
    }

    /// Cast `voter`'s full current weight on `proposal_id`. Returns the weight.
    pub fn vote(env: Env, voter: Address, proposal_id: u64, in_favor: bool) -> Result<i128, Error> {
        voter.require_auth();
        storage::enter_guard(&env)?;

        let mut proposal = storage::load_proposal(&env, proposal_id)?;
        if proposal.finalized {
            return Err(Error::AlreadyFinalized);
        }
        if env.ledger().timestamp() >= proposal.voting_end {
            return Err(Error::VotingClosed);
        }
        let mut info = storage::get_voter(&env, &voter).ok_or(Error::NotEligibleVoter)?;
        let weight = weighted_stake(info.staked, info.reputation).ok_or(Error::Overflow)?;
        if weight <= 0 {
            return Err(Error::NotEligibleVoter);
        }
        if storage::has_voted(&env, proposal_id, &voter) {
            return Err(Error::AlreadyVoted);
        }

        if in_favor {
            proposal.votes_for = checked_accumulate(proposal.votes_for, weight).ok_or(Error::Overflow)?;
        } else {
            proposal.votes_against =
                checked_accumulate(proposal.votes_against, weight).ok_or(Error::Overflow)?;
        }
        Self::settle_votes(&env, &mut info);
        info.pending.push_back(proposal_id);
        info.active_votes = info.pending.len();

        storage::save_proposal(&env, &proposal);
        storage::save_voter(&env, &voter, &info);
        storage::record_vote(&env, proposal_id, &voter);

        events::emit_vote_cast(&env, proposal_id, voter, in_favor, weight);

        storage::exit_guard(&env);
        Ok(weight)
    }

    /// Close the vote on `proposal_id` and act on the outcome.
    ///
    /// Anyone may call this once the window has ended. Approval asks the
    /// escrow to release the stage; rejection counts towards the stage's
    /// rejection limit, and reaching it fails the project.
    ///
    /// Quorum is measured against `total_weight` at this point. Voters
    /// cannot unstake before finalisation, so participation never exceeds
    /// it. The cost does not depend on the number of voters.
    pub fn check_vote_result(env: Env, proposal_id: u64) -> Result<ProposalStatus, Error> {
        storage::enter_guard(&env)?;

        let settings = storage::load_settings(&env)?;
        let mut proposal = storage::load_proposal(&env, proposal_id)?;
        if proposal.finalized {
            return Err(Error::AlreadyFinalized);
        }
        if env.ledger().timestamp() < proposal.voting_end {
            return Err(Error::VotingStillOpen);
        }

        let participating = proposal
            .votes_for
            .checked_add(proposal.votes_against)
            .ok_or(Error::Overflow)?;
        proposal.quorum_base = storage::total_weight(&env);
        let quorum_met = participating > 0
            && meets_quorum(participating, proposal.quorum_base, settings.config.quorum_bps)
                .ok_or(Error::Overflow)?;
        let approved = quorum_met && proposal.votes_for > proposal.votes_against;

        proposal.finalized = true;
        proposal.status = if approved {
            ProposalStatus::Approved
        } else {
            ProposalStatus::Rejected
        };
        storage::save_proposal(&env, &proposal);

        let stage = proposal.stage_index;
        let escrow = EscrowClient::new(&env, &settings.escrow);
        let mut rejections = storage::get_stage_rejections(&env, stage);
        if approved {
            // A refused release leaves the proposal Approved.
            if let Ok(Ok(_)) = escrow.try_release_funds(&stage) {
                proposal.status = ProposalStatus::Executed;
                storage::save_proposal(&env, &proposal);
                rejections = 0;
                storage::set_stage_rejections(&env, stage, rejections);
            }
        } else {
            rejections = rejections.saturating_add(1);
            storage::set_stage_rejections(&env, stage, rejections);
        }

        events::emit_proposal_finalized(
            &env,
            ProposalFinalized {
                proposal_id,
                stage_index: stage,
                status: proposal.status,
                votes_for: proposal.votes_for,
                votes_against: proposal.votes_against,
                quorum_met,
            },
        );

        if !approved && rejections >= settings.config.rejection_limit {
            if let Ok(Ok(_)) = escrow.try_mark_failed() {
                events::emit_failure_declared(&env, stage, rejections);
            }
        }

        storage::exit_guard(&env);
        Ok(proposal.status)
    }

    /// Abandon the campaign and open refunds in the escrow. Beneficiary only.
    pub fn cancel_project(env: Env) -> Result<(), Error> {
        storage::enter_guard(&env)?;

        let settings = storage::load_settings(&env)?;
        let escrow = EscrowClient::new(&env, &settings.escrow);
        escrow.beneficiary().require_auth();

        if escrow.is_closed() {
            return Err(Error::ProjectClosed);
        }
        match escrow.try_cancel_project() {
            Ok(Ok(_)) => {}
            _ => return Err(Error::EscrowCallFailed),
        }

        storage::exit_guard(&env);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_proposal(env: Env, proposal_id: u64) -> Result<Proposal, Error> {
        storage::load_proposal(&env, proposal_id)
    }

    /// `voter`'s record with votes on finalised proposals already released.
    pub fn get_voter(env: Env, voter: Address) -> Option<VoterInfo> {
        storage::get_voter(&env, &voter).map(|mut info| {
            Self::settle_votes(&env, &mut info);
            info
        })
    }

    /// Weight `voter` would cast right now; 0 when unregistered.
    pub fn vote_weight(env: Env, voter: Address) -> Result<i128, Error> {
        match storage::get_voter(&env, &voter) {
            Some(info) => weighted_stake(info.staked, info.reputation).ok_or(Error::Overflow),
            None => Ok(0),
        }
    }

    pub fn has_voted(env: Env, proposal_id: u64, voter: Address) -> bool {
        storage::has_voted(&env, proposal_id, &voter)
    }

    /// A page of at most `MAX_VOTER_PAGE` voters on `proposal_id`.
    pub fn proposal_voters(env: Env, proposal_id: u64, start: u32, limit: u32) -> Vec<Address> {
        storage::get_voters(&env, proposal_id, start, limit.min(MAX_VOTER_PAGE))
    }

    pub fn voter_count(env: Env, proposal_id: u64) -> u32 {
        storage::voter_count(&env, proposal_id)
    }

    pub fn total_staked(env: Env) -> i128 {
        storage::total_staked(&env)
    }

    pub fn total_weight(env: Env) -> i128 {
        storage::total_weight(&env)
    }

    pub fn proposal_count(env: Env) -> u64 {
        storage::proposal_count(&env)
    }

    /// Latest proposal opened for `stage`.
    pub fn stage_proposal(env: Env, stage: u32) -> Option<u64> {
        storage::get_stage_proposal(&env, stage)
    }

    pub fn stage_rejections(env: Env, stage: u32) -> u32 {
        storage::get_stage_rejections(&env, stage)
    }

    pub fn get_config(env: Env) -> Result<GovernanceSettings, Error> {
        storage::load_settings(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    /// Move the aggregates from `info.staked` to `new_staked`; returns the
    /// new total stake.
    fn apply_stake_change(env: &Env, info: &VoterInfo, new_staked: i128) -> Result<i128, Error> {
        let old_weight = weighted_stake(info.staked, info.reputation).ok_or(Error::Overflow)?;
        let new_weight = weighted_stake(new_staked, info.reputation).ok_or(Error::Overflow)?;

        let total_staked = storage::total_staked(env)
            .checked_sub(info.staked)
            .and_then(|t| t.checked_add(new_staked))
            .ok_or(Error::Overflow)?;
        let total_weight = storage::total_weight(env)
            .checked_sub(old_weight)
            .and_then(|t| t.checked_add(new_weight))
            .ok_or(Error::Overflow)?;
        storage::set_totals(env, total_staked, total_weight);
        Ok(total_staked)
    }

    /// Drop finalised proposals from `info.pending`. At most one proposal is
    /// open at a time, so the list stays short.
    fn settle_votes(env: &Env, info: &mut VoterInfo) {
        let mut open = Vec::new(env);
        for id in info.pending.iter() {
            if let Ok(proposal) = storage::load_proposal(env, id) {
                if !proposal.finalized {
                    open.push_back(id);
                }
            }
        }
        info.active_votes = open.len();
        info.pending = open;
    }
}
