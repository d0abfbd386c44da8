//! # Types
//!
//! Data structures stored and returned by the governance contract.
//!
//! ### Proposal lifecycle
//!
//! ```text
//! Active ──► Approved ──► Executed      (escrow release succeeded)
//!    └─────► Rejected
//! ```
//!
//! All transitions happen inside a single `check_vote_result` call, after
//! which the proposal is `finalized` and never changes again. An `Approved`
//! proposal whose release the escrow refused stays `Approved`.

use soroban_sdk::{contracttype, Address, String, Vec};

/// Window length used when a campaign does not pick its own: 7 days.
pub const DEFAULT_VOTING_PERIOD: u64 = 7 * 24 * 60 * 60;
/// Half of the eligible weight must take part.
pub const DEFAULT_QUORUM_BPS: u32 = 5_000;
/// Two consecutive rejections of the same stage fail the project.
pub const DEFAULT_REJECTION_LIMIT: u32 = 2;

/// Tunable voting policy.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernanceConfig {
    /// Voting window length in seconds.
    pub voting_period: u64,
    /// Share of the eligible weight that must vote, in basis points.
    pub quorum_bps: u32,
    /// Consecutive rejections of one stage after which the project fails.
    pub rejection_limit: u32,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        GovernanceConfig {
            voting_period: DEFAULT_VOTING_PERIOD,
            quorum_bps: DEFAULT_QUORUM_BPS,
            rejection_limit: DEFAULT_REJECTION_LIMIT,
        }
    }
}

/// Everything fixed at `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernanceSettings {
    /// Escrow this instance governs.
    pub escrow: Address,
    /// Asset voters lock up to gain weight.
    pub stake_token: Address,
    pub config: GovernanceConfig,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProposalStatus {
    /// Voting window open or awaiting finalisation.
    Active,
    /// Quorum and majority met.
    Approved,
    /// Quorum or majority missed.
    Rejected,
    /// Approved and the stage funds were released.
    Executed,
}

/// Request to release one stage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: u64,
    pub stage_index: u32,
    /// Opaque pointer to off-chain evidence; never resolved on-chain.
    pub evidence: String,
    pub proposer: Address,
    pub created_at: u64,
    /// First timestamp at which votes are no longer accepted.
    pub voting_end: u64,
    pub votes_for: i128,
    pub votes_against: i128,
    /// Total eligible weight the tally was measured against. Zero until
    /// the proposal is finalised.
    pub quorum_base: i128,
    pub status: ProposalStatus,
    pub finalized: bool,
}

/// A registered voter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoterInfo {
    pub staked: i128,
    /// Fixed at registration.
    pub reputation: u32,
    /// Votes cast on proposals not yet finalised; blocks `unstake` while > 0.
    pub active_votes: u32,
    /// Ids behind `active_votes`. Finalised ids are dropped lazily the next
    /// time the voter votes, unstakes or is queried.
    pub pending: Vec<u64>,
}
