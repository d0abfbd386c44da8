//! # Types
//!
//! Data structures stored and returned by the escrow contract.
//!
//! ## Config / State split
//!
//! A campaign is stored as two instance entries:
//!
//! - [`EscrowConfig`]: written once by `init`; never mutated.
//! - [`EscrowState`]: rewritten on every donation, release and refund.
//!
//! ## Lifecycle
//!
//! ```text
//! Funding ──► GoalReached ──► stage 0 .. stage N-1 released (settled)
//!    │              │
//!    │              └──► Failed / Cancelled ──► Refunding
//!    └──► deadline passed, goal unmet ─────────► Refunding
//! ```
//!
//! `failed` and `refunds_enabled` are terminal: once set, they stay set.

use soroban_sdk::{contracttype, Address, Vec};

/// Immutable campaign configuration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowConfig {
    /// Receives released stage funds.
    pub beneficiary: Address,
    /// Asset contributions are made in.
    pub token: Address,
    /// Target amount; donations are capped here.
    pub funding_goal: i128,
    /// Ledger timestamp at which donations stop.
    pub deadline: u64,
    /// Per-stage release amounts, summing exactly to `funding_goal`.
    pub stage_allocations: Vec<i128>,
}

/// Mutable campaign state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowState {
    /// Sum of all accepted donations. Never decreases.
    pub funds_raised: i128,
    /// Sum of all stage releases to the beneficiary.
    pub released_total: i128,
    /// Value currently held for the campaign.
    pub balance: i128,
    /// Index of the next stage eligible for release.
    pub current_stage: u32,
    /// Per-stage released flag; once `true`, permanently `true`.
    pub stage_released: Vec<bool>,
    pub failed: bool,
    pub cancelled: bool,
    pub refunds_enabled: bool,
    /// `balance` at the instant refunds were enabled.
    pub refund_pool_snapshot: i128,
    /// `funds_raised` at the instant refunds were enabled.
    pub total_contribution_snapshot: i128,
}

/// Funding status tuple for display.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingStatus {
    pub funds_raised: i128,
    pub funding_goal: i128,
    pub current_stage: u32,
    pub total_stages: u32,
    pub goal_reached: bool,
    pub cancelled: bool,
    pub failed: bool,
    pub refunds_enabled: bool,
    /// Seconds until the funding deadline, `0` once it has passed.
    pub time_remaining: u64,
}

/// One row of the allocation table.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageInfo {
    pub index: u32,
    pub allocation: i128,
    pub released: bool,
}

/// Per-address ledger view.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionInfo {
    pub contributed: i128,
    pub refunded: i128,
    /// What `refund` would pay right now; `0` while refunds are disabled.
    pub claimable: i128,
}
