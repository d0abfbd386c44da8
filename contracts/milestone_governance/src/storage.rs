//! # Storage
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key               | Type                 | Description                     |
//! |-------------------|----------------------|---------------------------------|
//! | `Settings`        | `GovernanceSettings` | Escrow, stake token, policy     |
//! | `ProposalCount`   | `u64`                | Auto-increment proposal ID      |
//! | `TotalStaked`     | `i128`               | Sum of all voter stakes         |
//! | `TotalWeight`     | `i128`               | Sum of all voter weights        |
//! | `ReentrancyGuard` | `bool`               | Present while an entry point runs |
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type           | Description                        |
//! |-------------------------|----------------|------------------------------------|
//! | `Voter(addr)`           | `VoterInfo`    | Stake, reputation, pending votes   |
//! | `Proposal(id)`          | `Proposal`     | Proposal record                    |
//! | `Voted(id, addr)`       | `bool`         | `addr` voted on `id`               |
//! | `VoterCount(id)`        | `u32`          | Number of voters on `id`           |
//! | `VoterAt(id, n)`        | `Address`      | `n`-th voter on `id`               |
//! | `StageProposal(stage)`  | `u64`          | Latest proposal opened for `stage` |
//! | `StageRejections(stage)`| `u32`          | Consecutive rejections of `stage`  |

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{GovernanceSettings, Proposal, VoterInfo};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Settings,
    ProposalCount,
    TotalStaked,
    TotalWeight,
    ReentrancyGuard,
    Voter(Address),
    Proposal(u64),
    Voted(u64, Address),
    VoterCount(u64),
    VoterAt(u64, u32),
    StageProposal(u32),
    StageRejections(u32),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Settings)
}

pub fn save_settings(env: &Env, settings: &GovernanceSettings) {
    env.storage().instance().set(&DataKey::Settings, settings);
    bump_instance(env);
}

pub fn load_settings(env: &Env) -> Result<GovernanceSettings, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Settings)
        .ok_or(Error::NotInitialized)
}

/// Reads, increments, and stores the proposal counter.
/// Returns the ID to use for the *current* proposal (pre-increment value).
pub fn get_and_increment_proposal_id(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::ProposalCount)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::ProposalCount, &(current + 1));
    current
}

pub fn proposal_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProposalCount)
        .unwrap_or(0)
}

pub fn total_staked(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalStaked)
        .unwrap_or(0)
}

pub fn total_weight(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalWeight)
        .unwrap_or(0)
}

pub fn set_totals(env: &Env, staked: i128, weight: i128) {
    env.storage().instance().set(&DataKey::TotalStaked, &staked);
    env.storage().instance().set(&DataKey::TotalWeight, &weight);
    bump_instance(env);
}

pub fn enter_guard(env: &Env) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::ReentrancyGuard) {
        return Err(Error::Reentrancy);
    }
    env.storage()
        .instance()
        .set(&DataKey::ReentrancyGuard, &true);
    Ok(())
}

pub fn exit_guard(env: &Env) {
    env.storage().instance().remove(&DataKey::ReentrancyGuard);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read<T>(env: &Env, key: &DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value: Option<T> = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn write<T>(env: &Env, key: &DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

pub fn get_voter(env: &Env, voter: &Address) -> Option<VoterInfo> {
    read(env, &DataKey::Voter(voter.clone()))
}

pub fn save_voter(env: &Env, voter: &Address, info: &VoterInfo) {
    write(env, &DataKey::Voter(voter.clone()), info);
}

pub fn load_proposal(env: &Env, id: u64) -> Result<Proposal, Error> {
    read(env, &DataKey::Proposal(id)).ok_or(Error::ProposalNotFound)
}

pub fn save_proposal(env: &Env, proposal: &Proposal) {
    write(env, &DataKey::Proposal(proposal.id), proposal);
}

pub fn has_voted(env: &Env, id: u64, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Voted(id, voter.clone()))
}

/// Mark `voter` as having voted on `id` and append them to the voter index.
pub fn record_vote(env: &Env, id: u64, voter: &Address) {
    write(env, &DataKey::Voted(id, voter.clone()), &true);
    let count = voter_count(env, id);
    write(env, &DataKey::VoterAt(id, count), voter);
    write(env, &DataKey::VoterCount(id), &(count + 1));
}

pub fn voter_count(env: &Env, id: u64) -> u32 {
    read(env, &DataKey::VoterCount(id)).unwrap_or(0)
}

/// Up to `limit` voters on `id`, in voting order, starting at `start`.
pub fn get_voters(env: &Env, id: u64, start: u32, limit: u32) -> Vec<Address> {
    let end = voter_count(env, id).min(start.saturating_add(limit));
    let mut voters = Vec::new(env);
    for n in start..end {
        if let Some(voter) = read(env, &DataKey::VoterAt(id, n)) {
            voters.push_back(voter);
        }
    }
    voters
}

pub fn get_stage_proposal(env: &Env, stage: u32) -> Option<u64> {
    read(env, &DataKey::StageProposal(stage))
}

pub fn set_stage_proposal(env: &Env, stage: u32, id: u64) {
    write(env, &DataKey::StageProposal(stage), &id);
}

pub fn get_stage_rejections(env: &Env, stage: u32) -> u32 {
    read(env, &DataKey::StageRejections(stage)).unwrap_or(0)
}

pub fn set_stage_rejections(env: &Env, stage: u32, count: u32) {
    write(env, &DataKey::StageRejections(stage), &count);
}
