//! # Storage
//!
//! Typed helpers over the two storage tiers the escrow uses.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key               | Type           | Description                        |
//! |-------------------|----------------|------------------------------------|
//! | `Config`          | `EscrowConfig` | Immutable campaign configuration   |
//! | `State`           | `EscrowState`  | Mutable campaign state             |
//! | `Governance`      | `Address`      | Release/cancel authority (set once)|
//! | `ReentrancyGuard` | `bool`         | Present while an entry point runs  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type   | Description                     |
//! |----------------------|--------|---------------------------------|
//! | `Contribution(addr)` | `i128` | Cumulative amount donated       |
//! | `Refunded(addr)`     | `i128` | Cumulative amount refunded      |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{EscrowConfig, EscrowState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    State,
    Governance,
    ReentrancyGuard,
    Contribution(Address),
    Refunded(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Write the configuration and the initial state of a new campaign.
pub fn save_campaign(env: &Env, config: &EscrowConfig, state: &EscrowState) {
    env.storage().instance().set(&DataKey::Config, config);
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Result<EscrowConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn load_state(env: &Env) -> Result<EscrowState, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

/// Load config and state together, bumping the instance TTL once.
pub fn load_campaign(env: &Env) -> Result<(EscrowConfig, EscrowState), Error> {
    Ok((load_config(env)?, load_state(env)?))
}

pub fn save_state(env: &Env, state: &EscrowState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn get_governance(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Governance)
}

pub fn set_governance(env: &Env, authority: &Address) {
    env.storage().instance().set(&DataKey::Governance, authority);
    bump_instance(env);
}

/// Take the re-entrancy latch, failing if an entry point is already running.
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

fn read_amount(env: &Env, key: &DataKey) -> i128 {
    let amount: Option<i128> = env.storage().persistent().get(key);
    match amount {
        Some(amount) => {
            bump_persistent(env, key);
            amount
        }
        None => 0,
    }
}

fn write_amount(env: &Env, key: &DataKey, amount: i128) {
    env.storage().persistent().set(key, &amount);
    bump_persistent(env, key);
}

pub fn get_contribution(env: &Env, contributor: &Address) -> i128 {
    read_amount(env, &DataKey::Contribution(contributor.clone()))
}

pub fn set_contribution(env: &Env, contributor: &Address, amount: i128) {
    write_amount(env, &DataKey::Contribution(contributor.clone()), amount);
}

pub fn get_refunded(env: &Env, contributor: &Address) -> i128 {
    read_amount(env, &DataKey::Refunded(contributor.clone()))
}

pub fn set_refunded(env: &Env, contributor: &Address, amount: i128) {
    write_amount(env, &DataKey::Refunded(contributor.clone()), amount);
}
