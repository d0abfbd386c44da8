//! Call surface of the milestone escrow, as seen from governance.
//!
//! Only the functions governance needs are declared. Every argument and
//! return value is a plain SDK type, so the two contracts share no crate at
//! build time; the escrow's own `Result` errors surface as failed invocations.

use soroban_sdk::{contractclient, Address, Env};

#[contractclient(name = "EscrowClient")]
pub trait EscrowInterface {
    fn beneficiary(env: Env) -> Address;
    fn current_stage(env: Env) -> u32;
    fn goal_reached(env: Env) -> bool;
    fn is_closed(env: Env) -> bool;
    fn release_funds(env: Env, stage_index: u32) -> i128;
    fn mark_failed(env: Env);
    fn cancel_project(env: Env);
}
