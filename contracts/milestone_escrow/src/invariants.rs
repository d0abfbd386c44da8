#![allow(dead_code)]

extern crate std;

use crate::types::{FundingStatus, StageInfo};

/// Raised funds never exceed the goal.
pub fn assert_raised_within_goal(status: &FundingStatus) {
    assert!(
        status.funds_raised <= status.funding_goal,
        "funds_raised {} exceeds funding_goal {}",
        status.funds_raised,
        status.funding_goal
    );
}

/// `funds_raised` equals the sum of every accepted donation.
pub fn assert_conservation(status: &FundingStatus, accepted: &[i128]) {
    let total: i128 = accepted.iter().sum();
    assert_eq!(
        status.funds_raised, total,
        "conservation broken: funds_raised {} != sum of accepted donations {}",
        status.funds_raised, total
    );
}

/// Released flags are exactly the prefix `[0, current_stage)`.
pub fn assert_sequential_flags(status: &FundingStatus, stages: &[StageInfo]) {
    assert!(
        status.current_stage <= status.total_stages,
        "current_stage {} beyond total_stages {}",
        status.current_stage,
        status.total_stages
    );
    for stage in stages {
        assert_eq!(
            stage.released,
            stage.index < status.current_stage,
            "stage {} released flag {} inconsistent with current_stage {}",
            stage.index,
            stage.released,
            status.current_stage
        );
    }
}

/// `current_stage` never moves backwards.
pub fn assert_stage_monotonic(before: u32, after: u32) {
    assert!(
        after >= before,
        "current_stage decreased from {} to {}",
        before,
        after
    );
}

/// Refunds paid out never exceed the pool they were drawn from.
pub fn assert_refunds_bounded(paid: &[i128], pool: i128) {
    let total: i128 = paid.iter().sum();
    assert!(
        total <= pool,
        "refunds paid {} exceed the refund pool {}",
        total,
        pool
    );
}

/// Run all stateless status invariants.
pub fn assert_all_status_invariants(status: &FundingStatus, stages: &[StageInfo]) {
    assert_raised_within_goal(status);
    assert_sequential_flags(status, stages);
    if status.refunds_enabled {
        assert!(
            status.failed || status.funds_raised < status.funding_goal,
            "refunds enabled on a campaign that neither failed nor missed its goal"
        );
    }
}
