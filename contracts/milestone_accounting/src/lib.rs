//! # Milestone Accounting
//!
//! Integer arithmetic shared by the escrow and governance contracts.
//!
//! Every helper is overflow-checked and reports failure through `Option` or
//! [`AllocationError`] rather than wrapping. The only rounding step is the
//! truncating division in [`pro_rata_share`], which always rounds toward the
//! escrow: a contributor can be under-refunded by at most one unit, never
//! over-refunded.

#![no_std]

/// Denominator for quorum fractions expressed in basis points.
pub const BASIS_POINTS: i128 = 10_000;

/// Reputation score assigned to every voter at registration.
///
/// A voter at the baseline carries a weight equal to their stake.
pub const REPUTATION_BASELINE: u32 = 100;

/// Stage counts accepted for a campaign's allocation table.
pub const PERMITTED_STAGE_COUNTS: [u32; 3] = [3, 5, 7];

/// Why an allocation table was refused.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AllocationError {
    /// The number of stages is not one of [`PERMITTED_STAGE_COUNTS`].
    InvalidStageCount,
    /// A stage was allocated zero or a negative amount.
    NonPositiveAllocation,
    /// Summing the table overflowed `i128`.
    Overflow,
    /// The table does not add up to the funding goal.
    SumMismatch,
}

/// Add `amount` to a running total, refusing negative amounts and overflow.
pub fn checked_accumulate(total: i128, amount: i128) -> Option<i128> {
    if amount < 0 {
        return None;
    }
    total.checked_add(amount)
}

/// Validate a stage allocation table against `goal`.
///
/// The table must have a permitted length, strictly positive entries, and sum
/// to `goal` exactly. Nothing is adjusted: a table off by one unit is refused.
pub fn validate_allocations<I>(allocations: I, goal: i128) -> Result<(), AllocationError>
where
    I: IntoIterator<Item = i128>,
{
    let mut count: u32 = 0;
    let mut sum: i128 = 0;
    for amount in allocations {
        if amount <= 0 {
            return Err(AllocationError::NonPositiveAllocation);
        }
        sum = sum.checked_add(amount).ok_or(AllocationError::Overflow)?;
        count = count.saturating_add(1);
    }

    if !PERMITTED_STAGE_COUNTS.contains(&count) {
        return Err(AllocationError::InvalidStageCount);
    }
    if sum != goal {
        return Err(AllocationError::SumMismatch);
    }
    Ok(())
}

/// `contribution * pool / total`, truncated toward zero.
///
/// Returns `None` when `total` is not positive, an input is negative, or the
/// product overflows.
pub fn pro_rata_share(contribution: i128, pool: i128, total: i128) -> Option<i128> {
    if total <= 0 || contribution < 0 || pool < 0 {
        return None;
    }
    contribution.checked_mul(pool)?.checked_div(total)
}

/// Voting weight of `stake` at the given reputation.
///
/// `stake * reputation / REPUTATION_BASELINE`, truncated.
pub fn weighted_stake(stake: i128, reputation: u32) -> Option<i128> {
    if stake < 0 {
        return None;
    }
    stake
        .checked_mul(reputation as i128)?
        .checked_div(REPUTATION_BASELINE as i128)
}

/// `true` when `participating` is at least `quorum_bps / 10_000` of `total`.
///
/// Compared by cross-multiplication so no fraction is ever rounded.
pub fn meets_quorum(participating: i128, total: i128, quorum_bps: u32) -> Option<bool> {
    if participating < 0 || total < 0 {
        return None;
    }
    let lhs = participating.checked_mul(BASIS_POINTS)?;
    let rhs = total.checked_mul(quorum_bps as i128)?;
    Some(lhs >= rhs)
}
