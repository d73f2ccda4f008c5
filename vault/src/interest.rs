//! # Simple-Interest Arithmetic
//!
//! Interest is computed as `principal * rate% * days / 36500` with truncating
//! integer division: `/100` for the percent and `/365` for the day fraction,
//! combined into a single final division so that truncation happens exactly
//! once, after all multiplications.
//!
//! The multiplications run in `u128`; a result that does not fit back into
//! `u64` is reported as `None`, never wrapped. All rounding favors the payer:
//! the aggregate obligation is truncated once at finalization, and each
//! holder's share is truncated independently at withdrawal, so the sum of
//! per-holder payouts can never exceed the aggregate that was secured.

/// Combined divisor for percent (100) and day-count (365) scaling.
pub const RATE_DAY_BASIS: u128 = 36_500;

/// Interest accrued on `principal` at `rate_percent`/year over `lock_days`.
///
/// Truncating division, multiplication first. Returns `None` if the result
/// exceeds `u64::MAX`.
pub fn simple_interest(principal: u64, rate_percent: u32, lock_days: u32) -> Option<u64> {
    let numerator = (principal as u128)
        .checked_mul(rate_percent as u128)?
        .checked_mul(lock_days as u128)?;
    u64::try_from(numerator / RATE_DAY_BASIS).ok()
}

/// Principal plus accrued interest — the amount a holder is owed.
///
/// Returns `None` on overflow of either the interest term or the sum.
pub fn entitlement(principal: u64, rate_percent: u32, lock_days: u32) -> Option<u64> {
    let interest = simple_interest(principal, rate_percent, lock_days)?;
    principal.checked_add(interest)
}
