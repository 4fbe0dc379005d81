/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GCD / checked LCM over flow periods (in slots).

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(0, n) == n`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Checked LCM of two periods.
///
/// Divides before multiplying (`a / gcd(a, b) * b`) and checks the final
/// multiplication, so an overflow is reported as
/// [`HyperperiodError::Overflow`] instead of wrapping.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// Fold a list of periods into their LCM.  An empty list yields `Ok(0)`.
pub fn lcm_of_periods(periods: &[u64]) -> Result<u64, HyperperiodError> {
    let Some((&first, rest)) = periods.split_first() else {
        return Ok(0);
    };
    rest.iter().try_fold(first, |acc, &p| lcm(acc, p))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
