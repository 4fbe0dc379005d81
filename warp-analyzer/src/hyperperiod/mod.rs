//! Hyperperiod calculation.
//!
//! The hyperperiod of a flow set is the LCM of every flow's period.  It is the
//! number of slots in one complete repetition of the transmission schedule, so
//! it also sizes the schedule table (`hyperperiod × node count` cells).  That
//! is why an upper limit is enforced: a pathological set of coprime periods
//! must be rejected instead of allocating a gigantic table.

pub mod math;

use thiserror::Error;
use tracing::{debug, warn};

use math::lcm_of_periods;

/// Default upper bound on the hyperperiod, in slots.
pub const DEFAULT_HYPERPERIOD_LIMIT: u64 = 1_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur during hyperperiod calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HyperperiodError {
    /// No flow with a non-zero period was supplied.
    #[error("no flows with a valid (non-zero) period")]
    NoValidPeriods,

    /// LCM calculation overflowed `u64`.
    #[error("LCM overflow computing lcm({a}, {b})")]
    Overflow { a: u64, b: u64 },

    /// The hyperperiod exceeded the configured limit.
    #[error("hyperperiod of {value} slots exceeds limit of {limit} slots")]
    TooLarge { value: u64, limit: u64 },
}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Result of a hyperperiod calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    /// LCM of all periods, in slots.
    pub hyperperiod: u64,

    /// Distinct periods that contributed (sorted, deduplicated).
    pub unique_periods: Vec<u64>,

    /// Number of flows that contributed.
    pub flow_count: usize,
}

impl HyperperiodInfo {
    /// Number of releases a flow with `period` has inside one hyperperiod.
    pub fn instances_of(&self, period: u64) -> u64 {
        if period == 0 {
            0
        } else {
            self.hyperperiod / period
        }
    }
}

/// Compute the hyperperiod of `periods`, rejecting results above `limit`.
///
/// Zero periods are ignored.  Duplicates are collapsed before folding so a
/// workload of many flows sharing a handful of rates costs a handful of LCMs.
pub fn hyperperiod_of(
    periods: impl IntoIterator<Item = u64>,
    limit: u64,
) -> Result<HyperperiodInfo, HyperperiodError> {
    let mut unique_periods: Vec<u64> = Vec::new();
    let mut flow_count = 0usize;
    for p in periods.into_iter().filter(|&p| p > 0) {
        unique_periods.push(p);
        flow_count += 1;
    }

    if unique_periods.is_empty() {
        return Err(HyperperiodError::NoValidPeriods);
    }

    unique_periods.sort_unstable();
    unique_periods.dedup();

    let hyperperiod = lcm_of_periods(&unique_periods)?;

    if hyperperiod > limit {
        warn!(hyperperiod, limit, "Hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit,
        });
    }

    debug!(
        hyperperiod,
        flow_count,
        unique = ?unique_periods,
        "Calculated hyperperiod"
    );

    Ok(HyperperiodInfo {
        hyperperiod,
        unique_periods,
        flow_count,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
