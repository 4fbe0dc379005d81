//! Per-hop reliability allocation.
//!
//! [`ReliabilityAllocator`] turns a flow's hop count and the workload's
//! `(M, E2E, faults)` parameters into the minimum number of transmission
//! attempts every hop needs.
//!
//! # The reliability window
//!
//! The allocation is computed by stepping a probability row through time,
//! one slot per iteration.  `r[i]` is the probability that the packet has
//! reached node `i`; the source starts at `r[0] = 1`.  In each slot every hop
//! whose receiver is still below the per-link target
//! `min_link = max(E2E, E2E^(1/hops))` and whose sender may already hold the
//! packet transmits once:
//!
//! ```text
//! r'[i+1] = (1 − M)·r[i+1] + M·r[i]        attempts[i] += 1
//! ```
//!
//! Iteration stops as soon as the sink reaches `E2E`.  The attempt counts are
//! the per-hop vector and the number of iterations is the flow's worst-case
//! end-to-end cost, since hops transmit in parallel inside the window.  The
//! resulting vector is not monotonic along the chain: middle hops start later
//! and need more pushes to lift their receiver over `min_link`.
//!
//! | nodes | vector | cost |
//! |---|---|---|
//! | 3 | `3,3,0` | 4 |
//! | 4 | `3,4,3,0` | 5 |
//! | 6 | `3,4,4,5,4,0` | 8 |
//!
//! (`M = 0.9`, `E2E = 0.99`.)

pub mod error;

pub use error::ReliabilityError;

use tracing::{debug, info, warn};

use crate::flow::{Allocation, Flow};
use crate::workload::WorkLoad;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default per-hop attempt ceiling.
pub const DEFAULT_MAX_ATTEMPTS_PER_HOP: u32 = 100;

/// Slack applied before rounding the analytic per-link figure up, so that a
/// ratio that is mathematically integral is not pushed to the next integer by
/// floating-point noise.
const CEIL_EPSILON: f64 = 1e-9;

// ── Policy ────────────────────────────────────────────────────────────────────

/// What to do when a hop hits the attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CeilingPolicy {
    /// Report [`ReliabilityError::Unsatisfiable`] for the flow.
    #[default]
    Fail,
    /// Stop the hop at the ceiling and accept the reliability reached.
    Clamp,
}

// ── Window result ─────────────────────────────────────────────────────────────

/// Raw output of [`reliability_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOutcome {
    /// Attempts per node (sink entry `0`).
    pub attempts: Vec<u32>,
    /// Slots the window ran for.
    pub slots: u32,
    /// Probability the packet is at the sink at the end of the window.
    pub reliability: f64,
}

/// The window could not finish under [`CeilingPolicy::Fail`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopExhausted {
    pub hop: usize,
    pub achieved: f64,
}

/// Per-link reliability each hop must reach for a chain of `hops` hops.
pub fn min_link_reliability(e2e: f64, hops: usize) -> f64 {
    if hops == 0 {
        return e2e;
    }
    e2e.max(e2e.powf(1.0 / hops as f64))
}

/// Run the reliability window for a chain of `node_count` nodes.
pub fn reliability_window(
    node_count: usize,
    m: f64,
    e2e: f64,
    ceiling: u32,
    policy: CeilingPolicy,
) -> Result<WindowOutcome, HopExhausted> {
    if node_count <= 1 {
        return Ok(WindowOutcome {
            attempts: vec![0; node_count],
            slots: 0,
            reliability: 1.0,
        });
    }

    let hops = node_count - 1;
    let sink = node_count - 1;
    let min_link = min_link_reliability(e2e, hops);

    let mut attempts = vec![0u32; node_count];
    let mut row = vec![0.0_f64; node_count];
    row[0] = 1.0;
    let mut slots = 0u32;

    while row[sink] < e2e {
        let prev = row.clone();
        let mut pushed = false;

        for hop in 0..hops {
            let src = prev[hop];
            let dst = prev[hop + 1];

            if dst < min_link && src > 0.0 {
                if attempts[hop] >= ceiling {
                    match policy {
                        CeilingPolicy::Fail => {
                            return Err(HopExhausted {
                                hop,
                                achieved: prev[sink],
                            })
                        }
                        CeilingPolicy::Clamp => {
                            row[hop + 1] = dst;
                            continue;
                        }
                    }
                }
                row[hop + 1] = (1.0 - m) * dst + m * src;
                attempts[hop] += 1;
                pushed = true;
            } else {
                row[hop + 1] = dst;
            }
        }

        // Only reachable when every eligible hop is clamped.
        if !pushed {
            break;
        }
        slots += 1;
    }

    Ok(WindowOutcome {
        attempts,
        slots,
        reliability: row[sink],
    })
}

/// Uniform attempts per link needed for one hop to reach `min_link`:
/// `ceil(ln(1 − min_link) / ln(1 − M))`.
pub fn uniform_tx_per_link(m: f64, min_link: f64) -> u32 {
    let ratio = (1.0 - min_link).ln() / (1.0 - m).ln();
    (ratio - CEIL_EPSILON).ceil().max(1.0) as u32
}

// ── ReliabilityAllocator ──────────────────────────────────────────────────────

/// Computes [`Allocation`]s from the workload's global parameters.
///
/// Stateless apart from its ceiling settings; per-flow results are
/// independent of each other.
#[derive(Debug, Clone, Copy)]
pub struct ReliabilityAllocator {
    max_attempts_per_hop: u32,
    ceiling_policy: CeilingPolicy,
}

impl Default for ReliabilityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReliabilityAllocator {
    pub fn new() -> Self {
        Self {
            max_attempts_per_hop: DEFAULT_MAX_ATTEMPTS_PER_HOP,
            ceiling_policy: CeilingPolicy::Fail,
        }
    }

    pub fn with_ceiling(mut self, max_attempts_per_hop: u32, policy: CeilingPolicy) -> Self {
        self.max_attempts_per_hop = max_attempts_per_hop;
        self.ceiling_policy = policy;
        self
    }

    pub fn max_attempts_per_hop(&self) -> u32 {
        self.max_attempts_per_hop
    }

    pub fn ceiling_policy(&self) -> CeilingPolicy {
        self.ceiling_policy
    }

    /// Allocate attempts for one flow of `workload`.
    pub fn allocate(&self, workload: &WorkLoad, flow: &Flow) -> Result<Allocation, ReliabilityError> {
        if flow.is_empty() {
            return Err(ReliabilityError::EmptyFlow(flow.name.clone()));
        }

        let cfg = workload.config();
        let m = cfg.min_packet_reception_rate;
        let e2e = cfg.e2e;
        let floor = cfg.num_faults + 1;
        let hops = flow.len() - 1;

        let window = reliability_window(
            flow.len(),
            m,
            e2e,
            self.max_attempts_per_hop,
            self.ceiling_policy,
        )
        .map_err(|ex| {
            let edge = flow.edges()[ex.hop];
            ReliabilityError::Unsatisfiable {
                flow: flow.name.clone(),
                hop: ex.hop,
                src: workload.node_name(edge.src).unwrap_or_default().to_string(),
                dst: workload.node_name(edge.dst).unwrap_or_default().to_string(),
                ceiling: self.max_attempts_per_hop,
                target: e2e,
                achieved: ex.achieved,
            }
        })?;

        if window.reliability < e2e && hops > 0 {
            warn!(
                flow = %flow.name,
                achieved = window.reliability,
                target = e2e,
                ceiling = self.max_attempts_per_hop,
                "attempt ceiling clamped, E2E target not reached"
            );
        }

        // Fault floor: every hop survives `num_faults` consecutive losses.
        let mut link_tx = window.attempts;
        let mut extra = 0u32;
        for tx in link_tx.iter_mut().take(hops) {
            if *tx < floor {
                extra += floor - *tx;
                *tx = floor;
            }
        }

        let num_tx_per_link = if hops == 0 {
            floor
        } else {
            uniform_tx_per_link(m, min_link_reliability(e2e, hops)).max(floor)
        };

        let allocation = Allocation {
            link_tx,
            total_cost: window.slots + extra,
            num_tx_per_link,
            e2e_reliability: window.reliability,
        };

        debug!(
            flow = %flow.name,
            link_tx = ?allocation.link_tx,
            total_cost = allocation.total_cost,
            num_tx_per_link,
            reliability = allocation.e2e_reliability,
            "allocated"
        );

        Ok(allocation)
    }

    /// Allocate every flow in `workload`, attaching the results.
    ///
    /// Flows that fail lose any earlier allocation, so the synthesizer
    /// reports them as unallocated; their errors are returned so the caller
    /// can report them alongside the other flows' results.
    pub fn allocate_workload(&self, workload: &mut WorkLoad) -> Vec<ReliabilityError> {
        info!(
            flow_count = workload.flows().len(),
            m = workload.config().min_packet_reception_rate,
            e2e = workload.config().e2e,
            faults = workload.config().num_faults,
            "=== ReliabilityAllocator::allocate_workload() ==="
        );

        let view: &WorkLoad = workload;
        let results: Vec<Result<Allocation, ReliabilityError>> = view
            .flows()
            .iter()
            .map(|flow| self.allocate(view, flow))
            .collect();

        let num_faults = workload.config().num_faults;
        let mut errors = Vec::new();
        for (flow, result) in workload.flows_mut().iter_mut().zip(results) {
            match result {
                Ok(allocation) => flow.set_allocation(allocation),
                Err(e) => {
                    warn!(flow = %flow.name, error = %e, "✗ allocation failed");
                    flow.clear_allocation(num_faults);
                    errors.push(e);
                }
            }
        }

        info!(failed = errors.len(), "allocation done");
        errors
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
