/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Slot demand analysis.
//!
//! Computed and logged after every synthesis run.  It is a **warning only**:
//! the placement itself is the hard gate, these figures just explain why a
//! run produced failures (or how close to saturation a feasible one is).
//!
//! # Theory
//! A flow occupies `A = Σ link_tx` transmission slots per release and is
//! released every `T` slots, so it demands `A / T` of one channel.  The
//! workload can only fit if
//!
//! ```text
//! Σ_flows A_f / T_f  ≤  numChannels
//! ```
//!
//! Every transmission also holds two radios (sender and receiver).  A node
//! takes part in at most one transmission per slot, so for every node `n`
//!
//! ```text
//! Σ_{hops touching n} link_tx[hop] / T_f  ≤  1
//! ```
//!
//! Both are necessary conditions, not sufficient ones: deadline windows and
//! hop ordering can still make a workload below both bounds infeasible.

use std::collections::BTreeMap;

use crate::flow::Flow;
use crate::workload::WorkLoad;

/// Fraction of one channel a flow demands: `attempt_sum / period`.
///
/// Returns `0.0` for a flow with no period or no allocation.
pub fn flow_demand(flow: &Flow) -> f64 {
    if flow.period == 0 {
        return 0.0;
    }
    flow.attempt_sum() as f64 / flow.period as f64
}

/// Check total channel demand against `num_channels`.
///
/// Returns `None` when the demand fits, `Some(total_demand)` when it exceeds
/// the channel count.
pub fn check_channel_demand(flows: &[Flow], num_channels: u32) -> Option<f64> {
    let total: f64 = flows.iter().map(flow_demand).sum();
    if total > num_channels as f64 {
        Some(total)
    } else {
        None
    }
}

/// Per-node radio demand, keyed by node name (sorted).
pub fn node_demand(workload: &WorkLoad) -> BTreeMap<String, f64> {
    let mut demand: BTreeMap<String, f64> = BTreeMap::new();
    for flow in workload.flows() {
        if flow.period == 0 {
            continue;
        }
        let link_tx = flow.link_tx();
        for (hop, edge) in flow.edges().iter().enumerate() {
            let share = link_tx.get(hop).copied().unwrap_or(0) as f64 / flow.period as f64;
            for node in [edge.src, edge.dst] {
                if let Some(name) = workload.node_name(node) {
                    *demand.entry(name.to_string()).or_default() += share;
                }
            }
        }
    }
    demand
}

/// Nodes whose radio demand exceeds one transmission per slot.
pub fn overloaded_nodes(workload: &WorkLoad) -> Vec<(String, f64)> {
    node_demand(workload)
        .into_iter()
        .filter(|(_, d)| *d > 1.0)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
