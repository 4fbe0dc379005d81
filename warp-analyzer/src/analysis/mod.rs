/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Worst-case latency and deadline verification.
//!
//! Read-only pass over a finished [`Schedule`].  For every flow instance
//! released inside the hyperperiod:
//!
//! ```text
//! completion = last attempt slot + 1        (absolute, may pass H)
//! latency    = completion − release
//! met        = latency ≤ deadline
//! ```
//!
//! A single-node flow delivers at its release.  An instance with no
//! placement (rolled back or unallocated) has no completion and always
//! counts as a miss.  Misses are results, not errors.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::scheduler::Schedule;
use crate::workload::WorkLoad;

// ── Per-instance result ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceLatency {
    pub flow: String,
    pub instance: u64,
    pub release: u64,
    pub deadline: u64,
    /// First slot after the last attempt; `None` when nothing was placed.
    pub completion: Option<u64>,
}

impl InstanceLatency {
    pub fn latency(&self) -> Option<u64> {
        self.completion.map(|c| c.saturating_sub(self.release))
    }

    pub fn meets_deadline(&self) -> bool {
        self.latency().is_some_and(|l| l <= self.deadline)
    }
}

/// One `(flow, instance)` that missed its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub flow: String,
    pub instance: u64,
    pub release: u64,
    pub deadline: u64,
    /// `None` for an unscheduled instance.
    pub latency: Option<u64>,
}

impl fmt::Display for DeadlineMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.latency {
            Some(latency) => write!(
                f,
                "{} instance {} (release {}): latency {} > deadline {}",
                self.flow, self.instance, self.release, latency, self.deadline
            ),
            None => write!(
                f,
                "{} instance {} (release {}): unscheduled, deadline {}",
                self.flow, self.instance, self.release, self.deadline
            ),
        }
    }
}

/// Per-flow roll-up of [`InstanceLatency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLatency {
    pub flow: String,
    pub deadline: u64,
    pub instances: u64,
    /// Largest latency over the placed instances.
    pub worst_case: Option<u64>,
    pub misses: u64,
}

// ── LatencyReport ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LatencyReport {
    instances: Vec<InstanceLatency>,
}

impl LatencyReport {
    /// Every instance, flows in workload order, instances ascending.
    pub fn instances(&self) -> &[InstanceLatency] {
        &self.instances
    }

    /// Overall verdict: every instance of every flow met its deadline.
    pub fn deadlines_met(&self) -> bool {
        self.instances.iter().all(InstanceLatency::meets_deadline)
    }

    pub fn deadline_misses(&self) -> Vec<DeadlineMiss> {
        self.instances
            .iter()
            .filter(|i| !i.meets_deadline())
            .map(|i| DeadlineMiss {
                flow: i.flow.clone(),
                instance: i.instance,
                release: i.release,
                deadline: i.deadline,
                latency: i.latency(),
            })
            .collect()
    }

    pub fn worst_case_latency(&self, flow: &str) -> Option<u64> {
        self.instances
            .iter()
            .filter(|i| i.flow == flow)
            .filter_map(InstanceLatency::latency)
            .max()
    }

    /// One entry per flow, in the order the flows first appear.
    pub fn flow_summaries(&self) -> Vec<FlowLatency> {
        let mut out: Vec<FlowLatency> = Vec::new();
        for inst in &self.instances {
            let pos = match out.iter().position(|s| s.flow == inst.flow) {
                Some(p) => p,
                None => {
                    out.push(FlowLatency {
                        flow: inst.flow.clone(),
                        deadline: inst.deadline,
                        instances: 0,
                        worst_case: None,
                        misses: 0,
                    });
                    out.len() - 1
                }
            };
            let summary = &mut out[pos];
            summary.instances += 1;
            summary.worst_case = summary.worst_case.max(inst.latency());
            if !inst.meets_deadline() {
                summary.misses += 1;
            }
        }
        out
    }
}

// ── LatencyAnalyzer ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyAnalyzer;

impl LatencyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, workload: &WorkLoad, schedule: &Schedule) -> LatencyReport {
        let hyperperiod = schedule.hyperperiod();

        // (flow, instance) → last committed slot
        let mut last_slot: HashMap<(&str, u64), u64> = HashMap::new();
        for tx in schedule.transmissions() {
            let entry = last_slot.entry((tx.flow.as_str(), tx.instance)).or_insert(tx.slot);
            *entry = (*entry).max(tx.slot);
        }

        let mut instances = Vec::new();
        for flow in workload.flows() {
            if flow.period == 0 {
                continue;
            }
            for k in 0..hyperperiod / flow.period {
                let release = flow.phase.saturating_add(k * flow.period);
                let completion = if flow.edges().is_empty() {
                    Some(release)
                } else {
                    last_slot.get(&(flow.name.as_str(), k)).map(|&s| s.saturating_add(1))
                };
                let inst = InstanceLatency {
                    flow: flow.name.clone(),
                    instance: k,
                    release,
                    deadline: flow.deadline,
                    completion,
                };
                debug!(
                    flow = %inst.flow,
                    instance = k,
                    release,
                    latency = ?inst.latency(),
                    deadline = inst.deadline,
                    "instance latency"
                );
                instances.push(inst);
            }
        }

        let report = LatencyReport { instances };
        let misses = report.deadline_misses();
        for miss in &misses {
            warn!(%miss, "deadline miss");
        }
        info!(
            instances = report.instances.len(),
            misses = misses.len(),
            deadlines_met = report.deadlines_met(),
            "latency analysis complete"
        );
        report
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reliability::ReliabilityAllocator;
    use crate::scheduler::{ScheduleSynthesizer, WindowPolicy};
    use crate::workload::fixtures;
    use crate::workload::WorkloadConfig;

    fn run(mut wl: WorkLoad, policy: WindowPolicy) -> (WorkLoad, LatencyReport) {
        ReliabilityAllocator::new().allocate_workload(&mut wl);
        let schedule = ScheduleSynthesizer::with_policy(policy)
            .synthesize(&wl)
            .unwrap();
        let report = LatencyAnalyzer::new().analyze(&wl, &schedule);
        (wl, report)
    }

    fn chain(deadline: u64) -> WorkLoad {
        let mut wl = fixtures::build(
            "chain",
            WorkloadConfig::new(0.9, 0.99),
            &[("F0", Some(20), &["A", "B", "C"])],
        );
        wl.set_flow_deadline("F0", deadline).unwrap();
        wl
    }

    #[test]
    fn latency_is_completion_minus_release() {
        let (_, report) = run(chain(20), WindowPolicy::Strict);
        let inst = &report.instances()[0];
        assert_eq!(inst.completion, Some(6));
        assert_eq!(inst.latency(), Some(6));
        assert!(report.deadlines_met());
        assert!(report.deadline_misses().is_empty());
    }

    #[test]
    fn deadline_equal_to_latency_is_met() {
        let (_, report) = run(chain(6), WindowPolicy::Strict);
        assert!(report.deadlines_met());
    }

    #[test]
    fn late_best_effort_instance_is_a_miss() {
        let (_, report) = run(chain(5), WindowPolicy::BestEffort);
        assert!(!report.deadlines_met());
        let misses = report.deadline_misses();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].latency, Some(6));
        assert_eq!(misses[0].deadline, 5);
    }

    #[test]
    fn unscheduled_instance_is_a_miss_without_latency() {
        let (_, report) = run(chain(5), WindowPolicy::Strict);
        let misses = report.deadline_misses();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].latency, None);
        assert!(misses[0].to_string().contains("unscheduled"));
    }

    #[test]
    fn one_miss_flips_the_verdict_but_all_flows_are_reported() {
        let mut wl = fixtures::build(
            "two",
            WorkloadConfig::new(0.9, 0.99),
            &[
                ("F0", Some(20), &["A", "B", "C"]),
                ("F1", Some(20), &["D", "E"]),
            ],
        );
        wl.set_flow_deadline("F0", 5).unwrap();
        let (_, report) = run(wl, WindowPolicy::BestEffort);

        assert!(!report.deadlines_met());
        assert_eq!(report.instances().len(), 2);
        let summaries = report.flow_summaries();
        assert_eq!(summaries[0].flow, "F0");
        assert_eq!(summaries[0].misses, 1);
        assert_eq!(summaries[1].flow, "F1");
        assert_eq!(summaries[1].misses, 0);
        assert_eq!(report.worst_case_latency("F1"), Some(2));
    }

    #[test]
    fn every_instance_in_the_hyperperiod_is_analyzed() {
        let (wl, report) = run(fixtures::test_flows(), WindowPolicy::BestEffort);
        let expected: u64 = wl.flows().iter().map(|f| 300 / f.period).sum();
        assert_eq!(report.instances().len() as u64, expected);
        for inst in report.instances() {
            assert!(inst.completion.is_some(), "{inst:?}");
        }
    }

    #[test]
    fn single_node_flow_completes_at_release() {
        let mut wl = fixtures::build(
            "solo",
            WorkloadConfig::new(0.9, 0.99),
            &[("F0", Some(10), &["A"])],
        );
        wl.set_flow_phase("F0", 4).unwrap();
        let (_, report) = run(wl, WindowPolicy::Strict);
        assert_eq!(report.instances()[0].completion, Some(4));
        assert_eq!(report.worst_case_latency("F0"), Some(0));
        assert!(report.deadlines_met());
    }

    #[test]
    fn worst_case_is_max_over_instances() {
        let wl = fixtures::build(
            "contend",
            WorkloadConfig::new(0.9, 0.99),
            &[
                ("F0", Some(10), &["A", "B"]),
                ("F1", Some(20), &["B", "C"]),
            ],
        );
        let (_, report) = run(wl, WindowPolicy::Strict);
        // F0: [2,0] at 0-1 and 10-11; F1 waits for B: slots 2-3
        assert_eq!(report.worst_case_latency("F0"), Some(2));
        assert_eq!(report.worst_case_latency("F1"), Some(4));
        assert_eq!(report.flow_summaries()[0].instances, 2);
    }
}
