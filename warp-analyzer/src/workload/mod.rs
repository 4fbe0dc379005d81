//! The workload: aggregate root of the flow graph.
//!
//! [`WorkLoad`] owns the node table (dense, discovery-ordered), the ordered
//! flow list and the global reliability/radio parameters.  It is built once
//! from a description and afterwards mutated only through the named
//! operations below; the allocator and synthesizer only attach derived data.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Flow collection | `Vec<Flow>` in workload order; reordering is an in-place stable sort |
//! | Node table | `Vec<Node>` indexed by discovery order + `HashMap` name → index |
//! | Predecessors | Computed from chain position, never stored |
//! | Lookups | `Result<_, WorkloadError>`; unknown names are errors, never defaults |

pub mod error;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::WorkloadError;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::flow::{Flow, Node, NodeId, DEFAULT_FAULTS_TOLERATED};
use crate::hyperperiod::{hyperperiod_of, HyperperiodInfo, DEFAULT_HYPERPERIOD_LIMIT};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Channels available when the description does not say otherwise.
pub const DEFAULT_NUM_CHANNELS: u32 = 16;

// ── WorkloadConfig ────────────────────────────────────────────────────────────

/// Global reliability and radio parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// `M`: per-attempt probability that a transmission is received, in (0, 1).
    pub min_packet_reception_rate: f64,

    /// End-to-end reliability target, in (0, 1).
    pub e2e: f64,

    /// Consecutive per-hop faults the allocation must survive.
    pub num_faults: u32,

    /// Independent channels usable in the same slot (≥ 1).
    pub num_channels: u32,
}

impl WorkloadConfig {
    /// Reliability-model configuration: no fault floor, default channel count.
    pub fn new(min_packet_reception_rate: f64, e2e: f64) -> Self {
        Self {
            min_packet_reception_rate,
            e2e,
            num_faults: DEFAULT_FAULTS_TOLERATED,
            num_channels: DEFAULT_NUM_CHANNELS,
        }
    }

    pub fn with_faults(mut self, num_faults: u32) -> Self {
        self.num_faults = num_faults;
        self
    }

    pub fn with_channels(mut self, num_channels: u32) -> Self {
        self.num_channels = num_channels;
        self
    }

    /// Range-check every parameter.
    pub fn validate(&self) -> Result<(), WorkloadError> {
        let open_unit = |name: &'static str, value: f64| {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(WorkloadError::InvalidParameter {
                    name,
                    value,
                    expected: "0 < value < 1",
                })
            }
        };
        open_unit("M", self.min_packet_reception_rate)?;
        open_unit("E2E", self.e2e)?;
        if self.num_channels == 0 {
            return Err(WorkloadError::InvalidParameter {
                name: "numChannels",
                value: 0.0,
                expected: "value >= 1",
            });
        }
        Ok(())
    }
}

// ── WorkLoad ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WorkLoad {
    name: String,
    config: WorkloadConfig,
    flows: Vec<Flow>,
    nodes: Vec<Node>,
    node_index: HashMap<String, NodeId>,
    /// Upper bound passed to [`hyperperiod_of`].
    hyperperiod_limit: u64,
}

impl WorkLoad {
    /// Create an empty workload after validating `config`.
    pub fn new(name: impl Into<String>, config: WorkloadConfig) -> Result<Self, WorkloadError> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            config,
            flows: Vec::new(),
            nodes: Vec::new(),
            node_index: HashMap::new(),
            hyperperiod_limit: DEFAULT_HYPERPERIOD_LIMIT,
        })
    }

    /// Override the hyperperiod limit (in slots).
    pub fn with_hyperperiod_limit(mut self, limit: u64) -> Self {
        self.hyperperiod_limit = limit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Replace the global parameters (e.g. CLI overrides).
    ///
    /// Allocations made under the old parameters are dropped and every
    /// flow's per-link figure goes back to `faults + 1`; rerun the allocator.
    pub fn set_config(&mut self, config: WorkloadConfig) -> Result<(), WorkloadError> {
        config.validate()?;
        for flow in &mut self.flows {
            flow.clear_allocation(config.num_faults);
        }
        self.config = config;
        Ok(())
    }

    // ── Flow access ───────────────────────────────────────────────────────────

    /// Flows in current workload order.
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flow(&self, name: &str) -> Result<&Flow, WorkloadError> {
        self.flows
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| WorkloadError::FlowNotFound(name.to_string()))
    }

    pub(crate) fn flow_mut(&mut self, name: &str) -> Result<&mut Flow, WorkloadError> {
        self.flows
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| WorkloadError::FlowNotFound(name.to_string()))
    }

    pub(crate) fn flows_mut(&mut self) -> &mut [Flow] {
        &mut self.flows
    }

    /// Flow names in current workload order.
    pub fn flow_names(&self) -> Vec<&str> {
        self.flows.iter().map(|f| f.name.as_str()).collect()
    }

    /// Flows sorted by `(priority, index)`, highest priority first.
    pub fn flows_by_priority(&self) -> Vec<&Flow> {
        let mut v: Vec<&Flow> = self.flows.iter().collect();
        v.sort_by_key(|f| f.priority_key());
        v
    }

    // ── Node access ───────────────────────────────────────────────────────────

    /// Node table in discovery order (`nodes()[i].index == i`).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Distinct node names in lexicographic order.
    pub fn node_names_ordered_alphabetically(&self) -> Vec<&str> {
        let mut names = self.node_names();
        names.sort_unstable();
        names
    }

    pub fn node_index(&self, name: &str) -> Result<NodeId, WorkloadError> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| WorkloadError::NodeNotFound(name.to_string()))
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    /// Node names of `flow_name`, source first.
    pub fn nodes_in_flow(&self, flow_name: &str) -> Result<Vec<&str>, WorkloadError> {
        let flow = self.flow(flow_name)?;
        Ok(flow
            .nodes()
            .iter()
            .map(|&id| self.nodes[id].name.as_str())
            .collect())
    }

    // ── Derived queries ───────────────────────────────────────────────────────

    /// LCM of every flow's period, in slots.
    pub fn hyper_period(&self) -> Result<u64, WorkloadError> {
        Ok(self.hyperperiod_info()?.hyperperiod)
    }

    pub fn hyperperiod_info(&self) -> Result<HyperperiodInfo, WorkloadError> {
        Ok(hyperperiod_of(
            self.flows.iter().map(|f| f.period),
            self.hyperperiod_limit,
        )?)
    }

    /// Largest node count over all flows; `0` for an empty workload.
    pub fn max_flow_length(&self) -> usize {
        self.flows.iter().map(Flow::len).max().unwrap_or(0)
    }

    // ── Per-flow parameters ───────────────────────────────────────────────────

    pub fn flow_deadline(&self, name: &str) -> Result<u64, WorkloadError> {
        Ok(self.flow(name)?.deadline)
    }

    pub fn set_flow_deadline(&mut self, name: &str, deadline: u64) -> Result<(), WorkloadError> {
        if deadline == 0 {
            return Err(WorkloadError::InvalidDeadline {
                flow: name.to_string(),
                value: deadline,
            });
        }
        self.flow_mut(name)?.deadline = deadline;
        Ok(())
    }

    pub fn flow_period(&self, name: &str) -> Result<u64, WorkloadError> {
        Ok(self.flow(name)?.period)
    }

    pub fn set_flow_period(&mut self, name: &str, period: u64) -> Result<(), WorkloadError> {
        if period == 0 {
            return Err(WorkloadError::InvalidPeriod {
                flow: name.to_string(),
                value: period,
            });
        }
        self.flow_mut(name)?.period = period;
        Ok(())
    }

    pub fn flow_phase(&self, name: &str) -> Result<u64, WorkloadError> {
        Ok(self.flow(name)?.phase)
    }

    pub fn set_flow_phase(&mut self, name: &str, phase: u64) -> Result<(), WorkloadError> {
        self.flow_mut(name)?.phase = phase;
        Ok(())
    }

    pub fn flow_priority(&self, name: &str) -> Result<u32, WorkloadError> {
        Ok(self.flow(name)?.priority)
    }

    pub fn set_flow_priority(&mut self, name: &str, priority: u32) -> Result<(), WorkloadError> {
        self.flow_mut(name)?.priority = priority;
        Ok(())
    }

    // ── Transmission figures ──────────────────────────────────────────────────

    /// Worst-case end-to-end transmission cost of the flow, in slots.
    ///
    /// `0` until the reliability allocator has run.
    pub fn total_tx_attempts_in_flow(&self, name: &str) -> Result<u32, WorkloadError> {
        Ok(self.flow(name)?.total_cost())
    }

    /// Per-hop attempt vector (sink entry `0`); empty until allocated.
    pub fn num_tx_attempts_per_link(&self, name: &str) -> Result<Vec<u32>, WorkloadError> {
        Ok(self.flow(name)?.link_tx().to_vec())
    }

    /// The flow's scalar attempts-per-link figure.
    pub fn flow_tx_attempts_per_link(&self, name: &str) -> Result<u32, WorkloadError> {
        Ok(self.flow(name)?.num_tx_per_link)
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Append a new, empty flow with default timing.
    pub fn add_flow(&mut self, name: &str) -> Result<(), WorkloadError> {
        if self.flows.iter().any(|f| f.name == name) {
            return Err(WorkloadError::DuplicateFlow(name.to_string()));
        }
        let index = self.flows.len();
        self.flows
            .push(Flow::new(name, index, self.config.num_faults));
        debug!(flow = name, index, "flow added");
        Ok(())
    }

    /// Append `node_name` to the end of `flow_name`'s chain, registering the
    /// node on first sight.  Returns the node's index.
    pub fn add_node_to_flow(
        &mut self,
        flow_name: &str,
        node_name: &str,
    ) -> Result<NodeId, WorkloadError> {
        let flow_pos = self
            .flows
            .iter()
            .position(|f| f.name == flow_name)
            .ok_or_else(|| WorkloadError::FlowNotFound(flow_name.to_string()))?;

        if let Some(&id) = self.node_index.get(node_name) {
            if self.flows[flow_pos].contains(id) {
                return Err(WorkloadError::DuplicateNodeInFlow {
                    flow: flow_name.to_string(),
                    node: node_name.to_string(),
                });
            }
        }

        let id = self.register_node(node_name);
        self.flows[flow_pos].push_node(id);
        Ok(id)
    }

    fn register_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.node_index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            index: id,
        });
        self.node_index.insert(name.to_string(), id);
        debug!(node = name, index = id, "node registered");
        id
    }

    /// Rate-monotonic priority assignment.
    ///
    /// Stable-sorts the flows by `(period, index)` and rewrites every flow's
    /// priority to its new position, so shorter periods run first.
    pub fn set_flows_in_rm_order(&mut self) {
        self.flows.sort_by_key(|f| (f.period, f.index));
        for (pos, flow) in self.flows.iter_mut().enumerate() {
            flow.priority = pos as u32;
        }
        info!(order = ?self.flow_names(), "flows set in rate-monotonic order");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    /// Structural checks run before analysis.
    pub fn validate(&self) -> Result<(), WorkloadError> {
        self.config.validate()?;
        if self.flows.is_empty() {
            return Err(WorkloadError::NoFlows);
        }
        for flow in &self.flows {
            if flow.is_empty() {
                return Err(WorkloadError::EmptyFlow(flow.name.clone()));
            }
            if flow.period == 0 {
                return Err(WorkloadError::InvalidPeriod {
                    flow: flow.name.clone(),
                    value: flow.period,
                });
            }
            if flow.deadline == 0 {
                return Err(WorkloadError::InvalidDeadline {
                    flow: flow.name.clone(),
                    value: flow.deadline,
                });
            }
            if flow.phase >= flow.period {
                return Err(WorkloadError::InvalidPhase {
                    flow: flow.name.clone(),
                    phase: flow.phase,
                    period: flow.period,
                });
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use crate::reliability::ReliabilityAllocator;

    // ── construction ──────────────────────────────────────────────────────────

    #[test]
    fn config_out_of_range_is_rejected() {
        for (m, e2e) in [(0.0, 0.99), (1.0, 0.99), (0.9, 0.0), (0.9, 1.5)] {
            let err = WorkLoad::new("w", WorkloadConfig::new(m, e2e)).unwrap_err();
            assert!(matches!(err, WorkloadError::InvalidParameter { .. }));
        }
        let err = WorkLoad::new("w", WorkloadConfig::new(0.9, 0.99).with_channels(0)).unwrap_err();
        assert!(matches!(
            err,
            WorkloadError::InvalidParameter {
                name: "numChannels",
                ..
            }
        ));
    }

    // ── flow_names ────────────────────────────────────────────────────────────

    #[test]
    fn flow_names_multiple_flows() {
        let wl = fixtures::test_flows();
        assert_eq!(wl.flow_names(), vec!["F1", "F5", "F2", "F4", "F3", "F6"]);
    }

    #[test]
    fn flow_names_one_flow() {
        assert_eq!(fixtures::one_flow().flow_names(), vec!["F3"]);
    }

    // ── node_index ────────────────────────────────────────────────────────────

    #[test]
    fn node_index_follows_discovery_order() {
        let wl = fixtures::test_indexes();
        let expected = [("A", 3), ("B", 0), ("C", 1), ("D", 2), ("E", 4)];
        for (name, index) in expected {
            assert_eq!(wl.node_index(name).unwrap(), index, "node {name}");
        }
    }

    #[test]
    fn node_index_one_flow_is_dense() {
        let wl = fixtures::one_flow();
        for (i, name) in ["C", "D", "E", "J", "K", "L"].iter().enumerate() {
            assert_eq!(wl.node_index(name).unwrap(), i);
        }
    }

    #[test]
    fn unknown_node_is_a_lookup_error() {
        let err = fixtures::one_flow().node_index("Q").unwrap_err();
        assert_eq!(err, WorkloadError::NodeNotFound("Q".into()));
        assert!(err.is_lookup());
    }

    #[test]
    fn unknown_flow_is_a_lookup_error() {
        let wl = fixtures::one_flow();
        assert_eq!(
            wl.flow_deadline("F99").unwrap_err(),
            WorkloadError::FlowNotFound("F99".into())
        );
        assert!(wl.nodes_in_flow("F99").is_err());
        assert!(wl.total_tx_attempts_in_flow("F99").is_err());
    }

    // ── nodes_in_flow ─────────────────────────────────────────────────────────

    #[test]
    fn nodes_in_flow_multiple_flows() {
        let wl = fixtures::test_indexes();
        let all: Vec<&str> = wl
            .flow_names()
            .into_iter()
            .flat_map(|f| wl.nodes_in_flow(f).unwrap())
            .collect();
        assert_eq!(all, vec!["B", "C", "D", "A", "B", "C", "D", "E"]);
    }

    #[test]
    fn nodes_in_flow_one_flow() {
        let wl = fixtures::one_flow();
        assert_eq!(
            wl.nodes_in_flow("F3").unwrap(),
            vec!["C", "D", "E", "J", "K", "L"]
        );
    }

    // ── hyper_period ──────────────────────────────────────────────────────────

    #[test]
    fn hyper_period_multiple_flows() {
        assert_eq!(fixtures::test_flows().hyper_period().unwrap(), 300);
    }

    #[test]
    fn hyper_period_one_flow() {
        assert_eq!(fixtures::one_flow().hyper_period().unwrap(), 50);
    }

    #[test]
    fn hyper_period_respects_limit() {
        let wl = fixtures::test_flows().with_hyperperiod_limit(100);
        assert!(matches!(
            wl.hyper_period(),
            Err(WorkloadError::Hyperperiod(_))
        ));
    }

    // ── max_flow_length ───────────────────────────────────────────────────────

    #[test]
    fn max_flow_length_values() {
        assert_eq!(fixtures::test_flows().max_flow_length(), 8);
        assert_eq!(fixtures::one_flow().max_flow_length(), 6);
    }

    #[test]
    fn max_flow_length_leaves_flows_untouched() {
        let wl = fixtures::test_flows();
        let _ = wl.max_flow_length();
        let sizes: Vec<usize> = wl.flows().iter().map(Flow::len).collect();
        assert_eq!(sizes, vec![3, 3, 7, 6, 8, 5]);
        assert_eq!(wl.flow_names(), vec!["F1", "F5", "F2", "F4", "F3", "F6"]);
    }

    // ── deadlines ─────────────────────────────────────────────────────────────

    #[test]
    fn flow_deadlines_multiple_flows() {
        let wl = fixtures::test_flows();
        let deadlines: Vec<u64> = wl
            .flow_names()
            .into_iter()
            .map(|f| wl.flow_deadline(f).unwrap())
            .collect();
        assert_eq!(deadlines, vec![20, 75, 50, 75, 50, 75]);
    }

    #[test]
    fn set_flow_deadline_changes_only_the_deadline() {
        let mut wl = fixtures::one_flow();
        let before = wl.flow("F3").unwrap().clone();

        wl.set_flow_deadline("F3", 1).unwrap();

        let after = wl.flow("F3").unwrap();
        assert_eq!(after.deadline, 1);
        assert_eq!(after.name, before.name);
        assert_eq!(after.nodes(), before.nodes());
        assert_eq!(after.edges(), before.edges());
        assert_eq!(wl.flow_names(), vec!["F3"]);
        assert_eq!(
            wl.nodes_in_flow("F3").unwrap(),
            vec!["C", "D", "E", "J", "K", "L"]
        );
    }

    #[test]
    fn zero_deadline_and_period_are_rejected() {
        let mut wl = fixtures::one_flow();
        assert!(matches!(
            wl.set_flow_deadline("F3", 0),
            Err(WorkloadError::InvalidDeadline { .. })
        ));
        assert!(matches!(
            wl.set_flow_period("F3", 0),
            Err(WorkloadError::InvalidPeriod { .. })
        ));
        assert_eq!(wl.flow_deadline("F3").unwrap(), 50);
        assert_eq!(wl.flow_period("F3").unwrap(), 50);
    }

    #[test]
    fn phase_round_trips() {
        let mut wl = fixtures::one_flow();
        assert_eq!(wl.flow_phase("F3").unwrap(), 0);
        wl.set_flow_phase("F3", 7).unwrap();
        assert_eq!(wl.flow_phase("F3").unwrap(), 7);
    }

    #[test]
    fn phase_at_or_beyond_period_fails_validation() {
        let mut wl = fixtures::one_flow();
        let period = wl.flow_period("F3").unwrap();
        wl.set_flow_phase("F3", period - 1).unwrap();
        wl.validate().unwrap();

        wl.set_flow_phase("F3", u64::MAX).unwrap();
        assert_eq!(
            wl.validate().unwrap_err(),
            WorkloadError::InvalidPhase {
                flow: "F3".into(),
                phase: u64::MAX,
                period,
            }
        );
    }

    // ── set_config ────────────────────────────────────────────────────────────

    #[test]
    fn set_config_resets_per_link_figure_to_new_fault_default() {
        let mut wl = fixtures::one_flow();
        assert_eq!(wl.flow_tx_attempts_per_link("F3").unwrap(), 1);

        let config = wl.config().clone().with_faults(2);
        wl.set_config(config).unwrap();
        assert_eq!(wl.flow_tx_attempts_per_link("F3").unwrap(), 3);
    }

    #[test]
    fn set_config_drops_stale_allocations() {
        let mut wl = fixtures::one_flow();
        assert!(ReliabilityAllocator::new().allocate_workload(&mut wl).is_empty());
        assert!(!wl.num_tx_attempts_per_link("F3").unwrap().is_empty());

        wl.set_config(WorkloadConfig::new(0.5, 0.999)).unwrap();
        assert!(wl.num_tx_attempts_per_link("F3").unwrap().is_empty());
        assert_eq!(wl.total_tx_attempts_in_flow("F3").unwrap(), 0);
        assert_eq!(wl.flow_tx_attempts_per_link("F3").unwrap(), 1);
    }

    #[test]
    fn rejected_config_leaves_allocations_alone() {
        let mut wl = fixtures::one_flow();
        assert!(ReliabilityAllocator::new().allocate_workload(&mut wl).is_empty());
        let before = wl.num_tx_attempts_per_link("F3").unwrap();

        assert!(wl.set_config(WorkloadConfig::new(1.5, 0.99)).is_err());
        assert_eq!(wl.num_tx_attempts_per_link("F3").unwrap(), before);
    }

    // ── add_flow / add_node_to_flow ───────────────────────────────────────────

    #[test]
    fn add_flow_appends_in_order() {
        let mut wl = fixtures::example4();
        wl.add_flow("F10").unwrap();
        assert_eq!(wl.flow_names(), vec!["F0", "F1", "F10"]);
        let added = wl.flow("F10").unwrap();
        assert_eq!(added.index, 2);
        assert_eq!(added.priority, 2);
        assert_eq!(added.period, crate::flow::DEFAULT_PERIOD);
    }

    #[test]
    fn add_flow_rejects_duplicates() {
        let mut wl = fixtures::example4();
        assert_eq!(
            wl.add_flow("F0").unwrap_err(),
            WorkloadError::DuplicateFlow("F0".into())
        );
        assert_eq!(wl.flows().len(), 2);
    }

    #[test]
    fn add_node_to_flow_appends_to_that_flow_only() {
        let mut wl = fixtures::example4();
        wl.add_node_to_flow("F1", "D").unwrap();
        let all: Vec<&str> = wl
            .flow_names()
            .into_iter()
            .flat_map(|f| wl.nodes_in_flow(f).unwrap())
            .collect();
        assert_eq!(all, vec!["A", "B", "C", "D", "C", "B", "A", "D"]);

        let f1 = wl.flow("F1").unwrap();
        assert_eq!(f1.edges().len(), 3);
        let d = wl.node_index("D").unwrap();
        assert_eq!(f1.edges().last().map(|e| e.dst), Some(d));
    }

    #[test]
    fn add_node_registers_new_nodes_densely() {
        let mut wl = fixtures::example4();
        let id = wl.add_node_to_flow("F1", "Z").unwrap();
        assert_eq!(id, 4);
        assert_eq!(wl.node_names(), vec!["A", "B", "C", "D", "Z"]);
    }

    #[test]
    fn add_node_rejects_repeat_within_flow() {
        let mut wl = fixtures::example4();
        assert!(matches!(
            wl.add_node_to_flow("F1", "B"),
            Err(WorkloadError::DuplicateNodeInFlow { .. })
        ));
        assert_eq!(wl.nodes_in_flow("F1").unwrap(), vec!["C", "B", "A"]);
    }

    #[test]
    fn add_node_to_unknown_flow_fails() {
        let mut wl = fixtures::example4();
        assert_eq!(
            wl.add_node_to_flow("F9", "A").unwrap_err(),
            WorkloadError::FlowNotFound("F9".into())
        );
    }

    // ── priorities ────────────────────────────────────────────────────────────

    #[test]
    fn default_priorities_follow_insertion() {
        let wl = fixtures::example4();
        let prios: Vec<u32> = wl
            .flow_names()
            .into_iter()
            .map(|f| wl.flow_priority(f).unwrap())
            .collect();
        assert_eq!(prios, vec![0, 1]);
        assert_eq!(fixtures::long_chain().flow_priority("F0").unwrap(), 0);
    }

    #[test]
    fn set_flow_priority_changes_processing_order() {
        let mut wl = fixtures::example4();
        wl.set_flow_priority("F0", 10).unwrap();
        assert_eq!(wl.flow_priority("F0").unwrap(), 10);
        let order: Vec<&str> = wl
            .flows_by_priority()
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(order, vec!["F1", "F0"]);
        // workload order itself is untouched
        assert_eq!(wl.flow_names(), vec!["F0", "F1"]);
    }

    #[test]
    fn rm_order_sorts_by_period_then_index() {
        let mut wl = fixtures::example2();
        wl.set_flows_in_rm_order();
        assert_eq!(
            wl.flow_names(),
            vec!["F0", "F2", "F1", "F3", "F4", "F5"]
        );
        let prios: Vec<u32> = wl.flows().iter().map(|f| f.priority).collect();
        assert_eq!(prios, vec![0, 1, 2, 3, 4, 5]);
    }

    // ── alphabetical listing ──────────────────────────────────────────────────

    #[test]
    fn alphabetical_listing_is_independent_of_discovery() {
        let wl = fixtures::example();
        assert_eq!(wl.node_names(), vec!["C", "B", "A"]);
        assert_eq!(wl.node_names_ordered_alphabetically(), vec!["A", "B", "C"]);
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn validate_rejects_empty_flow() {
        let mut wl = fixtures::example4();
        wl.add_flow("F2").unwrap();
        assert_eq!(
            wl.validate().unwrap_err(),
            WorkloadError::EmptyFlow("F2".into())
        );
    }

    #[test]
    fn validate_rejects_empty_workload() {
        let wl = WorkLoad::new("empty", WorkloadConfig::new(0.9, 0.99)).unwrap();
        assert_eq!(wl.validate().unwrap_err(), WorkloadError::NoFlows);
    }

    #[test]
    fn fixtures_validate() {
        for wl in [
            fixtures::test_flows(),
            fixtures::one_flow(),
            fixtures::test_indexes(),
            fixtures::example(),
            fixtures::example2(),
            fixtures::example4(),
            fixtures::long_chain(),
        ] {
            wl.validate().unwrap();
        }
    }
}
