/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core flow data structures.
//!
//! ```text
//! description ──►  WorkLoad { nodes, flows }  ──(allocator)──►  Flow.link_tx
//!                        │                                          │
//!                        └────────────(synthesizer)◄────────────────┘
//! ```
//!
//! # Ownership model
//! Nodes live once in the [`WorkLoad`](crate::workload::WorkLoad) node table and
//! are referenced by every flow through their dense discovery index
//! ([`NodeId`]).  Edges are owned by exactly one flow.  Neither carries a
//! back-pointer: the predecessor of element `i` in a flow's chain is element
//! `i - 1`, see [`Flow::node_predecessor`] and [`Flow::edge_predecessor`].

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Period assigned to a flow that does not specify one.
pub const DEFAULT_PERIOD: u64 = 100;

/// Relative deadline assigned to a flow that does not specify one.
pub const DEFAULT_DEADLINE: u64 = 100;

/// Release offset assigned to a flow that does not specify one.
pub const DEFAULT_PHASE: u64 = 0;

/// Faults tolerated when the workload does not configure a fault model.
pub const DEFAULT_FAULTS_TOLERATED: u32 = 0;

/// Dense node index, assigned in first-discovery order starting at 0.
pub type NodeId = usize;

// ── Node ──────────────────────────────────────────────────────────────────────

/// A network endpoint registered in the workload's node table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub index: NodeId,
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// One directed hop `src → dst` inside a single flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
}

impl Edge {
    /// Returns `true` if `node` is the sender or receiver of this hop.
    pub fn touches(&self, node: NodeId) -> bool {
        self.src == node || self.dst == node
    }
}

// ── Allocation ────────────────────────────────────────────────────────────────

/// Per-flow output of the reliability allocator.
///
/// Stored on the flow once computed; the synthesizer and reports only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Minimum attempts on the hop leaving node `i`.  Same length as the
    /// flow's node list; the final (sink) entry is always `0`.
    pub link_tx: Vec<u32>,

    /// Worst-case end-to-end cost in slots when the hops are pipelined.
    pub total_cost: u32,

    /// Uniform per-link attempt figure.
    pub num_tx_per_link: u32,

    /// Probability that a packet reaches the sink within `total_cost` slots.
    pub e2e_reliability: f64,
}

// ── Flow ──────────────────────────────────────────────────────────────────────

/// One periodic end-to-end traffic requirement.
///
/// The node and edge lists are private so the invariant
/// `edges.len() == nodes.len() - 1` cannot be broken from outside; nodes are
/// appended through [`WorkLoad::add_node_to_flow`](crate::workload::WorkLoad::add_node_to_flow).
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    // ── Identity ──────────────────────────────────────────────────────────────
    /// Unique flow name within a workload.
    pub name: String,

    /// Order in which the flow was added.  Secondary sort key everywhere.
    pub index: usize,

    // ── Scheduling parameters ─────────────────────────────────────────────────
    /// Fixed priority; lower value = higher priority.
    pub priority: u32,

    /// Release period in slots.
    pub period: u64,

    /// Relative deadline in slots.
    pub deadline: u64,

    /// Offset of the first release, in slots.
    pub phase: u64,

    /// Scalar attempts-per-link figure.  `faults + 1` until the allocator runs.
    pub num_tx_per_link: u32,

    // ── Topology ──────────────────────────────────────────────────────────────
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,

    // ── Derived (filled by the allocator) ─────────────────────────────────────
    allocation: Option<Allocation>,
}

impl Flow {
    /// New flow with default timing; its priority is its insertion index.
    pub fn new(name: impl Into<String>, index: usize, num_faults: u32) -> Self {
        Self {
            name: name.into(),
            index,
            priority: index as u32,
            period: DEFAULT_PERIOD,
            deadline: DEFAULT_DEADLINE,
            phase: DEFAULT_PHASE,
            num_tx_per_link: num_faults + 1,
            nodes: Vec::new(),
            edges: Vec::new(),
            allocation: None,
        }
    }

    /// Node chain, source first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Hops in chain order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes in the chain.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn sink(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Node immediately before position `i` in this flow's chain.
    pub fn node_predecessor(&self, i: usize) -> Option<NodeId> {
        i.checked_sub(1).and_then(|p| self.nodes.get(p).copied())
    }

    /// Hop immediately before hop `i` in this flow's chain.
    pub fn edge_predecessor(&self, i: usize) -> Option<Edge> {
        i.checked_sub(1).and_then(|p| self.edges.get(p).copied())
    }

    /// Append a node and, unless it is the first, the trailing hop into it.
    pub(crate) fn push_node(&mut self, node: NodeId) {
        if let Some(prev) = self.sink() {
            self.edges.push(Edge {
                src: prev,
                dst: node,
            });
        }
        self.nodes.push(node);
    }

    // ── Allocation ────────────────────────────────────────────────────────────

    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }

    /// Attach the allocator's result and adopt its scalar per-link figure.
    pub fn set_allocation(&mut self, allocation: Allocation) {
        debug_assert_eq!(allocation.link_tx.len(), self.nodes.len());
        self.num_tx_per_link = allocation.num_tx_per_link;
        self.allocation = Some(allocation);
    }

    /// Drop the allocation and fall back to the `faults + 1` per-link figure.
    pub fn clear_allocation(&mut self, num_faults: u32) {
        self.num_tx_per_link = num_faults + 1;
        self.allocation = None;
    }

    /// Per-hop attempt vector (`[]` before allocation).
    pub fn link_tx(&self) -> &[u32] {
        self.allocation
            .as_ref()
            .map(|a| a.link_tx.as_slice())
            .unwrap_or(&[])
    }

    /// Worst-case end-to-end cost in slots (`0` before allocation).
    pub fn total_cost(&self) -> u32 {
        self.allocation.as_ref().map(|a| a.total_cost).unwrap_or(0)
    }

    /// Sum of the non-sink entries of the per-hop vector: the number of slots
    /// one instance occupies when hops are scheduled back to back.
    pub fn attempt_sum(&self) -> u32 {
        self.link_tx().iter().sum()
    }

    /// Sort key for fixed-priority processing: `(priority, index)`.
    ///
    /// Two flows never compare equal because `index` is unique.
    pub fn priority_key(&self) -> (u32, usize) {
        (self.priority, self.index)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
