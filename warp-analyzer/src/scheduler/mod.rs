//! Slot schedule synthesis for WARP flows.
//!
//! [`ScheduleSynthesizer`] places every hop attempt of every flow instance in
//! one hyperperiod into a slot × node table.  The result is a [`Schedule`]:
//! the table itself, the committed [`Transmission`]s in absolute time, and
//! the [`SchedulingFailure`]s of instances that could not be placed.
//!
//! # Placement rules
//!
//! | Rule | How it is enforced |
//! |---|---|
//! | Priority | Flows visited in `(priority, index)` order; a placement is never revisited |
//! | Attempt budget | Hop `i` gets exactly `link_tx[i]` slots |
//! | Node exclusivity | A node is sender *or* receiver of at most one transmission per slot |
//! | Channels | At most `numChannels` transmissions per slot, each on the lowest free channel |
//! | Hop order | Hop `i+1` starts one slot after hop `i`'s last attempt |
//! | Window | All attempts inside `[release, release + window)`; see [`WindowPolicy`] |
//!
//! The table wraps modulo the hyperperiod: a window crossing the end of the
//! hyperperiod continues at slot 0, which is where the next repetition of
//! the schedule would put it.
//!
//! # Example
//! ```rust,ignore
//! ReliabilityAllocator::new().allocate_workload(&mut workload);
//! let schedule = ScheduleSynthesizer::new().synthesize(&workload)?;
//! for failure in schedule.failures() { println!("{failure}"); }
//! ```

pub mod error;
pub mod feasibility;

pub use error::{SchedulerError, SchedulingFailure};

use tracing::{debug, info, warn};

use crate::flow::{Flow, NodeId};
use crate::workload::WorkLoad;

use feasibility::{check_channel_demand, overloaded_nodes};

/// Name printed in report headers.
pub const SCHEDULER_NAME: &str = "Priority";

/// Largest schedule table (`hyperperiod × nodes` cells) built by default.
pub const DEFAULT_TABLE_CELL_LIMIT: u64 = 1 << 25;

// ── Policy ────────────────────────────────────────────────────────────────────

/// Width of the window an instance must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// `[release, release + min(deadline, H))`.  Anything that does not fit
    /// is a [`SchedulingFailure`].
    #[default]
    Strict,
    /// `[release, release + H)`.  Late placements are kept and show up as
    /// deadline misses in the latency analysis.
    BestEffort,
}

// ── Table types ───────────────────────────────────────────────────────────────

/// Which side of a transmission a node is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

/// What a node's radio is doing in one slot: a view of the transmission
/// occupying the cell, seen from that node's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant<'a> {
    pub flow: &'a str,
    pub instance: u64,
    pub hop: usize,
    pub attempt: u32,
    pub channel: u32,
    pub src: NodeId,
    pub dst: NodeId,
    pub role: Role,
}

/// One committed transmission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    pub flow: String,
    pub instance: u64,
    pub hop: usize,
    /// 0-based attempt number within the hop.
    pub attempt: u32,
    pub src: NodeId,
    pub dst: NodeId,
    /// Absolute slot, counted from the start of the hyperperiod; may exceed
    /// the hyperperiod when a window wraps.
    pub slot: u64,
    pub channel: u32,
}

impl Transmission {
    fn occupant(&self, node: NodeId) -> Occupant<'_> {
        Occupant {
            flow: &self.flow,
            instance: self.instance,
            hop: self.hop,
            attempt: self.attempt,
            channel: self.channel,
            src: self.src,
            dst: self.dst,
            role: if node == self.src {
                Role::Sender
            } else {
                Role::Receiver
            },
        }
    }
}

/// Slot × node occupancy grid for one hyperperiod, plus channel usage.
///
/// The table owns the committed transmissions; a cell only stores the
/// index of the transmission occupying it.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    hyperperiod: u64,
    node_count: usize,
    num_channels: u32,
    /// Slot-major: `cells[slot * node_count + node]`.
    cells: Vec<Option<u32>>,
    /// Slot-major: `channels[slot * num_channels + channel]`.
    channels: Vec<bool>,
    transmissions: Vec<Transmission>,
}

impl ScheduleTable {
    pub fn new(hyperperiod: u64, node_count: usize, num_channels: u32) -> Self {
        let slots = hyperperiod as usize;
        Self {
            hyperperiod,
            node_count,
            num_channels,
            cells: vec![None; slots * node_count],
            channels: vec![false; slots * num_channels as usize],
            transmissions: Vec::new(),
        }
    }

    pub fn hyperperiod(&self) -> u64 {
        self.hyperperiod
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn num_channels(&self) -> u32 {
        self.num_channels
    }

    /// Every committed attempt, in placement order.
    pub fn transmissions(&self) -> &[Transmission] {
        &self.transmissions
    }

    fn cell_index(&self, slot: u64, node: NodeId) -> usize {
        (slot % self.hyperperiod) as usize * self.node_count + node
    }

    fn channel_index(&self, slot: u64, channel: u32) -> usize {
        (slot % self.hyperperiod) as usize * self.num_channels as usize + channel as usize
    }

    /// Occupant of `node` in `slot` (taken modulo the hyperperiod).
    pub fn cell(&self, slot: u64, node: NodeId) -> Option<Occupant<'_>> {
        if node >= self.node_count {
            return None;
        }
        let idx = self.cells[self.cell_index(slot, node)]?;
        self.transmissions
            .get(idx as usize)
            .map(|tx| tx.occupant(node))
    }

    /// All nodes' cells in `slot`, indexed by [`NodeId`].
    pub fn row(&self, slot: u64) -> Vec<Option<Occupant<'_>>> {
        (0..self.node_count).map(|node| self.cell(slot, node)).collect()
    }

    pub fn is_node_idle(&self, slot: u64, node: NodeId) -> bool {
        self.cells[self.cell_index(slot, node)].is_none()
    }

    /// Lowest free channel in `slot`.
    pub fn free_channel(&self, slot: u64) -> Option<u32> {
        (0..self.num_channels).find(|&ch| !self.channels[self.channel_index(slot, ch)])
    }

    /// Transmissions sharing `slot`.
    pub fn channels_in_use(&self, slot: u64) -> u32 {
        (0..self.num_channels)
            .filter(|&ch| self.channels[self.channel_index(slot, ch)])
            .count() as u32
    }

    /// Slots with at least one transmission.
    pub fn busy_slots(&self) -> u64 {
        (0..self.hyperperiod)
            .filter(|&s| self.channels_in_use(s) > 0)
            .count() as u64
    }

    fn occupy(&mut self, tx: Transmission) {
        let idx = self.transmissions.len() as u32;
        let src = self.cell_index(tx.slot, tx.src);
        let dst = self.cell_index(tx.slot, tx.dst);
        let ch = self.channel_index(tx.slot, tx.channel);
        self.cells[src] = Some(idx);
        self.cells[dst] = Some(idx);
        self.channels[ch] = true;
        self.transmissions.push(tx);
    }

    /// Undo every placement made after the first `len` transmissions.
    fn truncate(&mut self, len: usize) {
        for tx in self.transmissions.split_off(len) {
            let src = self.cell_index(tx.slot, tx.src);
            let dst = self.cell_index(tx.slot, tx.dst);
            let ch = self.channel_index(tx.slot, tx.channel);
            self.cells[src] = None;
            self.cells[dst] = None;
            self.channels[ch] = false;
        }
    }
}

// ── Schedule ──────────────────────────────────────────────────────────────────

/// Output of [`ScheduleSynthesizer::synthesize`].
#[derive(Debug, Clone)]
pub struct Schedule {
    policy: WindowPolicy,
    table: ScheduleTable,
    failures: Vec<SchedulingFailure>,
}

impl Schedule {
    pub fn hyperperiod(&self) -> u64 {
        self.table.hyperperiod()
    }

    pub fn num_channels(&self) -> u32 {
        self.table.num_channels()
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn table(&self) -> &ScheduleTable {
        &self.table
    }

    /// Every committed attempt, in placement order.
    pub fn transmissions(&self) -> &[Transmission] {
        self.table.transmissions()
    }

    pub fn failures(&self) -> &[SchedulingFailure] {
        &self.failures
    }

    /// `true` when every instance of every flow was placed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Attempts committed for one flow instance.
    pub fn transmissions_for<'a>(
        &'a self,
        flow: &'a str,
        instance: u64,
    ) -> impl Iterator<Item = &'a Transmission> + 'a {
        self.transmissions()
            .iter()
            .filter(move |t| t.flow == flow && t.instance == instance)
    }
}

// ── ScheduleSynthesizer ───────────────────────────────────────────────────────

/// Fixed-priority, non-preemptive slot allocator.
///
/// Stateless apart from its window policy; all per-run state lives inside
/// `synthesize()`.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSynthesizer {
    policy: WindowPolicy,
    cell_limit: u64,
}

impl Default for ScheduleSynthesizer {
    fn default() -> Self {
        Self {
            policy: WindowPolicy::default(),
            cell_limit: DEFAULT_TABLE_CELL_LIMIT,
        }
    }
}

impl ScheduleSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: WindowPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Override the largest `hyperperiod × nodes` table `synthesize()` will
    /// allocate.  Capped at `u32::MAX` cells.
    pub fn with_cell_limit(mut self, cell_limit: u64) -> Self {
        self.cell_limit = cell_limit;
        self
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn cell_limit(&self) -> u64 {
        self.cell_limit
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Build the schedule for one hyperperiod of `workload`.
    ///
    /// Flows must already carry their reliability allocation; flows without
    /// one are reported as [`SchedulingFailure::Unallocated`].
    ///
    /// # Errors
    /// Only when the table cannot be built: no flows, no channels, no
    /// usable hyperperiod, or a table over the cell limit.  Placement problems never abort the run.
    pub fn synthesize(&self, workload: &WorkLoad) -> Result<Schedule, SchedulerError> {
        // ── Preconditions ─────────────────────────────────────────────────────
        if workload.flows().is_empty() {
            return Err(SchedulerError::NoFlows);
        }
        let num_channels = workload.config().num_channels;
        if num_channels == 0 {
            return Err(SchedulerError::NoChannels);
        }
        let info = workload.hyperperiod_info()?;
        let hyperperiod = info.hyperperiod;

        info!(
            policy = ?self.policy,
            flow_count = workload.flows().len(),
            node_count = workload.nodes().len(),
            hyperperiod,
            num_channels,
            "=== ScheduleSynthesizer::synthesize() ==="
        );

        let node_count = workload.nodes().len();
        let cells = hyperperiod.saturating_mul(node_count as u64);
        let cell_limit = self.cell_limit.min(u64::from(u32::MAX));
        if cells > cell_limit {
            return Err(SchedulerError::TableTooLarge {
                hyperperiod,
                node_count,
                cells,
                limit: cell_limit,
            });
        }

        let mut table = ScheduleTable::new(hyperperiod, node_count, num_channels);
        let mut failures = Vec::new();

        // ── Priority loop ─────────────────────────────────────────────────────
        for flow in workload.flows_by_priority() {
            if flow.allocation().is_none() {
                warn!(flow = %flow.name, "✗ flow has no allocation, skipped");
                failures.push(SchedulingFailure::Unallocated {
                    flow: flow.name.clone(),
                });
                continue;
            }

            for instance in 0..info.instances_of(flow.period) {
                let release = flow.phase.saturating_add(instance * flow.period);
                let window_end = release.saturating_add(self.window_len(flow, hyperperiod));

                match Self::place_instance(workload, &mut table, flow, instance, release, window_end)
                {
                    Ok(attempts) => {
                        debug!(
                            flow = %flow.name,
                            instance,
                            release,
                            attempts,
                            last = table.transmissions().last().map(|t| t.slot),
                            "✓ instance placed"
                        );
                    }
                    Err(failure) => {
                        warn!(%failure, "✗ instance not placed");
                        failures.push(failure);
                    }
                }
            }
        }

        // ── Post-schedule: demand warning ─────────────────────────────────────
        Self::run_demand_check(workload);

        let schedule = Schedule {
            policy: self.policy,
            table,
            failures,
        };

        info!(
            transmissions = schedule.transmissions().len(),
            busy_slots = schedule.table.busy_slots(),
            failures = schedule.failures.len(),
            "=== Synthesis complete ==="
        );

        Ok(schedule)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Placement
    // ─────────────────────────────────────────────────────────────────────────

    fn window_len(&self, flow: &Flow, hyperperiod: u64) -> u64 {
        match self.policy {
            WindowPolicy::Strict => flow.deadline.min(hyperperiod),
            WindowPolicy::BestEffort => hyperperiod,
        }
    }

    /// Place every hop of one instance, committing as it goes.  Returns the
    /// number of attempts placed; on failure the instance's attempts are
    /// removed from the table again.
    fn place_instance(
        workload: &WorkLoad,
        table: &mut ScheduleTable,
        flow: &Flow,
        instance: u64,
        release: u64,
        window_end: u64,
    ) -> Result<usize, SchedulingFailure> {
        let link_tx = flow.link_tx();
        let base = table.transmissions().len();
        let mut cursor = release;

        for (hop, edge) in flow.edges().iter().enumerate() {
            let required = link_tx.get(hop).copied().unwrap_or(0);
            let mut got = 0u32;
            let mut slot = cursor;

            while got < required && slot < window_end {
                if table.is_node_idle(slot, edge.src) && table.is_node_idle(slot, edge.dst) {
                    if let Some(channel) = table.free_channel(slot) {
                        let tx = Transmission {
                            flow: flow.name.clone(),
                            instance,
                            hop,
                            attempt: got,
                            src: edge.src,
                            dst: edge.dst,
                            slot,
                            channel,
                        };
                        table.occupy(tx);
                        got += 1;
                    }
                }
                slot += 1;
            }

            if got < required {
                table.truncate(base);
                return Err(SchedulingFailure::WindowExhausted {
                    flow: flow.name.clone(),
                    instance,
                    hop,
                    src: workload.node_name(edge.src).unwrap_or_default().to_string(),
                    dst: workload.node_name(edge.dst).unwrap_or_default().to_string(),
                    release,
                    window_end,
                    placed: got,
                    required,
                });
            }

            if let Some(last) = table.transmissions()[base..].last() {
                cursor = last.slot + 1;
            }
        }

        Ok(table.transmissions().len() - base)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Post-schedule helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn run_demand_check(workload: &WorkLoad) {
        let num_channels = workload.config().num_channels;
        if let Some(total) = check_channel_demand(workload.flows(), num_channels) {
            warn!(
                demand = total,
                num_channels,
                "slot demand exceeds channel capacity, workload cannot be fully scheduled"
            );
        }
        for (node, demand) in overloaded_nodes(workload) {
            warn!(
                node = %node,
                demand,
                "node radio demand exceeds one transmission per slot"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
