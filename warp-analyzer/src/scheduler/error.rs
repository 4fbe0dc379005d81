/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error and failure types for the schedule synthesizer.
//!
//! Two layers, like the rest of the pipeline:
//!
//! * [`SchedulingFailure`] – one flow instance could not be placed.  This is a
//!   *value* collected in the [`Schedule`](super::Schedule); synthesis goes on
//!   with the remaining flows so every conflict shows up in one run.
//! * [`SchedulerError`] – the synthesizer could not start at all.

use thiserror::Error;

use crate::workload::WorkloadError;

// ── Per-instance failures ─────────────────────────────────────────────────────

/// Why a flow (or one of its instances) has no placement in the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingFailure {
    /// The flow carries no reliability allocation, so there is nothing to
    /// place.  Usually follows a [`ReliabilityError`](crate::reliability::ReliabilityError).
    Unallocated { flow: String },

    /// Hop `hop` of instance `instance` got only `placed` of its `required`
    /// attempts inside `[release, window_end)`.  Everything already placed
    /// for that instance was rolled back.
    WindowExhausted {
        flow: String,
        instance: u64,
        hop: usize,
        src: String,
        dst: String,
        release: u64,
        window_end: u64,
        placed: u32,
        required: u32,
    },
}

impl SchedulingFailure {
    pub fn flow(&self) -> &str {
        match self {
            SchedulingFailure::Unallocated { flow } => flow,
            SchedulingFailure::WindowExhausted { flow, .. } => flow,
        }
    }

    /// Instance number, or `None` when the whole flow was skipped.
    pub fn instance(&self) -> Option<u64> {
        match self {
            SchedulingFailure::Unallocated { .. } => None,
            SchedulingFailure::WindowExhausted { instance, .. } => Some(*instance),
        }
    }
}

impl std::fmt::Display for SchedulingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingFailure::Unallocated { flow } => {
                write!(f, "flow '{}' has no reliability allocation", flow)
            }

            SchedulingFailure::WindowExhausted {
                flow,
                instance,
                hop,
                src,
                dst,
                release,
                window_end,
                placed,
                required,
            } => write!(
                f,
                "flow '{}' instance {} hop {} ({} -> {}): placed {} of {} attempts in [{}, {})",
                flow, instance, hop, src, dst, placed, required, release, window_end
            ),
        }
    }
}

// ── Fatal errors ──────────────────────────────────────────────────────────────

/// Top-level error returned by
/// [`ScheduleSynthesizer::synthesize()`](super::ScheduleSynthesizer::synthesize).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// `synthesize()` was called on a workload without flows.
    #[error("no flows provided, workload is empty")]
    NoFlows,

    /// The workload configures zero channels.
    #[error("no channels available: numChannels must be at least 1")]
    NoChannels,

    /// `hyperperiod × nodes` exceeds the synthesizer's cell limit.
    #[error(
        "schedule table too large: {hyperperiod} slots x {node_count} nodes = {cells} cells (limit {limit})"
    )]
    TableTooLarge {
        hyperperiod: u64,
        node_count: usize,
        cells: u64,
        limit: u64,
    },

    /// The schedule table cannot be sized (hyperperiod overflow or limit).
    #[error("cannot size schedule table: {0}")]
    Workload(#[from] WorkloadError),
}
