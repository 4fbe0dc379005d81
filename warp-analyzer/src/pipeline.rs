/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end analysis run.
//!
//! ```text
//! validate ─► [RM order] ─► allocate ─► synthesize ─► analyze
//! ```
//!
//! Structural problems stop the run.  Per-flow problems (unsatisfiable
//! reliability, unplaceable instances, deadline misses) are gathered in the
//! [`AnalysisOutcome`].

use thiserror::Error;
use tracing::info;

use crate::analysis::{LatencyAnalyzer, LatencyReport};
use crate::reliability::{ReliabilityAllocator, ReliabilityError};
use crate::scheduler::{Schedule, ScheduleSynthesizer, SchedulerError, WindowPolicy};
use crate::workload::{WorkLoad, WorkloadError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid workload: {0}")]
    Workload(#[from] WorkloadError),

    #[error("schedule synthesis failed: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// Knobs for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Reorder flows rate-monotonically before allocation.
    pub rm_order: bool,
    pub allocator: ReliabilityAllocator,
    pub window_policy: WindowPolicy,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub allocation_errors: Vec<ReliabilityError>,
    pub schedule: Schedule,
    pub latency: LatencyReport,
}

impl AnalysisOutcome {
    /// Overall verdict.  Unallocated and unplaced instances count as misses.
    pub fn deadlines_met(&self) -> bool {
        self.latency.deadlines_met()
    }

    /// No reliability or placement problem and no deadline miss.
    pub fn is_clean(&self) -> bool {
        self.allocation_errors.is_empty() && self.schedule.is_complete() && self.deadlines_met()
    }
}

/// Run every stage on `workload`.  The workload keeps the allocations (and
/// the RM order, if requested) afterwards.
pub fn analyze(
    workload: &mut WorkLoad,
    options: &PipelineOptions,
) -> Result<AnalysisOutcome, PipelineError> {
    workload.validate()?;

    if options.rm_order {
        workload.set_flows_in_rm_order();
    }

    let allocation_errors = options.allocator.allocate_workload(workload);
    let schedule = ScheduleSynthesizer::with_policy(options.window_policy).synthesize(workload)?;
    let latency = LatencyAnalyzer::new().analyze(workload, &schedule);

    let outcome = AnalysisOutcome {
        allocation_errors,
        schedule,
        latency,
    };

    info!(
        workload = workload.name(),
        allocation_errors = outcome.allocation_errors.len(),
        scheduling_failures = outcome.schedule.failures().len(),
        deadline_misses = outcome.latency.deadline_misses().len(),
        deadlines_met = outcome.deadlines_met(),
        "analysis finished"
    );

    Ok(outcome)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
