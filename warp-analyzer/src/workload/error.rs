/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured errors for the topology model.
//!
//! Two families share one enum:
//!
//! * **validation** – the workload would become structurally inconsistent
//!   (duplicate names, empty flows, zero period/deadline, phase not below
//!   the period, parameters out of range).  Fatal to a run.
//! * **lookup** – a query named a flow or node that does not exist.  Never
//!   answered with a default value.

use thiserror::Error;

use crate::hyperperiod::HyperperiodError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkloadError {
    // ── Validation ────────────────────────────────────────────────────────────
    #[error("flow '{0}' already exists")]
    DuplicateFlow(String),

    #[error("node '{node}' appears more than once in flow '{flow}'")]
    DuplicateNodeInFlow { flow: String, node: String },

    #[error("flow '{0}' has no nodes")]
    EmptyFlow(String),

    #[error("flow '{flow}' has a non-positive period ({value})")]
    InvalidPeriod { flow: String, value: u64 },

    #[error("flow '{flow}' has a non-positive deadline ({value})")]
    InvalidDeadline { flow: String, value: u64 },

    #[error("flow '{flow}' has phase {phase}, which is not below its period ({period})")]
    InvalidPhase { flow: String, phase: u64, period: u64 },

    /// A global parameter is outside its legal range.
    #[error("parameter {name} = {value} is out of range ({expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("workload contains no flows")]
    NoFlows,

    // ── Lookup ────────────────────────────────────────────────────────────────
    #[error("flow '{0}' not found")]
    FlowNotFound(String),

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    // ── Derived queries ───────────────────────────────────────────────────────
    #[error("hyperperiod: {0}")]
    Hyperperiod(#[from] HyperperiodError),
}

impl WorkloadError {
    /// `true` for the not-found family.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            WorkloadError::FlowNotFound(_) | WorkloadError::NodeNotFound(_)
        )
    }
}
