/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use thiserror::Error;

/// Why the allocator could not produce an attempt vector for a flow.
///
/// Reported per flow; the remaining flows are still allocated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReliabilityError {
    /// Hop `hop` (`src → dst`) would need more than `ceiling` attempts before
    /// the flow reaches its end-to-end target.
    #[error(
        "flow '{flow}' hop {hop} ({src} -> {dst}) needs more than {ceiling} attempts \
         to reach E2E {target} (achieved {achieved:.6})"
    )]
    Unsatisfiable {
        flow: String,
        hop: usize,
        src: String,
        dst: String,
        ceiling: u32,
        target: f64,
        achieved: f64,
    },

    /// The flow has no nodes at all.
    #[error("flow '{0}' has no nodes to allocate")]
    EmptyFlow(String),
}

impl ReliabilityError {
    /// Name of the flow the error belongs to.
    pub fn flow(&self) -> &str {
        match self {
            ReliabilityError::Unsatisfiable { flow, .. } => flow,
            ReliabilityError::EmptyFlow(flow) => flow,
        }
    }
}
