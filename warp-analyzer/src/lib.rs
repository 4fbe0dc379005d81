/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! WARP analysis core
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── flow            – Node, Edge, Flow, Allocation
//! ├── workload/       – WorkLoad aggregate, global parameters, lookup errors
//! ├── hyperperiod/    – LCM / GCD helpers, hyperperiod limit
//! ├── reliability/    – per-hop attempt allocation
//! ├── scheduler/      – slot × node schedule synthesis, demand checks
//! ├── analysis/       – worst-case latency and deadline verdict
//! ├── pipeline        – validate → allocate → synthesize → analyze
//! ├── config/         – YAML workload descriptions
//! └── report/         – text/file/table renderings
//! ```

pub mod analysis;
pub mod config;
pub mod flow;
pub mod hyperperiod;
pub mod pipeline;
pub mod reliability;
pub mod report;
pub mod scheduler;
pub mod workload;
