//! Workload description loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! name: Example4
//! m: 0.9
//! e2e: 0.99
//! faults: 0          # optional, default 0
//! channels: 16       # optional, default 16
//! allocator:         # optional
//!   max_attempts_per_hop: 100
//!   ceiling: fail    # fail | clamp
//! scheduler:         # optional
//!   window: strict   # strict | best_effort
//! flows:
//!   - name: F0
//!     period: 20     # optional, default 100
//!     deadline: 20   # optional, default 100
//!     phase: 0       # optional, default 0
//!     priority: 0    # optional, default = position in the list
//!     nodes: [A, B, C, D]
//! ```
//!
//! Flow order in the file is insertion order.  Nodes are indexed in the order
//! they first appear while reading the flows top to bottom.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::pipeline::PipelineOptions;
use crate::reliability::{CeilingPolicy, ReliabilityAllocator, DEFAULT_MAX_ATTEMPTS_PER_HOP};
use crate::scheduler::WindowPolicy;
use crate::workload::{WorkLoad, WorkloadConfig, DEFAULT_NUM_CHANNELS};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadFile {
    name: String,
    #[serde(alias = "min_packet_reception_rate")]
    m: f64,
    e2e: f64,
    #[serde(default)]
    faults: u32,
    #[serde(default = "default_channels")]
    channels: u32,
    #[serde(default)]
    allocator: AllocatorEntry,
    #[serde(default)]
    scheduler: SchedulerEntry,
    #[serde(default)]
    flows: Vec<FlowEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllocatorEntry {
    #[serde(default = "default_max_attempts")]
    max_attempts_per_hop: u32,
    #[serde(default)]
    ceiling: CeilingEntry,
}

impl Default for AllocatorEntry {
    fn default() -> Self {
        Self {
            max_attempts_per_hop: DEFAULT_MAX_ATTEMPTS_PER_HOP,
            ceiling: CeilingEntry::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CeilingEntry {
    #[default]
    Fail,
    Clamp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerEntry {
    #[serde(default)]
    window: WindowEntry,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WindowEntry {
    #[default]
    Strict,
    BestEffort,
}

/// Per-flow fields as they appear in the YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlowEntry {
    name: String,
    nodes: Vec<String>,
    period: Option<u64>,
    deadline: Option<u64>,
    phase: Option<u64>,
    priority: Option<u32>,
}

fn default_channels() -> u32 {
    DEFAULT_NUM_CHANNELS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS_PER_HOP
}

// ── Public API ────────────────────────────────────────────────────────────────

/// A loaded workload plus the run options the file asked for.
#[derive(Debug, Clone)]
pub struct WorkloadDescription {
    pub workload: WorkLoad,
    pub options: PipelineOptions,
}

/// Read and build the workload described by the YAML file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be opened, the YAML is structurally
/// invalid, or the description breaks a workload invariant (duplicate flow,
/// repeated node in a flow, zero period, parameter out of range).
pub fn load_workload(path: &Path) -> Result<WorkloadDescription> {
    info!("Loading workload description from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

    parse_workload(&content).with_context(|| format!("Invalid workload file: {}", path.display()))
}

/// Build a workload from YAML text.
pub fn parse_workload(content: &str) -> Result<WorkloadDescription> {
    let file: WorkloadFile = serde_yaml::from_str(content).context("Failed to parse YAML")?;

    let config = WorkloadConfig::new(file.m, file.e2e)
        .with_faults(file.faults)
        .with_channels(file.channels);
    let mut workload = WorkLoad::new(file.name, config)?;

    for entry in &file.flows {
        workload.add_flow(&entry.name)?;
        if let Some(period) = entry.period {
            workload.set_flow_period(&entry.name, period)?;
        }
        if let Some(deadline) = entry.deadline {
            workload.set_flow_deadline(&entry.name, deadline)?;
        }
        if let Some(phase) = entry.phase {
            workload.set_flow_phase(&entry.name, phase)?;
        }
        if let Some(priority) = entry.priority {
            workload.set_flow_priority(&entry.name, priority)?;
        }
        for node in &entry.nodes {
            workload
                .add_node_to_flow(&entry.name, node)
                .with_context(|| format!("flow '{}'", entry.name))?;
        }
        debug!(
            "  Flow: {} | nodes: {} | period: {:?} | deadline: {:?}",
            entry.name,
            entry.nodes.len(),
            entry.period,
            entry.deadline,
        );
    }

    let ceiling = match file.allocator.ceiling {
        CeilingEntry::Fail => CeilingPolicy::Fail,
        CeilingEntry::Clamp => CeilingPolicy::Clamp,
    };
    let window_policy = match file.scheduler.window {
        WindowEntry::Strict => WindowPolicy::Strict,
        WindowEntry::BestEffort => WindowPolicy::BestEffort,
    };
    let options = PipelineOptions {
        rm_order: false,
        allocator: ReliabilityAllocator::new()
            .with_ceiling(file.allocator.max_attempts_per_hop, ceiling),
        window_policy,
    };

    info!(
        "Successfully loaded workload '{}': {} flow(s), {} node(s)",
        workload.name(),
        workload.flows().len(),
        workload.nodes().len(),
    );

    Ok(WorkloadDescription { workload, options })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const EXAMPLE4: &str = r#"
name: Example4
m: 0.9
e2e: 0.99
flows:
  - name: F0
    period: 20
    deadline: 20
    nodes: [A, B, C, D]
  - name: F1
    period: 20
    deadline: 20
    nodes: [C, B, A]
"#;

    // ── load_workload ─────────────────────────────────────────────────────────

    #[test]
    fn load_example_yaml() {
        let f = yaml_tempfile(EXAMPLE4);
        let desc = load_workload(f.path()).unwrap();
        let wl = &desc.workload;

        assert_eq!(wl.name(), "Example4");
        assert_eq!(wl.flow_names(), vec!["F0", "F1"]);
        assert_eq!(wl.nodes_in_flow("F1").unwrap(), vec!["C", "B", "A"]);
        assert_eq!(wl.node_names(), vec!["A", "B", "C", "D"]);
        assert_eq!(wl.flow_period("F0").unwrap(), 20);
        assert_eq!(wl.config().num_channels, DEFAULT_NUM_CHANNELS);
        assert_eq!(wl.config().num_faults, 0);
    }

    #[test]
    fn bundled_workloads_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../workloads");
        let desc = load_workload(&dir.join("example4.yaml")).unwrap();
        assert_eq!(desc.workload.flow_names(), vec!["F0", "F1"]);

        let desc = load_workload(&dir.join("test_flows.yaml")).unwrap();
        assert_eq!(desc.workload.hyper_period().unwrap(), 300);
        assert_eq!(desc.options.window_policy, WindowPolicy::BestEffort);
    }

    #[test]
    fn optional_fields_use_defaults_when_absent() {
        let yaml = "name: W\nm: 0.8\ne2e: 0.95\nflows:\n  - name: F0\n    nodes: [X, Y]\n";
        let desc = parse_workload(yaml).unwrap();
        let wl = &desc.workload;

        assert_eq!(wl.flow_period("F0").unwrap(), crate::flow::DEFAULT_PERIOD);
        assert_eq!(wl.flow_deadline("F0").unwrap(), crate::flow::DEFAULT_DEADLINE);
        assert_eq!(wl.flow_phase("F0").unwrap(), 0);
        assert_eq!(wl.flow_priority("F0").unwrap(), 0);
        assert_eq!(
            desc.options.allocator.max_attempts_per_hop(),
            DEFAULT_MAX_ATTEMPTS_PER_HOP
        );
        assert_eq!(desc.options.allocator.ceiling_policy(), CeilingPolicy::Fail);
        assert_eq!(desc.options.window_policy, WindowPolicy::Strict);
    }

    #[test]
    fn allocator_and_scheduler_sections_are_read() {
        let yaml = r#"
name: W
min_packet_reception_rate: 0.9
e2e: 0.99
faults: 1
channels: 2
allocator:
  max_attempts_per_hop: 8
  ceiling: clamp
scheduler:
  window: best_effort
flows:
  - name: F0
    phase: 3
    priority: 7
    nodes: [A, B]
"#;
        let desc = parse_workload(yaml).unwrap();
        assert_eq!(desc.workload.config().num_faults, 1);
        assert_eq!(desc.workload.config().num_channels, 2);
        assert_eq!(desc.workload.flow_phase("F0").unwrap(), 3);
        assert_eq!(desc.workload.flow_priority("F0").unwrap(), 7);
        assert_eq!(desc.options.allocator.max_attempts_per_hop(), 8);
        assert_eq!(desc.options.allocator.ceiling_policy(), CeilingPolicy::Clamp);
        assert_eq!(desc.options.window_policy, WindowPolicy::BestEffort);
    }

    #[test]
    fn missing_file_returns_error() {
        assert!(load_workload(Path::new("/nonexistent/path/workload.yaml")).is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(load_workload(f.path()).is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let yaml = "name: W\nm: 0.9\ne2e: 0.99\nflows:\n  - name: F0\n    nodez: [A]\n";
        assert!(parse_workload(yaml).is_err());
    }

    // ── workload invariants surface as errors ─────────────────────────────────

    #[test]
    fn duplicate_flow_is_rejected() {
        let yaml = "name: W\nm: 0.9\ne2e: 0.99\nflows:\n  - {name: F0, nodes: [A]}\n  - {name: F0, nodes: [B]}\n";
        let err = parse_workload(yaml).unwrap_err();
        assert!(format!("{err:#}").contains("already exists"));
    }

    #[test]
    fn repeated_node_in_flow_is_rejected() {
        let yaml = "name: W\nm: 0.9\ne2e: 0.99\nflows:\n  - {name: F0, nodes: [A, B, A]}\n";
        let err = parse_workload(yaml).unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn out_of_range_parameter_is_rejected() {
        let yaml = "name: W\nm: 1.5\ne2e: 0.99\nflows: []\n";
        assert!(parse_workload(yaml).is_err());
    }

    #[test]
    fn zero_period_is_rejected() {
        let yaml = "name: W\nm: 0.9\ne2e: 0.99\nflows:\n  - {name: F0, period: 0, nodes: [A]}\n";
        assert!(parse_workload(yaml).is_err());
    }
}
