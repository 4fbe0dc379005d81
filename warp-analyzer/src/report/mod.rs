//! Text renderings of analysis results.
//!
//! Every report kind is one [`Report`] variant and is consumed through the
//! [`Visualization`] capability: a human-readable summary, a file body, and
//! a [`TableView`] for anything that draws its own grid.  The analysis
//! modules never depend on this one.

use std::fmt::{self, Write as _};

use crate::analysis::LatencyReport;
use crate::pipeline::AnalysisOutcome;
use crate::scheduler::{Occupant, Role, SCHEDULER_NAME};
use crate::workload::WorkLoad;

const DEADLINES_MET: &str = "All flows meet their deadlines";
const DEADLINES_MISSED: &str =
    "WARNING: NOT all flows meet their deadlines. See deadline analysis report.";

// ── Capability ────────────────────────────────────────────────────────────────

pub trait Visualization {
    /// Header, table and footer as plain text.
    fn summary_view(&self) -> String;

    /// Body for an output file: header and footer as `//` comments, rows
    /// tab-separated.
    fn file_view(&self) -> String;

    /// Title, column names and cells for a grid display.
    fn display_view(&self) -> TableView;

    /// Extension used when the report is written to a file.
    fn file_suffix(&self) -> &'static str;
}

/// A rendered grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }

    fn tab_separated(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for TableView {
    /// Left-aligned columns padded to the widest cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };
        writeln!(f, "{}", line(&self.columns))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        Ok(())
    }
}

// ── Report kinds ──────────────────────────────────────────────────────────────

/// Selector for [`Report::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Program,
    Reliabilities,
    Latency,
    DeadlineMisses,
    Workload,
}

/// One report over a finished run.
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    /// Slot × node table of the synthesized schedule.
    Program {
        workload: &'a WorkLoad,
        outcome: &'a AnalysisOutcome,
    },
    /// Per-flow attempt vectors and costs.
    Reliabilities { workload: &'a WorkLoad },
    /// Every instance's latency.
    Latency {
        workload: &'a WorkLoad,
        latency: &'a LatencyReport,
    },
    /// Only the instances that missed.
    DeadlineMisses {
        workload: &'a WorkLoad,
        latency: &'a LatencyReport,
    },
    /// Flow parameters and node chains.
    Workload { workload: &'a WorkLoad },
}

impl<'a> Report<'a> {
    pub fn new(kind: ReportKind, workload: &'a WorkLoad, outcome: &'a AnalysisOutcome) -> Self {
        match kind {
            ReportKind::Program => Report::Program { workload, outcome },
            ReportKind::Reliabilities => Report::Reliabilities { workload },
            ReportKind::Latency => Report::Latency {
                workload,
                latency: &outcome.latency,
            },
            ReportKind::DeadlineMisses => Report::DeadlineMisses {
                workload,
                latency: &outcome.latency,
            },
            ReportKind::Workload => Report::Workload { workload },
        }
    }

    fn workload(&self) -> &'a WorkLoad {
        match *self {
            Report::Program { workload, .. }
            | Report::Reliabilities { workload }
            | Report::Latency { workload, .. }
            | Report::DeadlineMisses { workload, .. }
            | Report::Workload { workload } => workload,
        }
    }

    fn title(&self) -> String {
        let name = self.workload().name();
        match self {
            Report::Program { .. } => format!("WARP program for graph {name}"),
            Report::Reliabilities { .. } => format!("Reliability allocation for graph {name}"),
            Report::Latency { .. } => format!("Latency analysis for graph {name}"),
            Report::DeadlineMisses { .. } => format!("Deadline misses for graph {name}"),
            Report::Workload { .. } => format!("Workload for graph {name}"),
        }
    }

    fn header(&self) -> Vec<String> {
        let mut lines = vec![self.title()];
        if let Report::Program { workload, outcome } = self {
            let cfg = workload.config();
            lines.push(format!("Scheduler Name: {SCHEDULER_NAME}"));
            // only when a deterministic fault model is assumed
            if cfg.num_faults > 0 {
                lines.push(format!("numFaults: {}", cfg.num_faults));
            }
            lines.push(format!("M: {}", cfg.min_packet_reception_rate));
            lines.push(format!("E2E: {}", cfg.e2e));
            lines.push(format!("nChannels: {}", outcome.schedule.num_channels()));
        }
        lines
    }

    fn footer(&self) -> Vec<String> {
        match self {
            Report::Program { outcome, .. } => {
                let mut lines: Vec<String> = outcome
                    .schedule
                    .failures()
                    .iter()
                    .map(|f| format!("unscheduled: {f}"))
                    .collect();
                lines.push(
                    if outcome.deadlines_met() {
                        DEADLINES_MET
                    } else {
                        DEADLINES_MISSED
                    }
                    .to_string(),
                );
                lines
            }
            Report::DeadlineMisses { latency, .. } => {
                vec![format!("{} deadline miss(es)", latency.deadline_misses().len())]
            }
            Report::Latency { latency, .. } => vec![if latency.deadlines_met() {
                DEADLINES_MET.to_string()
            } else {
                DEADLINES_MISSED.to_string()
            }],
            Report::Reliabilities { .. } | Report::Workload { .. } => Vec::new(),
        }
    }

    fn columns(&self) -> Vec<String> {
        let names: &[&str] = match self {
            Report::Program { workload, .. } => {
                let mut cols = vec!["Time Slot".to_string()];
                cols.extend(
                    workload
                        .node_names_ordered_alphabetically()
                        .into_iter()
                        .map(str::to_string),
                );
                return cols;
            }
            Report::Reliabilities { .. } => &[
                "Flow",
                "Nodes",
                "Attempts per hop",
                "Total cost",
                "numTxPerLink",
                "E2E reliability",
            ],
            Report::Latency { .. } => &[
                "Flow",
                "Instance",
                "Release",
                "Completion",
                "Latency",
                "Deadline",
                "Met",
            ],
            Report::DeadlineMisses { .. } => {
                &["Flow", "Instance", "Release", "Latency", "Deadline"]
            }
            Report::Workload { .. } => &["Flow", "Priority", "Period", "Deadline", "Phase", "Nodes"],
        };
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Report::Program { workload, outcome } => program_rows(workload, outcome),

            Report::Reliabilities { workload } => workload
                .flows()
                .iter()
                .map(|f| {
                    let alloc = f.allocation();
                    vec![
                        f.name.clone(),
                        workload.nodes_in_flow(&f.name).unwrap_or_default().join(" -> "),
                        join(f.link_tx()),
                        f.total_cost().to_string(),
                        f.num_tx_per_link.to_string(),
                        alloc.map_or("-".to_string(), |a| format!("{:.6}", a.e2e_reliability)),
                    ]
                })
                .collect(),

            Report::Latency { latency, .. } => latency
                .instances()
                .iter()
                .map(|i| {
                    vec![
                        i.flow.clone(),
                        i.instance.to_string(),
                        i.release.to_string(),
                        opt(i.completion),
                        opt(i.latency()),
                        i.deadline.to_string(),
                        if i.meets_deadline() { "yes" } else { "NO" }.to_string(),
                    ]
                })
                .collect(),

            Report::DeadlineMisses { latency, .. } => latency
                .deadline_misses()
                .into_iter()
                .map(|m| {
                    vec![
                        m.flow,
                        m.instance.to_string(),
                        m.release.to_string(),
                        m.latency.map_or("unscheduled".to_string(), |l| l.to_string()),
                        m.deadline.to_string(),
                    ]
                })
                .collect(),

            Report::Workload { workload } => workload
                .flows()
                .iter()
                .map(|f| {
                    vec![
                        f.name.clone(),
                        f.priority.to_string(),
                        f.period.to_string(),
                        f.deadline.to_string(),
                        f.phase.to_string(),
                        workload.nodes_in_flow(&f.name).unwrap_or_default().join(" -> "),
                    ]
                })
                .collect(),
        }
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn opt(value: Option<u64>) -> String {
    value.map_or("-".to_string(), |v| v.to_string())
}

/// Cell text for one node in one slot.
fn cell_label(occupant: &Occupant<'_>, src: &str, dst: &str) -> String {
    let verb = match occupant.role {
        Role::Sender => "push",
        Role::Receiver => "pull",
    };
    format!(
        "{verb}({}.{}: {src}->{dst} #{} ch{})",
        occupant.flow,
        occupant.instance,
        occupant.attempt + 1,
        occupant.channel
    )
}

fn program_rows(workload: &WorkLoad, outcome: &AnalysisOutcome) -> Vec<Vec<String>> {
    let table = outcome.schedule.table();
    let columns: Vec<usize> = workload
        .node_names_ordered_alphabetically()
        .into_iter()
        .filter_map(|n| workload.node_index(n).ok())
        .collect();

    (0..table.hyperperiod())
        .map(|slot| {
            let mut row = vec![slot.to_string()];
            for &node in &columns {
                let text = table.cell(slot, node).map_or(String::new(), |occ| {
                    let name = |id| workload.node_name(id).unwrap_or("?");
                    cell_label(&occ, name(occ.src), name(occ.dst))
                });
                row.push(text);
            }
            row
        })
        .collect()
}

impl Visualization for Report<'_> {
    fn summary_view(&self) -> String {
        let mut out = String::new();
        for line in self.header() {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
        let _ = write!(out, "{}", self.display_view());
        for line in self.footer() {
            let _ = writeln!(out, "// {line}");
        }
        out
    }

    fn file_view(&self) -> String {
        let mut out = String::new();
        for line in self.header() {
            let _ = writeln!(out, "// {line}");
        }
        out.push_str(&self.display_view().tab_separated());
        for line in self.footer() {
            let _ = writeln!(out, "// {line}");
        }
        out
    }

    fn display_view(&self) -> TableView {
        TableView {
            title: self.title(),
            columns: self.columns(),
            rows: self.rows(),
        }
    }

    fn file_suffix(&self) -> &'static str {
        match self {
            Report::Program { .. } => ".dsl",
            Report::Reliabilities { .. } => ".ra",
            Report::Latency { .. } => ".la",
            Report::DeadlineMisses { .. } => ".dm",
            Report::Workload { .. } => ".wld",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
