/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use warp_analyzer::config::load_workload;
use warp_analyzer::pipeline::analyze;
use warp_analyzer::report::{Report, ReportKind, Visualization};

// ── CLI argument definition ───────────────────────────────────────────────────

/// WARP workload analyzer.
///
/// Example:
///   warp-analyzer --workload workloads/example4.yaml --rm-order \
///                 --report program --output out/
#[derive(Debug, Parser)]
#[command(
    name = "warp-analyzer",
    about = "Reliability allocation, slot scheduling and deadline analysis for WARP flows",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML workload description.
    #[arg(short = 'w', long = "workload")]
    workload: PathBuf,

    /// Reassign priorities in rate-monotonic order before analysis.
    #[arg(long = "rm-order", default_value_t = false)]
    rm_order: bool,

    /// Report to produce.
    #[arg(short = 'r', long = "report", value_enum, default_value_t = ReportArg::Program)]
    report: ReportArg,

    /// Directory to write the report into; printed to stdout when absent.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Override the number of channels.
    #[arg(short = 'c', long = "channels")]
    channels: Option<u32>,

    /// Override the number of tolerated faults.
    #[arg(short = 'f', long = "faults")]
    faults: Option<u32>,

    /// Override the minimum packet reception rate M.
    #[arg(short = 'm', long = "m")]
    m: Option<f64>,

    /// Override the end-to-end reliability target.
    #[arg(short = 'e', long = "e2e")]
    e2e: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportArg {
    Program,
    Reliabilities,
    Latency,
    DeadlineMisses,
    Workload,
}

impl From<ReportArg> for ReportKind {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Program => ReportKind::Program,
            ReportArg::Reliabilities => ReportKind::Reliabilities,
            ReportArg::Latency => ReportKind::Latency,
            ReportArg::DeadlineMisses => ReportKind::DeadlineMisses,
            ReportArg::Workload => ReportKind::Workload,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        workload = %cli.workload.display(),
        rm_order = cli.rm_order,
        report   = ?cli.report,
        output   = ?cli.output,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // ── Load workload ─────────────────────────────────────────────────────────
    let mut desc = load_workload(&cli.workload)?;

    // ── CLI overrides ─────────────────────────────────────────────────────────
    let mut config = desc.workload.config().clone();
    if let Some(m) = cli.m {
        config.min_packet_reception_rate = m;
    }
    if let Some(e2e) = cli.e2e {
        config.e2e = e2e;
    }
    if let Some(faults) = cli.faults {
        config.num_faults = faults;
    }
    if let Some(channels) = cli.channels {
        config.num_channels = channels;
    }
    desc.workload
        .set_config(config)
        .context("Invalid command-line parameter")?;
    desc.options.rm_order |= cli.rm_order;

    // ── Analyze ───────────────────────────────────────────────────────────────
    let outcome = analyze(&mut desc.workload, &desc.options)?;

    for e in &outcome.allocation_errors {
        warn!("reliability: {}", e);
    }
    for f in outcome.schedule.failures() {
        warn!("scheduling: {}", f);
    }
    if outcome.deadlines_met() {
        info!("All flows meet their deadlines");
    } else {
        warn!(
            misses = outcome.latency.deadline_misses().len(),
            "NOT all flows meet their deadlines"
        );
    }

    // ── Report ────────────────────────────────────────────────────────────────
    let report = Report::new(cli.report.into(), &desc.workload, &outcome);
    match &cli.output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create output directory: {}", dir.display()))?;
            let stem = cli
                .workload
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| desc.workload.name().to_string());
            let path = dir.join(format!("{stem}{}", report.file_suffix()));
            std::fs::write(&path, report.file_view())
                .with_context(|| format!("Cannot write report: {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{}", report.summary_view()),
    }

    Ok(())
}
