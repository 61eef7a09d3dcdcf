//! mavlog-replay - Run a recorded capture through the flight log gate
//!
//! Usage:
//!   mavlog-replay [OPTIONS] <capture.tlog>
//!
//! The gate picks the autopilot out of the recorded heartbeats and writes
//! the rest of the stream to a PX4 or ArduPilot log under `logs_dir`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mavlog_autolog::{AutoLog, LogEndpoint};
use mavlog_core::LogConfig;
use mavlog_replay::replay;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mavlog-replay")]
#[command(author, version, about = "Replay a MAVLink capture through the flight log gate")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "MAVLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the produced logs, overrides the config file
    #[arg(short, long, env = "MAVLOG_LOGS_DIR")]
    logs_dir: Option<PathBuf>,

    /// System id of the flight controller, skips target discovery
    #[arg(long)]
    fcu_id: Option<u8>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Capture to replay
    capture: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "mavlog_replay=info,mavlog_autolog=debug,mavlog_flightlog=info".into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LogConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LogConfig::default(),
    };
    if let Some(dir) = cli.logs_dir {
        config.logs_dir = dir;
    }
    if cli.fcu_id.is_some() {
        config.fcu_id = cli.fcu_id;
    }

    tracing::info!(
        capture = %cli.capture.display(),
        logs_dir = %config.logs_dir.display(),
        mode = %config.mode,
        "Starting replay"
    );

    let data = std::fs::read(&cli.capture)
        .with_context(|| format!("Failed to read capture {}", cli.capture.display()))?;

    let mut gate = AutoLog::new(Arc::new(config));
    gate.start().context("Failed to start log gate")?;

    let summary = replay(&mut gate, &data);
    gate.stop();
    let stats = gate.report_statistics();

    if cli.json {
        let out = json!({ "replay": summary, "gate": stats });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        tracing::info!(
            frames = summary.frames,
            write_errors = summary.write_errors,
            bound = gate.is_bound(),
            "Replay complete"
        );
    }

    if let Some(err) = &summary.capture_error {
        tracing::warn!(error = %err, "Capture was not fully replayed");
    }
    if summary.write_errors > 0 {
        anyhow::bail!("{} frame(s) could not be logged", summary.write_errors);
    }

    Ok(())
}
