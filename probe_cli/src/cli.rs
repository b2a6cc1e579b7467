//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use probe_hardware::HavocWindow;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "probe", version, about = "Self-healing temperature probe driver")]
pub struct Cli {
    /// Path to config TOML (all sections optional; defaults when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (ticks, summaries, logs and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the driver against the simulated sensor as fast as possible
    Simulate {
        /// Number of ticks to simulate
        #[arg(long)]
        ticks: u64,
        /// Constant ground-truth temperature (overrides sim.temperature and the ramp)
        #[arg(long, value_name = "T", allow_hyphen_values = true)]
        temp: Option<i32>,
        /// Havoc window START..END (half-open) or a single TICK; repeatable.
        /// Replaces the windows from the config file.
        #[arg(long, value_name = "START..END")]
        havoc: Vec<HavocWindow>,
        /// Print recovery and read statistics after the run
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Poll the simulated sensor at poll.rate_hz until Ctrl-C or a tick limit
    Run {
        /// Stop after this many ticks (overrides poll.max_ticks; 0 = forever)
        #[arg(long)]
        ticks: Option<u64>,
        /// Print recovery and read statistics after the run
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Verify cold start and havoc recovery against the simulated sensor
    SelfCheck,
}
