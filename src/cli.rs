//! CLI argument parsing for traceadjust

use clap::Parser;
use std::path::PathBuf;

use crate::calendar::TimeZoneMode;
use crate::config::AdjustConfig;

#[derive(Parser, Debug)]
#[command(name = "traceadjust")]
#[command(version)]
#[command(
    about = "Rewrite Oracle trace file tim= values as wall-clock timestamps and deltas",
    long_about = None
)]
pub struct Cli {
    /// Oracle trace file to adjust
    #[arg(value_name = "TRACE_FILE")]
    pub trace_file: Option<PathBuf>,

    /// Write adjusted trace here instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Load settings from a TOML file (flags below override it)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interpret and print timestamps in UTC instead of local time
    #[arg(long = "utc")]
    pub utc: bool,

    /// Don't print the "Base Timestamp Adjusted" line after each anchor
    #[arg(long = "quiet-base")]
    pub quiet_base: bool,

    /// Accept input whose first line isn't "Trace file ..."
    #[arg(long = "no-header-check")]
    pub no_header_check: bool,

    /// Print a JSON summary of the run to stderr
    #[arg(long = "summary")]
    pub summary: bool,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file-based settings
    pub fn apply_overrides(&self, mut config: AdjustConfig) -> AdjustConfig {
        if self.utc {
            config.time_zone = TimeZoneMode::Utc;
        }
        if self.quiet_base {
            config.announce_base = false;
        }
        if self.no_header_check {
            config.require_header = false;
        }
        config
    }
}
