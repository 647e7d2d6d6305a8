//! CLI argument parsing for bindscan

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for detection reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON array of broken mount points
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "bindscan")]
#[command(version)]
#[command(about = "Detect stale FUSE bind mounts by comparing mount peer groups", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mount table to read (default: /proc/self/mountinfo)
    #[arg(short = 'm', long = "mountinfo", value_name = "FILE")]
    pub mountinfo: Option<PathBuf>,

    /// Dataset mount root (overrides config file and MOUNT_ROOT)
    #[arg(short = 'r', long = "mount-root", value_name = "DIR")]
    pub mount_root: Option<String>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Repeat detection every SECS seconds
    #[arg(short = 'w', long = "watch", value_name = "SECS")]
    pub watch: Option<u64>,

    /// Exit with status 2 when broken mount points are found
    #[arg(long = "fail-on-broken")]
    pub fail_on_broken: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
