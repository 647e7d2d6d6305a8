use anyhow::{Context, Result};
use bindscan::{
    cli::{Cli, OutputFormat},
    config::DetectorConfig,
    mountinfo::MountInfoFile,
    output, BrokenMountPoint, Detector,
};
use clap::Parser;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status when `--fail-on-broken` is set and broken mounts were found
const EXIT_BROKEN: i32 = 2;

/// Initialize tracing subscriber; `--debug` turns on everything
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file if given, then apply command line overrides
fn load_config(args: &Cli) -> Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_toml(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(path) = &args.mountinfo {
        config.mountinfo_path = path.clone();
    }
    if let Some(root) = &args.mount_root {
        config.mount_root = Some(root.clone());
    }

    Ok(config)
}

/// Run one detection cycle and print its report
fn run_cycle(
    detector: &Detector,
    source: &MountInfoFile,
    format: OutputFormat,
) -> Result<Vec<BrokenMountPoint>> {
    let broken = detector.detect(source)?;
    let report = output::render(&broken, format).context("Failed to render report")?;
    println!("{}", report);
    Ok(broken)
}

/// Repeat detection forever; a failed cycle is logged and the next one runs
fn watch(detector: &Detector, source: &MountInfoFile, format: OutputFormat, secs: u64) -> ! {
    let interval = Duration::from_secs(secs);
    loop {
        if let Err(e) = run_cycle(detector, source, format) {
            tracing::error!("Detection cycle failed: {:#}", e);
        }
        thread::sleep(interval);
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.watch == Some(0) {
        anyhow::bail!("Invalid value for --watch: 0 (must be >= 1)");
    }

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let detector = Detector::from_config(&config)?;
    let source = MountInfoFile::new(&config.mountinfo_path);

    if let Some(secs) = args.watch {
        watch(&detector, &source, args.format, secs);
    }

    let broken = run_cycle(&detector, &source, args.format)?;
    if args.fail_on_broken && !broken.is_empty() {
        std::process::exit(EXIT_BROKEN);
    }

    Ok(())
}
