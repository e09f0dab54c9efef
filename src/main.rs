//! CALIRA gesture control host
//!
//! Receives per-frame gesture predictions from the classifier process (UDP
//! datagrams or stdin lines), stabilizes them and drives the desktop media
//! controls.

use anyhow::{Context, Result};
use calira_cortex::actuator::{Actuator, BackgroundActuator, DryRunActuator, ShellActuator};
use calira_cortex::ingest;
use calira_cortex::{CaliraConfig, CommandRouter, Cortex, Platform, StabilizationEngine};
use clap::Parser;
use log::LevelFilter;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Parser, Debug)]
#[command(name = "calira", version, about = "Stabilized hand-gesture media control")]
struct Cli {
    /// TOML config file (falls back to $CALIRA_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP address to receive frames on (overrides config and $CALIRA_UDP_ADDR)
    #[arg(long)]
    udp: Option<SocketAddr>,

    /// Read frames from stdin instead of UDP
    #[arg(long)]
    stdin: bool,

    /// Log commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Force a platform backend: linux, macos or windows
    #[arg(long)]
    platform: Option<Platform>,

    /// Run the actuator on a worker thread
    #[arg(long)]
    background: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => CaliraConfig::load(path)?,
        None => CaliraConfig::from_env_or_default()?,
    };

    // Override with CLI options
    if let Some(addr) = cli.udp.or_else(ingest::udp_frame_addr_from_env) {
        config.input.udp_addr = addr;
    }
    if cli.dry_run {
        config.actuator.dry_run = true;
    }
    if cli.platform.is_some() {
        config.actuator.platform = cli.platform;
    }
    if cli.background {
        config.actuator.background = true;
    }

    log::info!("CALIRA gesture control");

    let actuator = build_actuator(&config)?;
    let router = CommandRouter::new(config.gesture_table(), actuator);
    let engine = StabilizationEngine::new(config.stabilizer.clone(), router)
        .context("invalid stabilizer configuration")?;

    let (frames_tx, frames_rx) = crossbeam_channel::bounded(256);
    if cli.stdin {
        ingest::spawn_stdin_reader(frames_tx).context("start stdin reader")?;
    } else {
        ingest::spawn_udp_listener(config.input.udp_addr, frames_tx).await?;
    }

    let mut cortex = Cortex::new(engine, frames_rx);
    let shutdown = cortex.shutdown_handle();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal...");
        shutdown.store(true, Ordering::Relaxed);
    })?;

    log::info!("Press Ctrl+C to exit");
    let stats = tokio::task::spawn_blocking(move || cortex.run()).await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn build_actuator(config: &CaliraConfig) -> Result<Box<dyn Actuator + Send>> {
    let inner: Box<dyn Actuator + Send> = if config.actuator.dry_run {
        Box::new(DryRunActuator::default())
    } else {
        let platform = config
            .actuator
            .platform
            .or_else(Platform::detect)
            .with_context(|| format!("no media-control backend for {}", std::env::consts::OS))?;
        log::info!("Using {platform} actuator");
        Box::new(ShellActuator::new(platform))
    };

    if !config.actuator.background {
        return Ok(inner);
    }

    let (background, reports) = BackgroundActuator::spawn(inner).context("start actuator worker")?;
    std::thread::Builder::new()
        .name("calira-reports".to_string())
        .spawn(move || {
            for report in reports.iter() {
                match report.result {
                    Ok(()) => log::debug!("{} done", report.command),
                    Err(e) => log::error!("{} failed: {e}", report.command),
                }
            }
        })
        .context("start report logger")?;
    Ok(Box::new(background))
}
