mod battery;
mod config;
mod error;
mod sysfs;
mod uevent;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;

use battery::BatteryRecord;
use error::BatteryError;

#[derive(Parser, Debug)]
#[command(name = "thinkbat", version, about = "Show battery status and set charge thresholds")]
pub struct Cli {
    /// Set start and stop charge thresholds (percent)
    #[arg(short, long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
    thresholds: Option<Vec<i64>>,

    /// Battery index (BAT<N>), overrides the config file
    #[arg(short, long)]
    battery: Option<u32>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "thinkbat", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    let index = cli.battery.unwrap_or(config.battery.index);
    let locator = config.battery.locator();
    log::debug!("Using battery {} under {}", index, locator.root().display());

    let mut bat = BatteryRecord::open(&locator, index)
        .with_context(|| format!("Failed to read battery BAT{}", index))?;
    if let Some(name) = bat.field("name") {
        log::debug!("Loaded power supply {}", name);
    }

    match cli.thresholds.as_deref() {
        Some(&[start, end]) => Ok(set_thresholds(&mut bat, start, end)),
        Some(other) => anyhow::bail!("Expected START and END thresholds, got {} values", other.len()),
        None => {
            println!("{}", bat.format_identity()?);
            println!("{}", bat.format_status()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn set_thresholds(bat: &mut BatteryRecord, start: i64, end: i64) -> ExitCode {
    if !nix::unistd::geteuid().is_root() {
        log::warn!("Not running as root, threshold writes will likely be refused");
    }

    match bat.set_charge_thresholds(start, end) {
        Ok(()) => {
            println!("Successfully changed charging thresholds.");
            // Firmware may clamp or reject values without failing the write.
            match bat.reload() {
                Ok(()) if bat.thresholds() != (start, end) => {
                    let (s, e) = bat.thresholds();
                    log::warn!("Thresholds read back as {}/{} after writing {}/{}", s, e, start, end);
                }
                Ok(()) => {}
                Err(e) => log::warn!("Failed to re-read battery after write: {}", e),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let BatteryError::PermissionDenied { path } = &e {
                log::debug!("Permission denied on {}", path.display());
            }
            eprintln!("{}", threshold_failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn threshold_failure_message(err: &BatteryError) -> String {
    match err {
        BatteryError::PermissionDenied { .. } => "Changing thresholds requires root privileges!".to_string(),
        BatteryError::InvalidThreshold { .. } => capitalize(&err.to_string()),
        other => format!("Failed to change thresholds: {}", other),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
