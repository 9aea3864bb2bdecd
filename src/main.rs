mod audio;
mod battery;
mod classify;
mod config;
mod detector;
mod event;
mod journal;
mod pipeline;
mod spectrum;
mod stats;

use crate::audio::capture::{self, LiveCapture};
use crate::audio::replay::WavReplay;
use crate::battery::BatteryParams;
use crate::config::{CaptureConfig, DetectionConfig};
use crate::journal::{JournalReader, JournalWriter};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use jiff::Zoned;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "beepmon")]
#[command(about = "Acoustic test harness for beeper hardware")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen to the microphone and log detected beeps
    Record {
        /// Event log file to write
        log_path: PathBuf,
    },

    /// Run the detection pipeline over a recorded WAV file
    Replay {
        /// WAV file to analyze
        wav_path: PathBuf,

        /// Event log file to write
        log_path: PathBuf,
    },

    /// Summarize a beep event log
    Analyze {
        /// Event log file to read
        log_path: PathBuf,
    },

    /// List available audio recording devices
    Devices,

    /// Estimate the beeper's battery lifespan
    Battery,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Record { log_path } => cmd_record(&log_path),
        Commands::Replay { wav_path, log_path } => cmd_replay(&wav_path, &log_path),
        Commands::Analyze { log_path } => cmd_analyze(&log_path),
        Commands::Devices => cmd_devices(),
        Commands::Battery => cmd_battery(),
    };

    if let Err(error) = result {
        eprintln!("ERROR: {:#}", error);
        std::process::exit(1);
    }
}

/// Refuse to clobber an existing log without an explicit yes. Anything but
/// y/yes aborts; an affirmative deletes the old file before we reopen it.
fn prepare_log_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    println!(
        "The file '{}' already exists, overwrite it? (y/N)",
        path.display()
    );
    let mut response = String::new();
    std::io::stdin().read_line(&mut response)?;

    if matches!(response.trim().to_lowercase().as_str(), "y" | "yes") {
        print!("Okay, deleting old log now...");
        std::io::stdout().flush()?;
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete '{}'", path.display()))?;
        println!(" DONE");
        Ok(())
    } else {
        bail!("Better safe than sorry. Try a different filename instead?");
    }
}

fn cmd_record(log_path: &Path) -> Result<()> {
    prepare_log_path(log_path)?;

    let capture_config = CaptureConfig::default();
    let detection_config = DetectionConfig::default();

    let mut writer = JournalWriter::create(log_path)
        .with_context(|| format!("Failed to create log '{}'", log_path.display()))?;
    let mut source = LiveCapture::open(&capture_config)?;

    println!(
        "Starting to record at {}",
        Zoned::now().strftime("%Y-%m-%d %H:%M:%S")
    );
    let persisted = pipeline::run(&mut source, &detection_config, &mut writer)?;
    println!("Done recording; {} events logged", persisted);

    Ok(())
}

fn cmd_replay(wav_path: &Path, log_path: &Path) -> Result<()> {
    prepare_log_path(log_path)?;

    let capture_config = CaptureConfig::default();
    let detection_config = DetectionConfig::default();

    let mut writer = JournalWriter::create(log_path)
        .with_context(|| format!("Failed to create log '{}'", log_path.display()))?;
    let mut source = WavReplay::open(wav_path, capture_config.block_ms)?;

    let persisted = pipeline::run(&mut source, &detection_config, &mut writer)?;
    println!("Replay complete; {} events logged", persisted);

    Ok(())
}

fn cmd_analyze(log_path: &Path) -> Result<()> {
    if !log_path.is_file() {
        bail!("File '{}' not found", log_path.display());
    }

    let events = JournalReader::open(log_path)
        .and_then(|mut reader| reader.read_all())
        .with_context(|| format!("Failed to read log '{}'", log_path.display()))?;

    print!("{}", stats::render_report(&events));
    Ok(())
}

fn cmd_devices() -> Result<()> {
    let devices = capture::list_devices().context("Failed to list audio devices")?;

    println!("Available Audio Devices:");
    println!(
        "{:<30} {:<10} {:<20} Formats",
        "Name", "Default", "Sample Rates"
    );
    println!("{}", "-".repeat(80));

    for device in devices {
        let default_str = if device.is_default { "YES" } else { "NO" };
        let sample_rates = device
            .supported_sample_rates
            .iter()
            .take(3)
            .map(|sr| sr.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let formats = device
            .supported_formats
            .iter()
            .take(2)
            .map(|f| format!("{:?}", f))
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "{:<30} {:<10} {:<20} {}",
            &device.name[..device.name.len().min(30)],
            default_str,
            sample_rates,
            formats
        );
    }

    Ok(())
}

fn cmd_battery() -> Result<()> {
    print!("{}", battery::render_report(&BatteryParams::default()));
    Ok(())
}
