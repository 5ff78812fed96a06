// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! # siggen
//!
//! Drives a simulated signal generator from a script of parameter events.
//! Each line of the script is a JSON object such as
//! `{"channel": 0, "parameter": "amplitude", "value": 0.5}`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use siggen_common::DeviceKind;
use siggen_controller::{ChannelEvent, Generator, GeneratorSettings, Overlay, SimulatedOverlay};

/// Replay parameter events against a simulated generator
#[derive(Parser)]
#[command(name = "siggen")]
#[command(about = "Channel control for a multi-channel signal generator")]
#[command(version)]
struct Cli {
    /// Generator settings (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device to simulate
    #[arg(short, long, global = true, value_enum, default_value_t = Device::Mercury)]
    device: Device,

    /// Log informational messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log every register write
    #[arg(long, global = true)]
    diagnostics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a script of JSON-lines events and print the final channel state
    Run {
        /// Event script, standard input if omitted
        script: Option<PathBuf>,
    },

    /// Print the control descriptors of every parameter
    Controls,
}

#[derive(Clone, Copy, ValueEnum)]
enum Device {
    Mercury,
    MercuryQuad,
}

impl From<Device> for DeviceKind {
    fn from(device: Device) -> Self {
        match device {
            Device::Mercury => DeviceKind::Mercury,
            Device::MercuryQuad => DeviceKind::MercuryQuad,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(cli.verbose, cli.diagnostics || settings.diagnostics);

    let overlay = SimulatedOverlay::new(cli.device.into());
    let mut generator = Generator::new(overlay, &settings)?;
    let stdout = io::stdout();

    match cli.command {
        Commands::Run { script } => {
            let failed = match script {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open script {}", path.display()))?;
                    replay(&mut generator, BufReader::new(file), &mut io::stderr())?
                }
                None => replay(&mut generator, io::stdin().lock(), &mut io::stderr())?,
            };
            serde_json::to_writer_pretty(stdout.lock(), &generator.snapshots())?;
            writeln!(stdout.lock())?;
            generator.shutdown()?;
            report_rejected(failed);
        }
        Commands::Controls => {
            serde_json::to_writer_pretty(stdout.lock(), &generator.controls())?;
            writeln!(stdout.lock())?;
            generator.shutdown()?;
        }
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<GeneratorSettings> {
    let Some(path) = path else {
        return Ok(GeneratorSettings::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    Ok(GeneratorSettings::from_json(&json)?)
}

fn init_logging(verbose: bool, diagnostics: bool) {
    let level = match (verbose, diagnostics) {
        (_, true) => log::LevelFilter::Debug,
        (true, false) => log::LevelFilter::Info,
        (false, false) => log::LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module(siggen_log::TARGET_PREFIX, level)
        .parse_default_env()
        .init();
    siggen_log::init_logging(diagnostics);
}

/// Apply every event line of `script`, returning how many were rejected.
///
/// A rejected line is reported on `errors` and the replay goes on, unless the
/// error leaves the generator unusable.
fn replay<O: Overlay>(
    generator: &mut Generator<O>,
    script: impl BufRead,
    errors: &mut impl Write,
) -> Result<usize> {
    let mut failed = 0;
    for (number, line) in script.lines().enumerate() {
        let line = line.context("Failed to read event script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let outcome = serde_json::from_str::<ChannelEvent>(line)
            .map_err(anyhow::Error::from)
            .and_then(|event| generator.apply(&event).map_err(anyhow::Error::from));
        if let Err(err) = outcome {
            failed += 1;
            writeln!(errors, "line {}: {err}", number + 1)?;
        }
    }
    Ok(failed)
}

fn report_rejected(failed: usize) {
    if failed > 0 {
        siggen_log::warn!("{} event(s) were rejected", failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::sync::Mutex;

    struct CapturingLogger(Mutex<Vec<(String, String)>>);

    impl log::Log for CapturingLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            let entry = (record.target().to_string(), record.args().to_string());
            self.0.lock().unwrap().push(entry);
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger(Mutex::new(Vec::new()));

    fn generator() -> Generator<SimulatedOverlay> {
        Generator::new(
            SimulatedOverlay::new(DeviceKind::Mercury),
            &GeneratorSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options() {
        let args = ["siggen", "run", "-d", "mercury-quad", "--diagnostics"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.device, Device::MercuryQuad));
        assert!(cli.diagnostics);
        assert!(matches!(cli.command, Commands::Run { script: None }));
    }

    #[test]
    fn test_replay_continues_after_rejected_lines() {
        let mut generator = generator();
        let script = r#"
# set up channel 1
{"channel": 1, "parameter": "enable", "value": true}
{"channel": 1, "parameter": "amplitude", "value": 2.0}
not json
{"channel": 1, "parameter": "amplitude", "value": 0.5}
{"channel": 4, "parameter": "enable", "value": true}
"#;
        let mut errors = Vec::new();
        let failed = replay(&mut generator, script.as_bytes(), &mut errors).unwrap();

        assert_eq!(failed, 3);
        let errors = String::from_utf8(errors).unwrap();
        assert_eq!(errors.lines().count(), 3);
        assert!(errors.starts_with("line 4:"));
        let channel = generator.channel(1).unwrap().state();
        assert!(channel.enabled());
        assert_eq!(channel.amplitude(), 0.5);
    }

    #[test]
    fn test_default_settings_without_config() {
        assert_eq!(load_settings(None).unwrap(), GeneratorSettings::default());
    }

    #[test]
    fn test_rejection_summary_uses_generator_target() {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Warn);
        report_rejected(0);
        report_rejected(3);

        let records = LOGGER.0.lock().unwrap();
        let summaries: Vec<_> = records
            .iter()
            .filter(|(_, message)| message.ends_with("were rejected"))
            .collect();
        assert_eq!(summaries.len(), 1);
        let (target, message) = summaries[0];
        assert!(target.starts_with(siggen_log::TARGET_PREFIX), "{target}");
        assert_eq!(message, "3 event(s) were rejected");
    }
}
