/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{error, info};

use doorlight::config::{parse_i2c_address, ConfigOverrides, ControllerConfig};
use doorlight::daemon::Daemon;
use doorlight::error::DaemonError;
use doorlight::hardware::{Actuator, LightSensor};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Door light controller: BH1750 ambient light → hysteresis → GPIO output.
///
/// Example:
///   doorlight --open 40 --close 15 --interval-ms 250 \
///             --i2c-dev /dev/i2c-1 --i2c-addr 0x23 \
///             --gpio-chip gpiochip0 --gpio-line 17
#[derive(Debug, Parser)]
#[command(
    name = "doorlight",
    about = "Door light controller – ambient-light hysteresis driving a GPIO output",
    long_about = None,
)]
struct Cli {
    /// Open threshold in lux (default 30).
    #[arg(long = "open", value_name = "LUX")]
    open_lux: Option<f64>,

    /// Close threshold in lux, must be <= open (default 10).
    #[arg(long = "close", value_name = "LUX")]
    close_lux: Option<f64>,

    /// Update interval in milliseconds, must be > 0 (default 200).
    #[arg(long = "interval-ms", value_name = "MS")]
    interval_ms: Option<u64>,

    /// I2C device path (default /dev/i2c-1).
    #[arg(long = "i2c-dev", value_name = "PATH")]
    i2c_dev: Option<PathBuf>,

    /// I2C address, hex with 0x prefix or decimal (default 0x23).
    #[arg(long = "i2c-addr", value_name = "HEX", value_parser = parse_i2c_address)]
    i2c_addr: Option<u8>,

    /// gpiochip name or path (default gpiochip0).
    #[arg(long = "gpio-chip", value_name = "NAME")]
    gpio_chip: Option<String>,

    /// GPIO line offset (default 17).
    #[arg(long = "gpio-line", value_name = "N")]
    gpio_line: Option<u32>,

    /// Treat low as ON (default active high).
    #[arg(long = "active-low", default_value_t = false)]
    active_low: bool,

    /// Optional YAML file with the same settings; flags given here win.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            open_lux: self.open_lux,
            close_lux: self.close_lux,
            interval_ms: self.interval_ms,
            i2c_dev: self.i2c_dev.clone(),
            i2c_addr: self.i2c_addr.map(|a| format!("{a:#04x}")),
            gpio_chip: self.gpio_chip.clone(),
            gpio_line: self.gpio_line,
            active_low: self.active_low.then_some(true),
        }
    }
}

fn print_usage() {
    println!("{}", Cli::command().render_help());
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Initialise structured logging on stdout.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let rendered = e.render().to_string();
            let message = rendered.lines().next().unwrap_or_default();
            error!("Error: {}", message.trim_start_matches("error: "));
            print_usage();
            return ExitCode::from(2);
        }
    };

    // ── Resolve configuration (no hardware yet) ───────────────────────────────
    let config = match ControllerConfig::resolve(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {}", e);
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ DaemonError::Config(_)) => {
            error!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(config: ControllerConfig) -> Result<(), DaemonError> {
    run_with(config, open_hardware)
}

/// Event sources first, then hardware, then the banner and the control loop.
fn run_with<S, A, F>(config: ControllerConfig, open: F) -> Result<(), DaemonError>
where
    S: LightSensor + Send + 'static,
    A: Actuator + Send + 'static,
    F: FnOnce(&ControllerConfig) -> Result<(S, A), DaemonError>,
{
    let mut daemon = Daemon::new(config)?;
    daemon.install_signals()?;

    let (sensor, actuator) = open(daemon.config())?;

    let cfg = daemon.config();
    info!(
        open        = cfg.open_lux,
        close       = cfg.close_lux,
        interval_ms = cfg.interval.as_millis() as u64,
        i2c_dev     = %cfg.i2c_device.display(),
        i2c_addr    = %format!("{:#04x}", cfg.i2c_address),
        gpio_chip   = %cfg.gpio_chip,
        gpio_line   = cfg.gpio_line,
        active_high = !cfg.active_low,
        "Door light controller running"
    );

    daemon.run(sensor, actuator)
}

#[cfg(target_os = "linux")]
fn open_hardware(
    config: &ControllerConfig,
) -> Result<
    (
        doorlight::hardware::linux::LinuxSensor,
        doorlight::hardware::linux::LinuxActuator,
    ),
    DaemonError,
> {
    use doorlight::hardware::linux::{open_actuator, open_sensor};

    let sensor = open_sensor(config)?;
    let actuator = open_actuator(config)?;
    Ok((sensor, actuator))
}

#[cfg(not(target_os = "linux"))]
fn open_hardware(
    config: &ControllerConfig,
) -> Result<
    (
        doorlight::hardware::replay::ReplaySensor,
        doorlight::hardware::replay::RecordingActuator,
    ),
    DaemonError,
> {
    Err(doorlight::error::HardwareError::open(
        config.i2c_device.display().to_string(),
        "I2C / GPIO character devices are only available on Linux",
    )
    .into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
