//! Runtime configuration: defaults, optional YAML file, validation.
//!
//! Values are resolved in three layers, later layers winning:
//!
//! ```text
//! ControllerConfig::default()  ◄──  --config <file.yaml>  ◄──  explicit CLI flags
//! ```
//!
//! Both the YAML file and the CLI produce a [`ConfigOverrides`], so the
//! merge logic lives in one place.  The expected YAML structure is:
//! ```yaml
//! open_lux: 30.0
//! close_lux: 10.0
//! interval_ms: 200
//! i2c_dev: /dev/i2c-1
//! i2c_addr: "0x23"
//! gpio_chip: gpiochip0
//! gpio_line: 17
//! active_low: false
//! ```
//!
//! Every field is optional; unknown keys are rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::controller::Thresholds;
use crate::error::ConfigError;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_OPEN_LUX: f64 = 30.0;
pub const DEFAULT_CLOSE_LUX: f64 = 10.0;
pub const DEFAULT_INTERVAL_MS: u64 = 200;
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";
pub const DEFAULT_I2C_ADDRESS: u8 = 0x23;
pub const DEFAULT_GPIO_CHIP: &str = "gpiochip0";
pub const DEFAULT_GPIO_LINE: u32 = 17;

// ── Overrides ─────────────────────────────────────────────────────────────────

/// One layer of optional settings, as found in the YAML file or on the CLI.
///
/// `None` means "not given at this layer" and leaves the lower layer intact.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub open_lux: Option<f64>,
    pub close_lux: Option<f64>,
    pub interval_ms: Option<u64>,
    pub i2c_dev: Option<PathBuf>,
    /// Kept as text so the file accepts the same `0x23` / `35` forms as the CLI.
    pub i2c_addr: Option<String>,
    pub gpio_chip: Option<String>,
    pub gpio_line: Option<u32>,
    pub active_low: Option<bool>,
}

impl ConfigOverrides {
    /// Parses `path` as a YAML overrides file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid (including unknown keys).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading controller configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        // An empty file is a valid "no overrides" document.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let overrides: ConfigOverrides = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        debug!(?overrides, "Config file overrides");
        Ok(overrides)
    }
}

// ── ControllerConfig ──────────────────────────────────────────────────────────

/// Fully resolved controller settings.
///
/// The hardware fields are opaque to the control core; they are only handed
/// to the sensor / actuator adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub open_lux: f64,
    pub close_lux: f64,
    pub interval: Duration,
    pub i2c_device: PathBuf,
    pub i2c_address: u8,
    pub gpio_chip: String,
    pub gpio_line: u32,
    pub active_low: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            open_lux: DEFAULT_OPEN_LUX,
            close_lux: DEFAULT_CLOSE_LUX,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            i2c_device: PathBuf::from(DEFAULT_I2C_DEVICE),
            i2c_address: DEFAULT_I2C_ADDRESS,
            gpio_chip: String::from(DEFAULT_GPIO_CHIP),
            gpio_line: DEFAULT_GPIO_LINE,
            active_low: false,
        }
    }
}

impl ControllerConfig {
    /// Resolves defaults, then the optional config file, then CLI overrides,
    /// and validates the result.
    ///
    /// # Errors
    /// Any failure is a [`ConfigError`]; nothing here touches hardware.
    pub fn resolve(file: Option<&Path>, cli: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = file {
            let overrides =
                ConfigOverrides::load_from_file(path).map_err(|e| ConfigError::File {
                    path: path.display().to_string(),
                    detail: format!("{e:#}"),
                })?;
            config.apply(overrides)?;
        }

        config.apply(cli)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies one override layer on top of `self`.
    pub fn apply(&mut self, o: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(v) = o.open_lux {
            self.open_lux = v;
        }
        if let Some(v) = o.close_lux {
            self.close_lux = v;
        }
        if let Some(ms) = o.interval_ms {
            self.interval = Duration::from_millis(ms);
        }
        if let Some(v) = o.i2c_dev {
            self.i2c_device = v;
        }
        if let Some(v) = o.i2c_addr {
            self.i2c_address = parse_i2c_address(&v)?;
        }
        if let Some(v) = o.gpio_chip {
            self.gpio_chip = v;
        }
        if let Some(v) = o.gpio_line {
            self.gpio_line = v;
        }
        if let Some(v) = o.active_low {
            self.active_low = v;
        }
        Ok(())
    }

    /// Checks the cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds()?;
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// The validated `(open, close)` pair.
    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        Thresholds::new(self.open_lux, self.close_lux)
    }

    /// Resolves `gpio_chip` to a device path.
    ///
    /// A bare name such as `gpiochip0` lives under `/dev`; anything with a
    /// slash is taken as a path already.
    pub fn gpio_chip_path(&self) -> PathBuf {
        if self.gpio_chip.contains('/') {
            PathBuf::from(&self.gpio_chip)
        } else {
            Path::new("/dev").join(&self.gpio_chip)
        }
    }
}

/// Parses an I2C bus address: `0x`/`0X` prefix means hex, otherwise decimal.
///
/// The value must fit in one byte.
pub fn parse_i2c_address(s: &str) -> Result<u8, ConfigError> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| ConfigError::InvalidI2cAddress(s.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
