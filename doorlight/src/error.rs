/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the door light controller.
//!
//! Three enums model the three failure layers, and [`DaemonError`] wraps them
//! for the binary:
//!
//! * [`ConfigError`] — bad CLI / config-file input.  Resolved entirely at
//!   startup, before any hardware is opened.
//! * [`HardwareError`] — any sensor or actuator transport failure.  Fatal to
//!   the control worker; never retried.
//! * [`MultiplexError`] — the event loop could not set up or keep waiting on
//!   its event sources.
//!
//! | Variant | Exit code |
//! |---|---|
//! | `DaemonError::Config` | `2` |
//! | `DaemonError::Hardware` | `1` |
//! | `DaemonError::Multiplex` | `1` |
//! | `DaemonError::WorkerPanicked` | `1` |

use std::io;

use thiserror::Error;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Invalid configuration, detected before any hardware is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `close` is above `open`, which would leave no dead zone.
    #[error("close threshold must be <= open threshold (open={open}, close={close})")]
    ThresholdOrder { open: f64, close: f64 },

    /// A threshold is NaN, infinite or negative.
    #[error("{name} threshold must be a finite, non-negative lux value (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// The tick interval is zero.
    #[error("interval-ms must be > 0")]
    ZeroInterval,

    /// The I2C address is not a one-byte decimal or `0x`-prefixed hex value.
    #[error("invalid hex byte: {0}")]
    InvalidI2cAddress(String),

    /// The YAML config file could not be read or parsed.
    ///
    /// `detail` carries the full context chain, rendered once at the boundary.
    #[error("config file {path}: {detail}")]
    File { path: String, detail: String },
}

// ── Hardware ──────────────────────────────────────────────────────────────────

/// A sensor or actuator transport failure.
///
/// The device is in an unknown state after any of these, so the control
/// worker stops instead of retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    /// The device node could not be opened or configured.
    #[error("cannot open {device}: {detail}")]
    Open { device: String, detail: String },

    /// A light-sensor bus transaction failed.
    #[error("light sensor {op} failed: {detail}")]
    Sensor { op: &'static str, detail: String },

    /// An actuator line write failed.
    #[error("actuator {op} failed: {detail}")]
    Actuator { op: &'static str, detail: String },
}

impl HardwareError {
    pub fn open(device: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        HardwareError::Open {
            device: device.into(),
            detail: detail.to_string(),
        }
    }

    pub fn sensor(op: &'static str, detail: impl std::fmt::Debug) -> Self {
        HardwareError::Sensor {
            op,
            detail: format!("{detail:?}"),
        }
    }

    pub fn actuator(op: &'static str, detail: impl std::fmt::Debug) -> Self {
        HardwareError::Actuator {
            op,
            detail: format!("{detail:?}"),
        }
    }
}

// ── Event multiplexing ────────────────────────────────────────────────────────

/// The event loop lost (or never got) one of its event sources.
///
/// Interrupted waits are retried inside the runtime and never surface here.
#[derive(Debug, Error)]
pub enum MultiplexError {
    #[error("cannot build event loop runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("cannot install {signal} handler: {source}")]
    SignalInstall {
        signal: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("termination signal stream closed")]
    SignalStreamClosed,

    #[error("cannot spawn control worker thread: {0}")]
    WorkerSpawn(#[source] io::Error),
}

// ── Top level ─────────────────────────────────────────────────────────────────

/// Everything that can end a daemon run early.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Multiplex(#[from] MultiplexError),

    #[error("control worker panicked")]
    WorkerPanicked,
}

impl DaemonError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            DaemonError::Config(_) => 2,
            DaemonError::Hardware(_) | DaemonError::Multiplex(_) | DaemonError::WorkerPanicked => 1,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
