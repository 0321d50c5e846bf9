/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hysteresis controller: maps lux samples to an open/closed door state.
//!
//! ```text
//!                  sample >= open
//!   ┌────────┐ ───────────────────► ┌──────┐
//!   │ Closed │                      │ Open │
//!   └────────┘ ◄─────────────────── └──────┘
//!                  sample <= close
//! ```
//!
//! Samples strictly inside the dead zone `(close, open)` never change state
//! and never touch the actuator.
//!
//! The controller itself is owned by the control worker.  Other threads only
//! see a [`StatusSnapshot`] through a cloned [`StatusHandle`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{ConfigError, HardwareError};
use crate::hardware::Actuator;

// ── Door state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

impl DoorState {
    pub fn is_open(self) -> bool {
        self == DoorState::Open
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorState::Closed => f.write_str("closed"),
            DoorState::Open => f.write_str("open"),
        }
    }
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Immutable `(open, close)` pair with `close <= open`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    open_lux: f64,
    close_lux: f64,
}

impl Thresholds {
    /// # Errors
    /// * [`ConfigError::InvalidThreshold`] – NaN, infinite or negative value.
    /// * [`ConfigError::ThresholdOrder`] – `close > open`.
    pub fn new(open_lux: f64, close_lux: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("open", open_lux), ("close", close_lux)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if close_lux > open_lux {
            return Err(ConfigError::ThresholdOrder {
                open: open_lux,
                close: close_lux,
            });
        }
        Ok(Self {
            open_lux,
            close_lux,
        })
    }

    pub fn open_lux(&self) -> f64 {
        self.open_lux
    }

    pub fn close_lux(&self) -> f64 {
        self.close_lux
    }
}

// ── Shared observables ────────────────────────────────────────────────────────

/// Everything the event loop may observe about the controller, published as
/// one unit so readers never see a door state paired with a stale sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusSnapshot {
    pub door: DoorState,
    /// `None` until the first step has run.
    pub last_lux: Option<f64>,
    /// Number of completed control steps.
    pub steps: u64,
}

/// Single-writer / multi-reader handle to the latest [`StatusSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        // The snapshot is plain `Copy` data, so a poisoned lock still holds a
        // consistent value.
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_door_open(&self) -> bool {
        self.snapshot().door.is_open()
    }

    pub fn last_lux(&self) -> Option<f64> {
        self.snapshot().last_lux
    }

    pub(crate) fn publish(&self, snapshot: StatusSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

// ── HysteresisController ──────────────────────────────────────────────────────

/// Door state machine driving an [`Actuator`] on transitions only.
#[derive(Debug)]
pub struct HysteresisController<A> {
    thresholds: Thresholds,
    state: DoorState,
    last_lux: Option<f64>,
    steps: u64,
    actuator: A,
}

impl<A: Actuator> HysteresisController<A> {
    /// Starts in [`DoorState::Closed`].  The actuator is not commanded until
    /// the first transition.
    pub fn new(thresholds: Thresholds, actuator: A) -> Self {
        Self {
            thresholds,
            state: DoorState::Closed,
            last_lux: None,
            steps: 0,
            actuator,
        }
    }

    /// Feeds one sample through the hysteresis rule.
    ///
    /// `last_lux` is recorded whether or not a transition happens.  The new
    /// state is committed only after the actuator accepted the command.
    ///
    /// # Errors
    /// Propagates the actuator's [`HardwareError`]; the controller's own rule
    /// cannot fail.
    pub fn step(&mut self, lux: f64) -> Result<DoorState, HardwareError> {
        self.last_lux = Some(lux);
        self.steps += 1;

        match self.state {
            DoorState::Closed if lux >= self.thresholds.open_lux => {
                self.actuator.activate()?;
                self.state = DoorState::Open;
                debug!(lux, "Door opened");
            }
            DoorState::Open if lux <= self.thresholds.close_lux => {
                self.actuator.deactivate()?;
                self.state = DoorState::Closed;
                debug!(lux, "Door closed");
            }
            _ => {}
        }

        Ok(self.state)
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_door_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn last_lux(&self) -> Option<f64> {
        self.last_lux
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            door: self.state,
            last_lux: self.last_lux,
            steps: self.steps,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
