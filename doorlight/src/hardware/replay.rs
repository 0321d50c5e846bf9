/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deterministic stand-ins for the sensor and actuator.
//!
//! [`ReplaySensor`] plays back a fixed lux sequence; [`RecordingActuator`]
//! logs every command into an [`ActuationLog`] that stays readable from other
//! threads after the actuator itself has been moved into the control worker.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::HardwareError;
use crate::hardware::{Actuator, LightSensor};

// ── ReplaySensor ──────────────────────────────────────────────────────────────

/// What happens once the sequence is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Keep returning the last sample.
    HoldLast,
    /// Start over from the first sample.
    Cycle,
}

#[derive(Debug, Clone)]
pub struct ReplaySensor {
    samples: Vec<f64>,
    mode: ReplayMode,
    next: usize,
    reads: u64,
    fail_after: Option<u64>,
    delay: Option<Duration>,
}

impl ReplaySensor {
    /// Plays `samples` once, then holds the last value.  An empty sequence
    /// reads `0.0`.
    pub fn once(samples: impl Into<Vec<f64>>) -> Self {
        Self::with_mode(samples.into(), ReplayMode::HoldLast)
    }

    /// Plays `samples` forever.
    pub fn cycle(samples: impl Into<Vec<f64>>) -> Self {
        Self::with_mode(samples.into(), ReplayMode::Cycle)
    }

    fn with_mode(samples: Vec<f64>, mode: ReplayMode) -> Self {
        Self {
            samples,
            mode,
            next: 0,
            reads: 0,
            fail_after: None,
            delay: None,
        }
    }

    /// Every read after the first `reads` successful ones fails.
    pub fn fail_after(mut self, reads: u64) -> Self {
        self.fail_after = Some(reads);
        self
    }

    /// Blocks the calling thread for `delay` on every read, like a slow bus.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl LightSensor for ReplaySensor {
    fn read_lux(&mut self) -> Result<f64, HardwareError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_after.is_some_and(|limit| self.reads >= limit) {
            return Err(HardwareError::sensor("read", "replay exhausted"));
        }
        self.reads += 1;

        let Some(&last) = self.samples.last() else {
            return Ok(0.0);
        };
        if self.next >= self.samples.len() {
            match self.mode {
                ReplayMode::HoldLast => return Ok(last),
                ReplayMode::Cycle => self.next = 0,
            }
        }
        let lux = self.samples[self.next];
        self.next += 1;
        Ok(lux)
    }
}

// ── RecordingActuator ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    Activate,
    Deactivate,
}

/// Shared, cloneable view of the commands an actuator received.
#[derive(Debug, Clone, Default)]
pub struct ActuationLog {
    calls: Arc<Mutex<Vec<Actuation>>>,
}

impl ActuationLog {
    pub fn calls(&self) -> Vec<Actuation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn activations(&self) -> usize {
        self.count(Actuation::Activate)
    }

    pub fn deactivations(&self) -> usize {
        self.count(Actuation::Deactivate)
    }

    /// `true` if the most recent command was an activation.
    pub fn is_active(&self) -> bool {
        self.calls().last() == Some(&Actuation::Activate)
    }

    fn count(&self, kind: Actuation) -> usize {
        self.calls().iter().filter(|&&c| c == kind).count()
    }

    fn push(&self, call: Actuation) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[derive(Debug, Default)]
pub struct RecordingActuator {
    log: ActuationLog,
    fail: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An actuator whose every command fails (nothing is recorded).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> ActuationLog {
        self.log.clone()
    }

    fn record(&mut self, call: Actuation, op: &'static str) -> Result<(), HardwareError> {
        if self.fail {
            return Err(HardwareError::actuator(op, "line write rejected"));
        }
        self.log.push(call);
        Ok(())
    }
}

impl Actuator for RecordingActuator {
    fn activate(&mut self) -> Result<(), HardwareError> {
        self.record(Actuation::Activate, "activate")
    }

    fn deactivate(&mut self) -> Result<(), HardwareError> {
        self.record(Actuation::Deactivate, "deactivate")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
