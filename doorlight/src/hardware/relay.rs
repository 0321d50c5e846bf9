/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Binary GPIO actuator with configurable polarity.

use embedded_hal::digital::{Error as _, OutputPin};

use crate::error::HardwareError;
use crate::hardware::Actuator;

/// Which physical level means "on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }

    /// Physical level (`true` = high) for the logical state `on`.
    pub fn level(self, on: bool) -> bool {
        match self {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        }
    }
}

/// Drives one output pin; [`activate`](Actuator::activate) means "light on".
#[derive(Debug)]
pub struct GpioActuator<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin> GpioActuator<P> {
    /// Takes ownership of `pin` and drives it to the inactive level.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self, HardwareError> {
        let mut actuator = Self { pin, polarity };
        actuator.drive(false, "init")?;
        Ok(actuator)
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    fn drive(&mut self, on: bool, op: &'static str) -> Result<(), HardwareError> {
        let result = if self.polarity.level(on) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| HardwareError::actuator(op, e.kind()))
    }
}

impl<P: OutputPin> Actuator for GpioActuator<P> {
    fn activate(&mut self) -> Result<(), HardwareError> {
        self.drive(true, "activate")
    }

    fn deactivate(&mut self) -> Result<(), HardwareError> {
        self.drive(false, "deactivate")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
