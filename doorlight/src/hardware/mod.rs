/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Port traits between the control core and the physical world.
//!
//! ```text
//!   LightSensor ──► HysteresisController ──► Actuator
//! ```
//!
//! Implementations:
//!
//! | Port | Hardware | Test double |
//! |---|---|---|
//! | [`LightSensor`] | [`bh1750::Bh1750`] over any `embedded-hal` I2C bus | [`replay::ReplaySensor`] |
//! | [`Actuator`] | [`relay::GpioActuator`] over any `embedded-hal` output pin | [`replay::RecordingActuator`] |
//!
//! On Linux, [`linux`] opens the character devices behind both.

pub mod bh1750;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod relay;
pub mod replay;

use crate::error::HardwareError;

/// Read-side port: one illuminance sample per call.
pub trait LightSensor {
    /// Returns the current light level in lux (never negative).
    fn read_lux(&mut self) -> Result<f64, HardwareError>;
}

/// Write-side port: a binary output.
///
/// The controller only calls these on real transitions, but implementations
/// must tolerate repeated calls.
pub trait Actuator {
    fn activate(&mut self) -> Result<(), HardwareError>;
    fn deactivate(&mut self) -> Result<(), HardwareError>;
}

impl<S: LightSensor + ?Sized> LightSensor for Box<S> {
    fn read_lux(&mut self) -> Result<f64, HardwareError> {
        (**self).read_lux()
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn activate(&mut self) -> Result<(), HardwareError> {
        (**self).activate()
    }

    fn deactivate(&mut self) -> Result<(), HardwareError> {
        (**self).deactivate()
    }
}
