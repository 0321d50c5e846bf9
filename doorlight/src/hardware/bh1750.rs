/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! BH1750 ambient light sensor over an `embedded-hal` I2C bus.
//!
//! The sensor is put in continuous high-resolution mode at construction;
//! every [`read_lux`](LightSensor::read_lux) then fetches the latest
//! conversion (two bytes, big-endian) and scales it to lux.

use embedded_hal::i2c::{Error as _, I2c, SevenBitAddress};

use crate::error::HardwareError;
use crate::hardware::LightSensor;

// ── Constants ─────────────────────────────────────────────────────────────────

const CMD_POWER_ON: u8 = 0x01;
const CMD_RESET: u8 = 0x07;
const CMD_CONTINUOUS_HIGH_RES: u8 = 0x10;

/// Raw count → lux divisor from the BH1750 datasheet (typical accuracy 1.2).
const LUX_DIVISOR: f64 = 1.2;

// ── Driver ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Bh1750<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C: I2c> Bh1750<I2C> {
    /// Powers the sensor on, resets its data register and starts continuous
    /// high-resolution measurement.
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Result<Self, HardwareError> {
        let mut sensor = Self { i2c, address };
        sensor.write_command(CMD_POWER_ON)?;
        sensor.write_command(CMD_RESET)?;
        sensor.write_command(CMD_CONTINUOUS_HIGH_RES)?;
        Ok(sensor)
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_command(&mut self, cmd: u8) -> Result<(), HardwareError> {
        self.i2c
            .write(self.address, &[cmd])
            .map_err(|e| HardwareError::sensor("write command", e.kind()))
    }
}

impl<I2C: I2c> LightSensor for Bh1750<I2C> {
    fn read_lux(&mut self) -> Result<f64, HardwareError> {
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| HardwareError::sensor("read", e.kind()))?;
        Ok(raw_to_lux(u16::from_be_bytes(buf)))
    }
}

fn raw_to_lux(raw: u16) -> f64 {
    f64::from(raw) / LUX_DIVISOR
}

// ── Tests ─────────────────────────────────────────────────────────────────────
