/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Linux character-device backing for the ports.
//!
//! * Sensor: `/dev/i2c-N` through [`linux_embedded_hal::I2cdev`].
//! * Actuator: one line of `/dev/gpiochipN` requested as an output through
//!   `gpio-cdev`, wrapped in [`linux_embedded_hal::CdevPin`].
//!
//! Both handles close their file descriptors on drop, so releasing the
//! hardware is just dropping the port.

use gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, I2cdev};
use tracing::info;

use crate::config::ControllerConfig;
use crate::error::HardwareError;
use crate::hardware::bh1750::Bh1750;
use crate::hardware::relay::{GpioActuator, Polarity};

/// Consumer label shown by `gpioinfo` for the requested line.
const GPIO_CONSUMER: &str = "doorlight";

pub type LinuxSensor = Bh1750<I2cdev>;
pub type LinuxActuator = GpioActuator<CdevPin>;

/// Opens the I2C bus and initialises the BH1750 on it.
pub fn open_sensor(config: &ControllerConfig) -> Result<LinuxSensor, HardwareError> {
    let device = config.i2c_device.display().to_string();
    let bus = I2cdev::new(&config.i2c_device).map_err(|e| HardwareError::open(&device, e))?;
    let sensor = Bh1750::new(bus, config.i2c_address)?;
    info!(device = %device, address = %format!("{:#04x}", config.i2c_address), "Light sensor ready");
    Ok(sensor)
}

/// Requests the configured GPIO line as an output, initially inactive.
pub fn open_actuator(config: &ControllerConfig) -> Result<LinuxActuator, HardwareError> {
    let chip_path = config.gpio_chip_path();
    let device = format!("{}:{}", chip_path.display(), config.gpio_line);
    let polarity = Polarity::from_active_low(config.active_low);

    let mut chip = Chip::new(&chip_path).map_err(|e| HardwareError::open(&device, e))?;
    let line = chip
        .get_line(config.gpio_line)
        .map_err(|e| HardwareError::open(&device, e))?;
    let inactive = u8::from(polarity.level(false));
    let handle = line
        .request(LineRequestFlags::OUTPUT, inactive, GPIO_CONSUMER)
        .map_err(|e| HardwareError::open(&device, e))?;
    let pin = CdevPin::new(handle).map_err(|e| HardwareError::open(&device, e))?;

    let actuator = GpioActuator::new(pin, polarity)?;
    info!(device = %device, ?polarity, "Actuator line ready");
    Ok(actuator)
}
