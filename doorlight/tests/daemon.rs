/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end runs of the daemon with replay hardware.

use std::thread;
use std::time::{Duration, Instant};

use doorlight::config::ControllerConfig;
use doorlight::daemon::Daemon;
use doorlight::error::{ConfigError, DaemonError, HardwareError};
use doorlight::hardware::replay::{RecordingActuator, ReplaySensor};

fn fast_config() -> ControllerConfig {
    ControllerConfig {
        interval: Duration::from_millis(5),
        ..Default::default()
    }
}

#[test]
fn cancel_token_gives_clean_shutdown() {
    let daemon = Daemon::new(fast_config()).unwrap();
    let cancel = daemon.cancel_token();

    let actuator = RecordingActuator::new();
    let log = actuator.log();
    let sensor = ReplaySensor::cycle([0.0, 35.0, 20.0, 5.0]);

    let stopper = thread::spawn(move || {
        // Let the door cycle at least once before stopping.
        let deadline = Instant::now() + Duration::from_secs(5);
        while log.deactivations() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        cancel.cancel();
        log
    });

    daemon.run(sensor, actuator).unwrap();
    let log = stopper.join().unwrap();

    assert!(log.activations() >= 1);
    assert!(log.deactivations() >= 1);
    // transitions alternate, so counts never drift apart by more than one
    assert!(log.activations() - log.deactivations() <= 1);
}

#[test]
fn sensor_failure_ends_run_with_hardware_error() {
    let daemon = Daemon::new(fast_config()).unwrap();
    let sensor = ReplaySensor::cycle([1.0]).fail_after(3);

    let started = Instant::now();
    let err = daemon.run(sensor, RecordingActuator::new()).unwrap_err();

    assert!(matches!(
        err,
        DaemonError::Hardware(HardwareError::Sensor { .. })
    ));
    assert_eq!(err.exit_code(), 1);
    // the loop noticed the dead worker instead of ticking forever
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn actuator_failure_ends_run_with_hardware_error() {
    let daemon = Daemon::new(fast_config()).unwrap();
    let err = daemon
        .run(ReplaySensor::cycle([100.0]), RecordingActuator::failing())
        .unwrap_err();
    assert!(matches!(
        err,
        DaemonError::Hardware(HardwareError::Actuator { .. })
    ));
}

#[test]
fn invalid_config_is_rejected_before_hardware() {
    let config = ControllerConfig {
        open_lux: 5.0,
        close_lux: 10.0,
        ..Default::default()
    };
    let err = Daemon::new(config).err().unwrap();
    assert!(matches!(
        err,
        DaemonError::Config(ConfigError::ThresholdOrder { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}
