/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Termination by a real SIGTERM.  Kept in its own test binary so the
//! installed handlers and the signal stay inside this process.

#![cfg(unix)]

use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use doorlight::config::ControllerConfig;
use doorlight::daemon::Daemon;
use doorlight::hardware::replay::{RecordingActuator, ReplaySensor};

#[test]
fn sigterm_stops_the_daemon_cleanly() {
    let config = ControllerConfig {
        interval: Duration::from_millis(5),
        ..Default::default()
    };
    let mut daemon = Daemon::new(config).unwrap();
    daemon.install_signals().unwrap();

    let actuator = RecordingActuator::new();
    let log = actuator.log();
    let sensor = ReplaySensor::cycle([0.0, 35.0, 20.0, 5.0]);

    let sender = {
        let log = log.clone();
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(5);
            while log.activations() == 0 && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            Command::new("kill")
                .args(["-TERM", &std::process::id().to_string()])
                .status()
                .unwrap()
        })
    };

    let started = Instant::now();
    daemon.run(sensor, actuator).unwrap();

    assert!(sender.join().unwrap().success());
    assert!(log.activations() >= 1);
    assert!(started.elapsed() < Duration::from_secs(10));
}
