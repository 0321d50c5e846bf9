/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Door light controller
//!
//! Samples ambient light on a fixed cadence, applies hysteresis to decide
//! whether the door is open, and drives a binary output accordingly.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/       – defaults, YAML config file, validation
//! ├── controller    – hysteresis state machine + shared status snapshot
//! ├── daemon        – wiring and ordered shutdown
//! ├── error         – ConfigError / HardwareError / MultiplexError
//! ├── event_loop    – main-thread select over timer, signals, worker exit
//! ├── hardware/     – sensor / actuator ports, BH1750, GPIO, test doubles
//! ├── signals       – SIGINT / SIGTERM source
//! ├── tick          – coalescing tick / stop channel
//! └── worker        – control worker thread
//! ```

pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod event_loop;
pub mod hardware;
pub mod signals;
pub mod tick;
pub mod worker;
