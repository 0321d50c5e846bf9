/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Daemon wiring: builds the event sources, starts the worker, runs the event
//! loop and tears everything down in order.
//!
//! ```text
//! Daemon::new()          runtime (timer driver) + cancellation token
//!   .install_signals()   SIGINT / SIGTERM handlers
//!   .run(sensor, actuator)
//!        ├─ spawn ControlWorker (owns sensor + controller + actuator)
//!        ├─ block_on(EventLoop::run)
//!        └─ shutdown: request stop → join worker (hardware dropped)
//!                     → report a final door change
//!                     → event sources dropped with the Daemon
//! ```
//!
//! Hardware is opened by the caller *between* [`Daemon::new`] and
//! [`Daemon::run`], so a configuration or event-source failure never touches
//! it.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::controller::{HysteresisController, StatusHandle};
use crate::error::{DaemonError, MultiplexError};
use crate::event_loop::{EventLoop, LoopExit};
use crate::hardware::{Actuator, LightSensor};
use crate::signals::TerminationSignals;
use crate::tick::TickChannel;
use crate::worker::ControlWorker;

pub struct Daemon {
    config: ControllerConfig,
    runtime: Runtime,
    cancel: CancellationToken,
    signals: Option<TerminationSignals>,
}

impl Daemon {
    /// Validates `config` and builds the single-threaded event-loop runtime.
    ///
    /// # Errors
    /// * [`DaemonError::Config`] – invalid configuration.
    /// * [`DaemonError::Multiplex`] – the runtime could not be built.
    pub fn new(config: ControllerConfig) -> Result<Self, DaemonError> {
        config.validate()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(MultiplexError::Runtime)?;
        Ok(Self {
            config,
            runtime,
            cancel: CancellationToken::new(),
            signals: None,
        })
    }

    /// Installs SIGINT / SIGTERM as shutdown sources.
    pub fn install_signals(&mut self) -> Result<(), DaemonError> {
        let _guard = self.runtime.enter();
        self.signals = Some(TerminationSignals::install()?);
        Ok(())
    }

    /// Token that stops the daemon when cancelled, from any thread.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Runs the control loop until shutdown.
    ///
    /// Returns `Ok(())` for a requested shutdown (signal or token).
    ///
    /// # Errors
    /// * [`DaemonError::Hardware`] – the worker died on a sensor/actuator
    ///   failure.
    /// * [`DaemonError::Multiplex`] – the event loop lost an event source.
    /// * [`DaemonError::WorkerPanicked`] – the worker thread panicked.
    pub fn run<S, A>(self, sensor: S, actuator: A) -> Result<(), DaemonError>
    where
        S: LightSensor + Send + 'static,
        A: Actuator + Send + 'static,
    {
        let Daemon {
            config,
            runtime,
            cancel,
            signals,
        } = self;

        let thresholds = config.thresholds()?;
        let controller = HysteresisController::new(thresholds, actuator);
        let channel = Arc::new(TickChannel::new());
        let status = StatusHandle::new();

        let (worker, worker_exited) = ControlWorker::spawn(
            sensor,
            controller,
            Arc::clone(&channel),
            status.clone(),
            cancel.clone(),
        )?;

        let mut event_loop = EventLoop::new(config.interval, channel, status, cancel.clone());
        if let Some(signals) = signals {
            event_loop = event_loop.with_signals(signals);
        }

        let loop_result = runtime.block_on(event_loop.run(worker_exited));

        // Strict order: stop + join the worker (releases hardware) before the
        // runtime and signal handlers go away.
        cancel.cancel();
        let worker_result = worker.shutdown();
        // The worker may have stepped between the last tick and the join.
        event_loop.observe_change();
        drop(event_loop);
        drop(runtime);
        debug!("Event sources released");

        match (loop_result, worker_result) {
            (_, Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e.into()),
            (Ok(LoopExit::Stopped), Ok(())) => {
                info!("Shutdown complete");
                Ok(())
            }
            (Ok(LoopExit::WorkerExited), Ok(())) => {
                // The worker only ends cleanly once stop was requested.
                info!("Control worker ended after stop request");
                Ok(())
            }
        }
    }
}
