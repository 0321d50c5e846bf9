/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Control worker: the one thread that touches hardware.
//!
//! ```text
//!   loop {
//!       match channel.await_event() {
//!           Stop => break,
//!           Tick => controller.step(sensor.read_lux()?)?,   // then publish status
//!       }
//!   }
//! ```
//!
//! # Ownership
//! The sensor and the controller (with its actuator) are **moved** into the
//! worker thread and dropped when it ends, so the hardware is always released
//! before [`ControlWorker::shutdown`] returns, on every exit path.
//!
//! # Failure
//! A [`HardwareError`] ends the loop immediately; there is no retry.  The
//! thread's exit (for any reason, panics included) fires the oneshot returned
//! by [`ControlWorker::spawn`], so the event loop stops ticking a dead worker.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::controller::{HysteresisController, StatusHandle};
use crate::error::{DaemonError, HardwareError, MultiplexError};
use crate::hardware::{Actuator, LightSensor};
use crate::tick::{TickChannel, TickEvent};

const THREAD_NAME: &str = "control-worker";

/// Receiver side of the worker's exit notification.
pub type WorkerExited = oneshot::Receiver<()>;

// ── Exit notice ───────────────────────────────────────────────────────────────

/// Fires the exit notification when dropped, i.e. whenever the worker
/// closure unwinds or returns.
struct ExitNotice(Option<oneshot::Sender<()>>);

impl Drop for ExitNotice {
    fn drop(&mut self) {
        if let Some(tx) = self.0.take() {
            // The event loop may already be gone; that is fine.
            let _ = tx.send(());
        }
    }
}

// ── ControlWorker ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ControlWorker {
    channel: Arc<TickChannel>,
    handle: JoinHandle<Result<(), HardwareError>>,
}

impl ControlWorker {
    /// Spawns the worker thread.
    ///
    /// # Errors
    /// [`MultiplexError::WorkerSpawn`] if the OS refuses to create the thread.
    pub fn spawn<S, A>(
        sensor: S,
        controller: HysteresisController<A>,
        channel: Arc<TickChannel>,
        status: StatusHandle,
        cancel: CancellationToken,
    ) -> Result<(Self, WorkerExited), MultiplexError>
    where
        S: LightSensor + Send + 'static,
        A: Actuator + Send + 'static,
    {
        let (exit_tx, exit_rx) = oneshot::channel();
        let thread_channel = Arc::clone(&channel);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let _notice = ExitNotice(Some(exit_tx));
                let result = run_loop(sensor, controller, &thread_channel, &status, &cancel);
                match &result {
                    Ok(()) => info!("Control worker stopped"),
                    Err(e) => error!(error = %e, "Control worker failed"),
                }
                result
            })
            .map_err(MultiplexError::WorkerSpawn)?;

        debug!("Control worker spawned");
        Ok((Self { channel, handle }, exit_rx))
    }

    /// `true` once the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Requests stop, waits for the current step (if any) to finish and joins
    /// the thread.
    ///
    /// # Errors
    /// * [`DaemonError::Hardware`] – the worker had already died on a
    ///   hardware failure.
    /// * [`DaemonError::WorkerPanicked`] – the worker thread panicked.
    pub fn shutdown(self) -> Result<(), DaemonError> {
        self.channel.request_stop();
        match self.handle.join() {
            Ok(result) => result.map_err(DaemonError::from),
            Err(_) => Err(DaemonError::WorkerPanicked),
        }
    }
}

fn run_loop<S, A>(
    mut sensor: S,
    mut controller: HysteresisController<A>,
    channel: &TickChannel,
    status: &StatusHandle,
    cancel: &CancellationToken,
) -> Result<(), HardwareError>
where
    S: LightSensor,
    A: Actuator,
{
    debug!("Control worker waiting for ticks");
    loop {
        match channel.await_event() {
            TickEvent::Stop => return Ok(()),
            TickEvent::Tick if cancel.is_cancelled() => return Ok(()),
            TickEvent::Tick => {
                let lux = sensor.read_lux()?;
                let door = controller.step(lux)?;
                status.publish(controller.snapshot());
                debug!(lux, %door, "Control step");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{DoorState, Thresholds};
    use crate::hardware::replay::{ActuationLog, RecordingActuator, ReplaySensor};
    use std::time::{Duration, Instant};

    // ── Test helpers ──────────────────────────────────────────────────────────

    struct Harness {
        worker: ControlWorker,
        exited: WorkerExited,
        channel: Arc<TickChannel>,
        status: StatusHandle,
        log: ActuationLog,
        cancel: CancellationToken,
    }

    fn start(sensor: ReplaySensor) -> Harness {
        start_with(sensor, RecordingActuator::new())
    }

    fn start_with(sensor: ReplaySensor, actuator: RecordingActuator) -> Harness {
        let log = actuator.log();
        let controller = HysteresisController::new(Thresholds::new(30.0, 10.0).unwrap(), actuator);
        let channel = Arc::new(TickChannel::new());
        let status = StatusHandle::new();
        let cancel = CancellationToken::new();
        let (worker, exited) = ControlWorker::spawn(
            sensor,
            controller,
            Arc::clone(&channel),
            status.clone(),
            cancel.clone(),
        )
        .unwrap();
        Harness {
            worker,
            exited,
            channel,
            status,
            log,
            cancel,
        }
    }

    /// Polls `cond` for up to two seconds.
    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    /// Sends one tick and waits until it has been fully processed.
    fn tick_and_wait(h: &Harness) {
        let before = h.status.snapshot().steps;
        h.channel.notify_tick();
        assert!(wait_until(|| h.status.snapshot().steps > before));
    }

    // ── Stepping ──────────────────────────────────────────────────────────────

    #[test]
    fn each_tick_runs_one_step() {
        let h = start(ReplaySensor::once([0.0, 35.0, 20.0, 9.0]));

        tick_and_wait(&h);
        assert_eq!(h.status.snapshot().door, DoorState::Closed);
        tick_and_wait(&h);
        assert!(h.status.is_door_open());
        assert_eq!(h.status.last_lux(), Some(35.0));
        tick_and_wait(&h);
        tick_and_wait(&h);
        assert!(!h.status.is_door_open());
        assert_eq!(h.status.last_lux(), Some(9.0));

        assert_eq!(h.log.activations(), 1);
        assert_eq!(h.log.deactivations(), 1);
        h.worker.shutdown().unwrap();
    }

    #[test]
    fn no_step_without_tick() {
        let h = start(ReplaySensor::cycle([50.0]));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(h.status.snapshot().steps, 0);
        assert!(h.log.calls().is_empty());
        h.worker.shutdown().unwrap();
    }

    #[test]
    fn coalesced_ticks_yield_at_least_one_more_step() {
        // Every read takes 50 ms, so ticks pile up while the worker is busy.
        let h = start(ReplaySensor::cycle([5.0]).with_delay(Duration::from_millis(50)));

        h.channel.notify_tick();
        // wait until the first step is underway (tick consumed)
        assert!(wait_until(|| !h.channel.is_tick_pending()));
        for _ in 0..5 {
            h.channel.notify_tick();
        }

        assert!(wait_until(|| h.status.snapshot().steps >= 2));
        h.worker.shutdown().unwrap();
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    #[test]
    fn stop_exits_cleanly_and_fires_exit_notice() {
        let mut h = start(ReplaySensor::cycle([1.0]));
        h.channel.request_stop();
        assert!(wait_until(|| h.worker.is_finished()));
        assert!(h.exited.try_recv().is_ok());
        h.worker.shutdown().unwrap();
    }

    #[test]
    fn cancelled_token_turns_tick_into_exit() {
        let h = start(ReplaySensor::cycle([50.0]));
        h.cancel.cancel();
        h.channel.notify_tick();
        assert!(wait_until(|| h.worker.is_finished()));
        assert_eq!(h.status.snapshot().steps, 0);
        h.worker.shutdown().unwrap();
    }

    // ── Failure ───────────────────────────────────────────────────────────────

    #[test]
    fn sensor_failure_ends_worker_with_hardware_error() {
        let mut h = start(ReplaySensor::cycle([1.0]).fail_after(1));
        tick_and_wait(&h);
        h.channel.notify_tick();

        assert!(wait_until(|| h.worker.is_finished()));
        assert!(h.exited.try_recv().is_ok());
        let err = h.worker.shutdown().unwrap_err();
        assert!(matches!(
            err,
            DaemonError::Hardware(HardwareError::Sensor { .. })
        ));
    }

    #[test]
    fn actuator_failure_ends_worker_with_hardware_error() {
        let h = start_with(ReplaySensor::cycle([50.0]), RecordingActuator::failing());
        h.channel.notify_tick();
        assert!(wait_until(|| h.worker.is_finished()));
        let err = h.worker.shutdown().unwrap_err();
        assert!(matches!(
            err,
            DaemonError::Hardware(HardwareError::Actuator { .. })
        ));
    }
}
