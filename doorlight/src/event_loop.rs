/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Event loop: the main thread's single multiplexed wait.
//!
//! Four sources feed one `tokio::select!`:
//!
//! | Source | Reaction |
//! |---|---|
//! | periodic timer | `notify_tick()`, then log a door change if one was observed |
//! | SIGINT / SIGTERM | log `Stopping`, cancel the shared token, exit |
//! | cancellation token | exit (someone else requested shutdown) |
//! | worker exit notice | exit at once, the worker is gone |
//!
//! The loop never touches hardware and never mutates controller state; it
//! only reads [`StatusHandle`] snapshots.  Joining the worker is left to the
//! caller so the join happens after the loop has stopped polling; the caller
//! then calls [`EventLoop::observe_change`] once more so a change made on the
//! worker's final step is still reported.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::{DoorState, StatusHandle};
use crate::error::MultiplexError;
use crate::signals::TerminationSignals;
use crate::tick::TickChannel;
use crate::worker::WorkerExited;

/// Why [`EventLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A termination signal arrived or the token was cancelled.
    Stopped,
    /// The control worker ended on its own.
    WorkerExited,
}

/// A door transition the loop has reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorChange {
    pub door: DoorState,
    pub lux: f64,
}

pub struct EventLoop {
    interval: Duration,
    channel: Arc<TickChannel>,
    status: StatusHandle,
    cancel: CancellationToken,
    signals: Option<TerminationSignals>,
    last_door: DoorState,
    ticks: u64,
}

impl EventLoop {
    pub fn new(
        interval: Duration,
        channel: Arc<TickChannel>,
        status: StatusHandle,
        cancel: CancellationToken,
    ) -> Self {
        let last_door = status.snapshot().door;
        Self {
            interval,
            channel,
            status,
            cancel,
            signals: None,
            last_door,
            ticks: 0,
        }
    }

    /// Adds OS termination signals as a shutdown source.
    pub fn with_signals(mut self, signals: TerminationSignals) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Runs until shutdown is requested or the worker exits.
    ///
    /// # Errors
    /// [`MultiplexError`] if the signal source fails; the token is cancelled
    /// before returning so the worker also winds down.
    pub async fn run(&mut self, mut worker_exited: WorkerExited) -> Result<LoopExit, MultiplexError> {
        // First expiry one full interval after start, like a periodic timerfd.
        let mut timer = time::interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = self.interval.as_millis() as u64, "Event loop running");

        let exit = loop {
            // Shutdown sources are polled before the timer.
            tokio::select! {
                biased;

                signal = next_signal(&mut self.signals) => match signal {
                    Ok(name) => {
                        info!(signal = name, "Stopping");
                        self.cancel.cancel();
                        break LoopExit::Stopped;
                    }
                    Err(e) => {
                        self.cancel.cancel();
                        return Err(e);
                    }
                },

                _ = self.cancel.cancelled() => {
                    info!("Stopping");
                    break LoopExit::Stopped;
                }

                _ = &mut worker_exited => {
                    warn!("Control worker exited, leaving event loop");
                    self.cancel.cancel();
                    break LoopExit::WorkerExited;
                }

                _ = timer.tick() => {
                    self.on_tick();
                }
            }
        };

        self.observe_change();
        debug!(ticks = self.ticks, ?exit, "Event loop finished");
        Ok(exit)
    }

    fn on_tick(&mut self) -> Option<DoorChange> {
        self.ticks += 1;
        self.channel.notify_tick();
        self.observe_change()
    }

    /// Logs `door=<state> lux=<v>` if the published door state differs from
    /// the last one reported, and returns that change.
    pub fn observe_change(&mut self) -> Option<DoorChange> {
        let snapshot = self.status.snapshot();
        if snapshot.door == self.last_door {
            return None;
        }
        let change = DoorChange {
            door: snapshot.door,
            lux: snapshot.last_lux.unwrap_or_default(),
        };
        info!("door={} lux={}", change.door, change.lux);
        self.last_door = snapshot.door;
        Some(change)
    }

    /// Door state as last reported in the log.
    pub fn reported_door(&self) -> DoorState {
        self.last_door
    }
}

/// Resolves with the next termination signal, or never when signals are not
/// part of this loop.
async fn next_signal(
    signals: &mut Option<TerminationSignals>,
) -> Result<&'static str, MultiplexError> {
    match signals {
        Some(s) => s.recv().await,
        None => future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{HysteresisController, StatusSnapshot, Thresholds};
    use crate::hardware::replay::{RecordingActuator, ReplaySensor};
    use crate::worker::ControlWorker;
    use tokio::sync::oneshot;

    const TICK: Duration = Duration::from_millis(5);

    fn channel_and_status() -> (Arc<TickChannel>, StatusHandle) {
        (Arc::new(TickChannel::new()), StatusHandle::new())
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let (channel, status) = channel_and_status();
        let cancel = CancellationToken::new();
        let (_tx, rx) = oneshot::channel();

        let mut ev = EventLoop::new(TICK, Arc::clone(&channel), status, cancel.clone());
        let handle = tokio::spawn(async move { ev.run(rx).await });

        time::sleep(TICK * 4).await;
        cancel.cancel();

        let exit = handle.await.unwrap().unwrap();
        assert_eq!(exit, LoopExit::Stopped);
    }

    #[tokio::test]
    async fn timer_notifies_tick_channel() {
        let (channel, status) = channel_and_status();
        let cancel = CancellationToken::new();
        let (_tx, rx) = oneshot::channel();

        let mut ev = EventLoop::new(TICK, Arc::clone(&channel), status, cancel.clone());
        let handle = tokio::spawn(async move { ev.run(rx).await });

        time::sleep(TICK * 4).await;
        assert!(channel.is_tick_pending());

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn worker_exit_ends_loop_and_cancels_token() {
        let (channel, status) = channel_and_status();
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let mut ev = EventLoop::new(Duration::from_secs(60), channel, status, cancel.clone());
        let handle = tokio::spawn(async move { ev.run(rx).await });
        tx.send(()).unwrap();

        let exit = handle.await.unwrap().unwrap();
        assert_eq!(exit, LoopExit::WorkerExited);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn drives_worker_end_to_end() {
        let (channel, status) = channel_and_status();
        let cancel = CancellationToken::new();

        let actuator = RecordingActuator::new();
        let log = actuator.log();
        let controller = HysteresisController::new(Thresholds::new(30.0, 10.0).unwrap(), actuator);
        let (worker, exited) = ControlWorker::spawn(
            ReplaySensor::once([0.0, 35.0]),
            controller,
            Arc::clone(&channel),
            status.clone(),
            cancel.clone(),
        )
        .unwrap();

        let mut ev = EventLoop::new(TICK, channel, status.clone(), cancel.clone());
        let handle = tokio::spawn(async move { ev.run(exited).await });

        // Wait (bounded) for the door to open.
        for _ in 0..400 {
            if status.is_door_open() {
                break;
            }
            time::sleep(TICK).await;
        }
        cancel.cancel();

        assert_eq!(handle.await.unwrap().unwrap(), LoopExit::Stopped);
        worker.shutdown().unwrap();
        assert!(status.is_door_open());
        assert_eq!(log.activations(), 1);
    }

    fn published(status: &StatusHandle, door: DoorState, lux: f64, steps: u64) {
        status.publish(StatusSnapshot {
            door,
            last_lux: Some(lux),
            steps,
        });
    }

    #[test]
    fn change_is_reported_once_then_dead_zone_is_silent() {
        let (channel, status) = channel_and_status();
        let mut ev = EventLoop::new(TICK, channel, status.clone(), CancellationToken::new());

        published(&status, DoorState::Closed, 5.0, 1);
        assert_eq!(ev.on_tick(), None);

        published(&status, DoorState::Open, 31.0, 2);
        assert_eq!(
            ev.on_tick(),
            Some(DoorChange {
                door: DoorState::Open,
                lux: 31.0
            })
        );
        assert_eq!(ev.reported_door(), DoorState::Open);

        // same tick observed again, then samples inside the dead zone
        assert_eq!(ev.on_tick(), None);
        for (i, lux) in [20.0, 12.0, 29.0].into_iter().enumerate() {
            published(&status, DoorState::Open, lux, 3 + i as u64);
            assert_eq!(ev.on_tick(), None);
        }

        published(&status, DoorState::Closed, 9.0, 6);
        assert_eq!(
            ev.on_tick(),
            Some(DoorChange {
                door: DoorState::Closed,
                lux: 9.0
            })
        );
    }

    #[tokio::test]
    async fn change_on_final_step_is_reported_on_exit() {
        let (channel, status) = channel_and_status();
        let cancel = CancellationToken::new();
        let (_tx, rx) = oneshot::channel();

        // Long interval: the loop never ticks before the token is cancelled.
        let mut ev = EventLoop::new(Duration::from_secs(60), channel, status.clone(), cancel.clone());
        published(&status, DoorState::Open, 42.0, 1);
        cancel.cancel();

        assert_eq!(ev.run(rx).await.unwrap(), LoopExit::Stopped);
        assert_eq!(ev.reported_door(), DoorState::Open);
        assert_eq!(ev.observe_change(), None);
    }
}
