/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Coalescing tick / stop notification between the event loop and the
//! control worker.
//!
//! Two independent pending flags sit behind one mutex:
//!
//! ```text
//!   event loop ──notify_tick()──►  [tick]  ──┐
//!                                             ├──► await_event() ──► control worker
//!   event loop ──request_stop()─►  [stop]  ──┘         (Stop wins)
//! ```
//!
//! * Producers never block beyond the brief flag update.
//! * Repeated ticks before the worker consumes one collapse into a single
//!   pending tick; nothing queues.
//! * `Stop` is sticky: once requested, every later wait returns `Stop`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// What woke the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Tick,
    Stop,
}

#[derive(Debug, Default)]
struct Pending {
    tick: bool,
    stop: bool,
}

impl Pending {
    /// Consumes the highest-priority pending event, if any.
    fn take(&mut self) -> Option<TickEvent> {
        if self.stop {
            Some(TickEvent::Stop)
        } else if self.tick {
            self.tick = false;
            Some(TickEvent::Tick)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct TickChannel {
    pending: Mutex<Pending>,
    wake: Condvar,
}

impl TickChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a tick as pending.  Never blocks on the consumer.
    pub fn notify_tick(&self) {
        self.lock().tick = true;
        self.wake.notify_one();
    }

    /// Marks stop as pending.  Takes priority over any pending tick.
    pub fn request_stop(&self) {
        self.lock().stop = true;
        self.wake.notify_one();
    }

    #[cfg(test)]
    fn is_stop_requested(&self) -> bool {
        self.lock().stop
    }

    /// `true` while a tick is waiting to be consumed.
    pub fn is_tick_pending(&self) -> bool {
        self.lock().tick
    }

    /// Blocks until a tick or stop is pending and consumes it.
    pub fn await_event(&self) -> TickEvent {
        let mut pending = self.lock();
        loop {
            if let Some(event) = pending.take() {
                return event;
            }
            pending = self
                .wake
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Non-blocking variant of [`await_event`](Self::await_event).
    pub fn try_event(&self) -> Option<TickEvent> {
        self.lock().take()
    }

    // Only plain flags live behind the lock, so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
