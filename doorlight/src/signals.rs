/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Termination-signal source for the event loop (SIGINT / SIGTERM).
//!
//! The handlers are installed up front by [`TerminationSignals::install`] so
//! that a failure surfaces as a [`MultiplexError`] before any hardware is
//! opened.  Must be called from inside a tokio runtime context.

use crate::error::MultiplexError;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

#[derive(Debug)]
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl TerminationSignals {
    #[cfg(unix)]
    pub fn install() -> Result<Self, MultiplexError> {
        let interrupt = signal(SignalKind::interrupt()).map_err(|source| {
            MultiplexError::SignalInstall {
                signal: "SIGINT",
                source,
            }
        })?;
        let terminate = signal(SignalKind::terminate()).map_err(|source| {
            MultiplexError::SignalInstall {
                signal: "SIGTERM",
                source,
            }
        })?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self, MultiplexError> {
        Ok(Self {})
    }

    /// Waits for the next termination request and returns its name.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Result<&'static str, MultiplexError> {
        let received = tokio::select! {
            s = self.interrupt.recv() => s.map(|()| "SIGINT"),
            s = self.terminate.recv() => s.map(|()| "SIGTERM"),
        };
        received.ok_or(MultiplexError::SignalStreamClosed)
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Result<&'static str, MultiplexError> {
        tokio::signal::ctrl_c()
            .await
            .map(|()| "ctrl-c")
            .map_err(|source| MultiplexError::SignalInstall {
                signal: "ctrl-c",
                source,
            })
    }
}
