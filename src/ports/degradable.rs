//! Fallback policy shared by every port.
//!
//! Decision order for [`DegradablePort::invoke`]:
//! 1. simulation mode: simulate, collaborator untouched;
//! 2. no collaborator, or it reports not configured: warn, simulate;
//! 3. call the collaborator (on a worker thread when a timeout is set);
//! 4. `NotConfigured` at call time: warn, simulate;
//! 5. degradable error and [`Fallback::Simulate`]: log at error level, simulate;
//! 6. anything else surfaces.
//!
//! A failing simulation surfaces its own error. A real result that arrives after the timeout is
//! handed to the caller's discard hook on the worker thread.

use crossbeam_channel::{RecvTimeoutError, SendError};
use log::{debug, error, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::Collaborator;
use crate::error::PortError;
use crate::types::{Provenance, RunMode, SimulationReason};

/// What a port does when the real call fails with a degradable error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fallback {
    #[default]
    Simulate,
    /// Report the failure to the caller. Not-configured and dry-run still simulate.
    Surface,
}

/// Port result plus where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Degraded<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Degraded<T> {
    fn real(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Real,
        }
    }

    fn simulated(value: T, reason: SimulationReason) -> Self {
        Self {
            value,
            provenance: Provenance::Simulated(reason),
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.provenance.is_simulated()
    }
}

/// One external collaborator slot plus its fallback policy.
pub struct DegradablePort<C: ?Sized> {
    label: String,
    inner: Option<Arc<C>>,
    mode: RunMode,
    fallback: Fallback,
    timeout: Option<Duration>,
}

impl<C: ?Sized> Clone for DegradablePort<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            inner: self.inner.clone(),
            mode: self.mode,
            fallback: self.fallback,
            timeout: self.timeout,
        }
    }
}

impl<C> DegradablePort<C>
where
    C: Collaborator + ?Sized + 'static,
{
    pub fn new(label: impl Into<String>, inner: Option<Arc<C>>, mode: RunMode) -> Self {
        Self {
            label: label.into(),
            inner,
            mode,
            fallback: Fallback::Simulate,
            timeout: None,
        }
    }

    /// Port with no collaborator installed: always simulates.
    pub fn unconfigured(label: impl Into<String>, mode: RunMode) -> Self {
        Self::new(label, None, mode)
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Per-invocation timeout. `None` or zero runs the call inline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// True when a collaborator is installed and reports itself configured.
    pub fn is_configured(&self) -> bool {
        self.inner.as_ref().is_some_and(|c| c.is_configured())
    }

    /// Run `call` against the collaborator, or `simulate` according to the fallback policy.
    pub fn invoke<T, F, S>(&self, call: F, simulate: S) -> Result<Degraded<T>, PortError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, PortError> + Send + 'static,
        S: FnOnce() -> Result<T, PortError>,
    {
        self.invoke_with_discard(call, simulate, |_| {})
    }

    /// Like [`invoke`](Self::invoke), but a real value that arrives after the timeout is passed
    /// to `discard`. Calls that leave local files behind use it to remove them.
    pub fn invoke_with_discard<T, F, S, D>(
        &self,
        call: F,
        simulate: S,
        discard: D,
    ) -> Result<Degraded<T>, PortError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, PortError> + Send + 'static,
        S: FnOnce() -> Result<T, PortError>,
        D: FnOnce(T) + Send + 'static,
    {
        if self.mode == RunMode::Simulation {
            debug!("{}: dry run, simulating", self.label);
            return simulate().map(|v| Degraded::simulated(v, SimulationReason::DryRun));
        }

        let inner = match &self.inner {
            Some(inner) if inner.is_configured() => inner,
            _ => {
                warn!("{} is not configured, using simulated result", self.label);
                return simulate().map(|v| Degraded::simulated(v, SimulationReason::NotConfigured));
            }
        };

        let result = match self.timeout {
            Some(limit) => self.call_with_timeout(inner, call, discard, limit),
            None => call(inner.as_ref()),
        };

        match result {
            Ok(value) => Ok(Degraded::real(value)),
            Err(e) if e.is_not_configured() => {
                warn!("{}: {}; using simulated result", self.label, e);
                simulate().map(|v| Degraded::simulated(v, SimulationReason::NotConfigured))
            }
            Err(e) if e.is_degradable() && self.fallback == Fallback::Simulate => {
                error!("{} failed: {}; falling back to simulated result", self.label, e);
                simulate().map(|v| Degraded::simulated(v, SimulationReason::Recovered))
            }
            Err(e) => Err(e),
        }
    }

    /// Run `call` on a worker thread and wait at most `limit`. A late value goes to `discard`.
    fn call_with_timeout<T, F, D>(
        &self,
        inner: &Arc<C>,
        call: F,
        discard: D,
        limit: Duration,
    ) -> Result<T, PortError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, PortError> + Send + 'static,
        D: FnOnce(T) + Send + 'static,
    {
        // Zero capacity: once the receiver is gone, send fails and hands the value back.
        let (tx, rx) = crossbeam_channel::bounded(0);
        let inner = Arc::clone(inner);
        let label = self.label.clone();
        thread::Builder::new()
            .name(format!("port-{}", self.label))
            .spawn(move || {
                if let Err(SendError(Ok(late))) = tx.send(call(inner.as_ref())) {
                    debug!("{}: discarding result that arrived after the timeout", label);
                    discard(late);
                }
            })
            .map_err(|e| PortError::Unavailable {
                port: self.label.clone(),
                detail: format!("spawn worker: {}", e),
            })?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(PortError::Timeout {
                port: self.label.clone(),
                after: limit,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(PortError::Unavailable {
                port: self.label.clone(),
                detail: "worker exited without a result".to_string(),
            }),
        }
    }
}
