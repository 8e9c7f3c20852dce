//! Debounce and fan-out of pump state changes.
//!
//! The signal line is electrically noisy: a single pump start can trigger
//! several reads that all report ON. [`MonitorSession`] remembers the last
//! stable state and only notifies sinks when a reading differs from it.
//!
//! # State Machine
//!
//! | Current state    | Reading | Next state       | Fan-out |
//! |------------------|---------|------------------|---------|
//! | Uninitialized    | x       | Observing(x)     | yes     |
//! | Observing(x)     | x       | Observing(x)     | no      |
//! | Observing(x)     | y != x  | Observing(y)     | yes     |
//! | any              | unknown | unchanged        | no      |
//!
//! The first real reading is always reported since there is nothing to
//! compare it against. Unknown readings are logged and otherwise ignored.
//!
//! # Sink failures
//!
//! The new state is committed before any sink runs. A failing sink does
//! not stop the sinks after it; all failures are collected and returned as
//! [`Error::Sink`] once every sink has had its turn. The next identical
//! reading is therefore still a no-op, so a broken sink can't cause
//! re-reporting.

mod driver;
mod shutdown;

pub use driver::run;
pub use shutdown::{wait_for_shutdown, wait_for_signal};

use time::OffsetDateTime;

use crate::error::{Error, Result, SinkFailure};
use crate::hw_trait::{self, SignalSource};
use crate::sink::Sink;
use crate::tracing::prelude::*;
use crate::types::{PumpState, RawReading, Reading, format_timestamp};

/// What [`MonitorSession::handle_reading`] did with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The reading didn't map to a pump state.
    Ignored,

    /// Same as the last known state. Suppressed.
    Unchanged(PumpState),

    /// A genuine transition; sinks were notified.
    Changed {
        from: Option<PumpState>,
        to: PumpState,
    },
}

/// Monitoring state for one signal line.
///
/// Owns the line's [`SignalSource`] and the ordered list of sinks. Not
/// synchronized: callers must not run two readings through the same
/// session concurrently (`&mut self` enforces this).
pub struct MonitorSession {
    source: Box<dyn SignalSource>,
    sinks: Vec<Box<dyn Sink>>,
    last: Option<PumpState>,
    released: bool,
}

impl MonitorSession {
    pub fn new(source: Box<dyn SignalSource>) -> Self {
        Self {
            source,
            sinks: Vec::new(),
            last: None,
            released: false,
        }
    }

    /// Register a sink to be notified after those already registered.
    ///
    /// The same kind of sink may be registered more than once; each
    /// registration fires. `None` is accepted and dropped, so optional
    /// sinks can be passed straight through from configuration.
    pub fn add_listener(&mut self, sink: Option<Box<dyn Sink>>) {
        match sink {
            Some(sink) => {
                info!(sink = sink.name(), "Registering listener");
                self.sinks.push(sink);
            }
            None => debug!("Skipping absent listener"),
        }
    }

    /// Number of registered sinks.
    pub fn listener_count(&self) -> usize {
        self.sinks.len()
    }

    /// The last state reported to sinks, if any.
    pub fn last_state(&self) -> Option<PumpState> {
        self.last
    }

    pub fn pin(&self) -> u32 {
        self.source.pin()
    }

    /// Read the line once and process the result.
    ///
    /// This is the handler to call from a poll tick or edge interrupt. It
    /// takes no event payload and always asks the source for the current
    /// level.
    pub async fn poll(&mut self) -> Result<Outcome> {
        if self.released {
            return Err(hw_trait::HwError::Released.into());
        }
        let raw = self.source.read()?;
        self.handle_reading(raw).await
    }

    /// Process one raw reading, notifying sinks if it is a genuine change.
    pub async fn handle_reading(&mut self, raw: RawReading) -> Result<Outcome> {
        let reading = Reading::from(raw);
        debug!(pin = self.pin(), raw, %reading, "Status on pin");

        let Some(state) = reading.state() else {
            return Ok(Outcome::Ignored);
        };

        if self.last == Some(state) {
            trace!(%state, "Status did not change, skipping");
            return Ok(Outcome::Unchanged(state));
        }

        let from = self.last.replace(state);
        info!(
            pin = self.pin(),
            from = ?from,
            to = %state,
            at = %format_timestamp(OffsetDateTime::now_utc()),
            "Pump state changed"
        );

        let failures = self.fan_out(&[state]).await;
        if !failures.is_empty() {
            return Err(Error::Sink { state, failures });
        }

        Ok(Outcome::Changed { from, to: state })
    }

    /// Deliver `values` to every sink in registration order.
    async fn fan_out(&mut self, values: &[PumpState]) -> Vec<SinkFailure> {
        let mut failures = Vec::new();
        for sink in &mut self.sinks {
            if let Err(error) = sink.log(values).await {
                warn!(sink = sink.name(), %error, "Sink failed");
                failures.push(SinkFailure {
                    sink: sink.name().to_string(),
                    error,
                });
            }
        }
        failures
    }

    /// Release the signal source.
    ///
    /// Safe to call repeatedly. Also runs on drop, so the line is released
    /// on every exit path; calling it explicitly lets the caller see the
    /// error.
    pub fn release(&mut self) -> hw_trait::Result<()> {
        if self.released {
            return Ok(());
        }
        self.source.release()?;
        self.released = true;
        info!(pin = self.pin(), source = self.source.name(), "Signal source released");
        Ok(())
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            error!(pin = self.pin(), error = %e, "Failed to release signal source");
        }
    }
}
