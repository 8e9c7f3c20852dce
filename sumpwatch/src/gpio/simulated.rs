use std::collections::VecDeque;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;

use crate::hw_trait::{HwError, Result, SignalSource};
use crate::tracing::prelude::*;
use crate::types::{Event, RawReading, Reading, format_timestamp};

/// Releases events in step with their timestamps, sped up by `scale`.
#[derive(Debug)]
struct Pacing {
    origin: OffsetDateTime,
    scale: f64,
    /// Set by the first read, so setup time doesn't eat into the stream.
    started: Option<Instant>,
}

impl Pacing {
    fn is_due(&mut self, event: &Event, now: Instant) -> bool {
        let started = *self.started.get_or_insert(now);
        let offset = (event.timestamp - self.origin).as_seconds_f64().max(0.0);
        match Duration::try_from_secs_f64(offset / self.scale) {
            Ok(delay) => started.checked_add(delay).is_some_and(|due| now >= due),
            Err(_) => false,
        }
    }
}

/// Plays a synthetic event stream back as line readings.
///
/// Each event's state is reported for `repeat` consecutive reads, which
/// mimics a noisy line that keeps re-triggering with the same level. Once
/// the stream is exhausted the last state is held.
///
/// Unpaced, events follow one another as fast as the line is read. With
/// [`paced`](Self::paced) each event waits until its offset from the
/// stream start, divided by the time scale, has passed; the line holds its
/// previous level (unknown before the first event) in the meantime.
#[derive(Debug)]
pub struct SimulatedSource {
    pin: u32,
    pending: VecDeque<Event>,
    repeat: u32,
    remaining: u32,
    current: RawReading,
    pacing: Option<Pacing>,
    released: bool,
}

impl SimulatedSource {
    pub fn new(pin: u32, events: Vec<Event>, repeat: u32) -> Self {
        Self {
            pin,
            pending: events.into(),
            repeat: repeat.max(1),
            remaining: 0,
            current: Reading::RAW_UNKNOWN,
            pacing: None,
            released: false,
        }
    }

    /// Follow the stream's own timing, measured from `origin` and sped up
    /// `scale` times. `scale` must be positive and finite.
    pub fn paced(mut self, origin: OffsetDateTime, scale: f64) -> Self {
        self.pacing = Some(Pacing {
            origin,
            scale,
            started: None,
        });
        self
    }

    /// Events not yet played back.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn next_is_due(&mut self) -> bool {
        match (self.pending.front(), self.pacing.as_mut()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(event), Some(pacing)) => pacing.is_due(event, Instant::now()),
        }
    }
}

impl SignalSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn pin(&self) -> u32 {
        self.pin
    }

    fn read(&mut self) -> Result<RawReading> {
        if self.released {
            return Err(HwError::Released);
        }

        if self.remaining == 0 && self.next_is_due() {
            if let Some(event) = self.pending.pop_front() {
                debug!(
                    sequence_id = event.sequence_id,
                    at = %format_timestamp(event.timestamp),
                    state = %event.state,
                    "Playing synthetic event"
                );
                self.current = event.state.raw();
                self.remaining = self.repeat;
            }
        }
        self.remaining = self.remaining.saturating_sub(1);

        Ok(self.current)
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}
