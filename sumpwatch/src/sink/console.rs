use std::io::{self, Write};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Sink, SinkError};
use crate::tracing::prelude::*;
use crate::types::{PumpState, WallClock, format_timestamp};

/// Prints one human-readable line per state to a writer (stdout by
/// default). Never fails: write errors are logged and swallowed.
pub struct ConsoleSink<W = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    fn write_line(&mut self, at: WallClock, state: PumpState) -> io::Result<()> {
        writeln!(self.out, "{at}: pump {state}")?;
        self.out.flush()
    }
}

#[async_trait]
impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    async fn log(&mut self, values: &[PumpState]) -> Result<(), SinkError> {
        let at = format_timestamp(OffsetDateTime::now_utc());
        for &state in values {
            if let Err(e) = self.write_line(at, state) {
                warn!(error = %e, "Console sink write failed");
            }
        }
        Ok(())
    }
}
